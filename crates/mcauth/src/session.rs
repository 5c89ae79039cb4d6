use serde::{Deserialize, Serialize};

use crate::config::TOKEN_EXPIRY_SKEW;
use crate::errors::Result;
use crate::identity::minify_uuid;
use crate::mojang::GameProfile;
use crate::token::{Expiring, MicrosoftToken, MojangToken, XboxToken};

/// Complete authentication session with all tokens and profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub microsoft: MicrosoftToken,
    pub xbl: XboxToken,
    pub xsts: XboxToken,
    pub mojang: MojangToken,
    pub profile: GameProfile,
}

impl Session {
    /// Check if the Minecraft access token is about to expire
    pub fn needs_refresh(&self) -> bool {
        self.mojang.expires_within(TOKEN_EXPIRY_SKEW)
    }

    /// Undashed profile UUID, usable as a storage key
    pub fn account_key(&self) -> String {
        minify_uuid(&self.profile.uuid)
    }

    pub fn xbox_user_id(&self) -> Result<String> {
        self.mojang.xbox_user_id()
    }
}
