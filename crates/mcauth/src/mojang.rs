use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::client::AuthClient;
use crate::errors::{AuthError, Result, ResultExt};
use crate::identity::{minify_uuid, parse_mojang_uuid};
use crate::models::{JoinRequest, McLoginRequest, McLoginResponse, McProfileResponse};
use crate::token::{MojangToken, Token, XboxToken};

/// Minecraft game profile
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameProfile {
    pub uuid: Uuid,
    pub username: String,
}

impl TryFrom<McProfileResponse> for GameProfile {
    type Error = AuthError;

    fn try_from(response: McProfileResponse) -> Result<Self> {
        Ok(Self {
            uuid: parse_mojang_uuid(&response.id)?,
            username: response.name,
        })
    }
}

impl AuthClient {
    /// Log in to Minecraft services with an XSTS token
    #[instrument(skip(self, xsts))]
    pub async fn get_access_token(&self, xsts: &XboxToken) -> Result<MojangToken> {
        let request = McLoginRequest {
            identity_token: format!("XBL3.0 x={};{}", xsts.user_hash(), xsts.value()),
        };

        debug!("Logging in to Minecraft Services");
        let response: McLoginResponse = self
            .post_json(
                &self.config.endpoints.mc_login,
                &request,
                "Authentication request to Mojang failed",
            )
            .await?;

        Ok(MojangToken::new(Token::expiring_in(
            response.access_token,
            response.expires_in,
        )))
    }

    /// Fetch the Minecraft profile owned by the token's account
    #[instrument(skip(self, mojang))]
    pub async fn get_profile(&self, mojang: &MojangToken) -> Result<GameProfile> {
        const CONTEXT: &str = "Profile request to Mojang failed";

        debug!("Fetching Minecraft profile");
        let response = self
            .http
            .get(self.config.endpoints.mc_profile.clone())
            .header("Authorization", format!("Bearer {}", mojang.value()))
            .send()
            .await
            .context(CONTEXT)?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Account has no Minecraft profile");
            return Err(AuthError::new(
                "Minecraft profile not found - account may not own the game",
            ));
        }

        let profile: McProfileResponse = Self::read_json(response, CONTEXT).await?;
        profile.try_into()
    }

    /// Announce a server join to the session server
    ///
    /// `server_hash` comes from [`crate::identity::calculate_server_hash`].
    /// The response body is ignored; only transport failures are reported.
    #[instrument(skip(self, mojang, profile))]
    pub async fn send_join(
        &self,
        mojang: &MojangToken,
        profile: &GameProfile,
        server_hash: &str,
    ) -> Result<()> {
        let request = JoinRequest {
            access_token: mojang.value(),
            selected_profile: minify_uuid(&profile.uuid),
            server_id: server_hash,
        };

        debug!("Sending session join");
        self.http
            .post(self.config.endpoints.session_join.clone())
            .json(&request)
            .send()
            .await
            .context("Session join request to Mojang failed")?;

        Ok(())
    }
}
