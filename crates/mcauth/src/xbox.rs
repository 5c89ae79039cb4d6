use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::client::AuthClient;
use crate::config::{RP_MINECRAFT, RP_XBOXLIVE_AUTH};
use crate::errors::{AuthError, Result, XboxError};
use crate::models::{XblAuthProperties, XboxAuthRequest, XboxResponse, XstsAuthProperties};
use crate::token::{MicrosoftToken, Token, XboxToken};

const XBOX_REQUEST_FAILED: &str = "Authentication request to Xbox Live failed";

impl AuthClient {
    /// Exchange a Microsoft token for an Xbox Live user token
    #[instrument(skip(self, microsoft))]
    pub async fn get_xbl_token(&self, microsoft: &MicrosoftToken) -> Result<XboxToken> {
        let properties = XblAuthProperties {
            auth_method: "RPS",
            site_name: "user.auth.xboxlive.com",
            rps_ticket: format!("d={}", microsoft.value()),
        };

        debug!("Authenticating with Xbox Live");
        self.xbox_token_request(
            &self.config.endpoints.xbl_authenticate,
            properties,
            RP_XBOXLIVE_AUTH,
        )
        .await
    }

    /// Exchange an XBL token for an XSTS token scoped to Minecraft services
    #[instrument(skip(self, xbl))]
    pub async fn get_xsts_token(&self, xbl: &XboxToken) -> Result<XboxToken> {
        let properties = XstsAuthProperties {
            sandbox_id: "RETAIL",
            user_tokens: vec![xbl.value()],
        };

        debug!("Authorizing with XSTS");
        self.xbox_token_request(&self.config.endpoints.xsts_authorize, properties, RP_MINECRAFT)
            .await
    }

    async fn xbox_token_request<P: Serialize>(
        &self,
        url: &Url,
        properties: P,
        relying_party: &str,
    ) -> Result<XboxToken> {
        let request = XboxAuthRequest {
            properties,
            relying_party,
            token_type: "JWT",
        };

        let response: XboxResponse = self.post_json(url, &request, XBOX_REQUEST_FAILED).await?;

        let success = match response {
            XboxResponse::Error(error) => {
                let kind = XboxError::from_xerr(error.xerr);
                warn!(xerr = error.xerr, "Xbox Live rejected the request: {}", kind);
                return Err(AuthError::with_source(
                    format!(
                        "Authentication request to Xbox Live returned error: {} ({})",
                        error.xerr, kind
                    ),
                    kind,
                ));
            }
            XboxResponse::Success(success) => success,
        };

        let user_hash = success
            .display_claims
            .xui
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::new(format!("{XBOX_REQUEST_FAILED}: missing XUI claims")))?
            .uhs;

        Ok(XboxToken::new(
            Token::new(success.token, success.not_after),
            user_hash,
        ))
    }
}
