use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::client::AuthClient;
use crate::errors::Result;
use crate::models::{DeviceCodeResponse, MsTokenResponse, OAuthResponse};
use crate::token::{Expiring, MicrosoftToken, Token, expiry_after};

/// Device code issued by Microsoft, shown to the user while the client polls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCode {
    user_code: String,
    device_code: String,
    verification_uri: String,
    expires_at: DateTime<Utc>,
    /// Seconds to wait between polls
    check_interval: u64,
}

impl DeviceCode {
    pub fn new(
        user_code: impl Into<String>,
        device_code: impl Into<String>,
        verification_uri: impl Into<String>,
        expires_at: DateTime<Utc>,
        check_interval: u64,
    ) -> Self {
        Self {
            user_code: user_code.into(),
            device_code: device_code.into(),
            verification_uri: verification_uri.into(),
            expires_at,
            check_interval,
        }
    }

    /// Code the user enters at the verification URI
    pub fn user_code(&self) -> &str {
        &self.user_code
    }

    pub fn device_code(&self) -> &str {
        &self.device_code
    }

    pub fn verification_uri(&self) -> &str {
        &self.verification_uri
    }

    pub fn expired(&self) -> bool {
        self.is_expired()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    fn from_response(response: DeviceCodeResponse, issued: DateTime<Utc>) -> Self {
        Self::new(
            response.user_code,
            response.device_code,
            response.verification_uri,
            expiry_after(issued, response.expires_in),
            response.interval,
        )
    }
}

impl Expiring for DeviceCode {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollingState {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl PollingState {
    /// Only `Pending` should be polled again
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Outcome of a single device code poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollingResult {
    Pending,
    Accepted(MicrosoftToken),
    Declined,
    Expired,
}

impl PollingResult {
    pub fn state(&self) -> PollingState {
        match self {
            Self::Pending => PollingState::Pending,
            Self::Accepted(_) => PollingState::Accepted,
            Self::Declined => PollingState::Declined,
            Self::Expired => PollingState::Expired,
        }
    }

    pub fn token(&self) -> Option<&MicrosoftToken> {
        match self {
            Self::Accepted(token) => Some(token),
            _ => None,
        }
    }

    pub fn into_token(self) -> Option<MicrosoftToken> {
        match self {
            Self::Accepted(token) => Some(token),
            _ => None,
        }
    }
}

impl From<MsTokenResponse> for MicrosoftToken {
    fn from(response: MsTokenResponse) -> Self {
        MicrosoftToken::new(
            Token::expiring_in(response.access_token, response.expires_in),
            response.refresh_token,
        )
    }
}

impl AuthClient {
    /// Request a new device code for the user to enter at the verification URI
    #[instrument(skip(self))]
    pub async fn request_device_code(&self) -> Result<DeviceCode> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        debug!("Requesting device code");
        let response: OAuthResponse<DeviceCodeResponse> = self
            .post_form(&self.config.endpoints.device_code, &form, "Device code request failed")
            .await?;

        match response {
            OAuthResponse::Error(error) => {
                warn!(error = %error.error, "Device code request rejected");
                Err(error.into())
            }
            OAuthResponse::Success(body) => Ok(DeviceCode::from_response(body, Utc::now())),
        }
    }

    /// Poll the token endpoint once
    ///
    /// Callers loop on [`PollingState::Pending`], waiting
    /// [`DeviceCode::interval`] between calls. An expired code is reported
    /// without contacting the server.
    #[instrument(skip(self, device_code))]
    pub async fn poll_device_code(&self, device_code: &DeviceCode) -> Result<PollingResult> {
        if device_code.expired() {
            debug!("Device code expired, not polling");
            return Ok(PollingResult::Expired);
        }

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("grant_type", self.config.grant_type.as_str()),
            ("device_code", device_code.device_code()),
        ];

        debug!("Polling device code");
        let response: OAuthResponse<MsTokenResponse> = self
            .post_form(&self.config.endpoints.token, &form, "Device code polling request failed")
            .await?;

        match response {
            OAuthResponse::Error(error) => match error.error.as_str() {
                "authorization_pending" => Ok(PollingResult::Pending),
                "authorization_declined" => {
                    debug!("User declined the device code");
                    Ok(PollingResult::Declined)
                }
                _ => {
                    warn!(error = %error.error, "Device code polling rejected");
                    Err(error.into())
                }
            },
            OAuthResponse::Success(body) => {
                debug!("Device code accepted");
                Ok(PollingResult::Accepted(body.into()))
            }
        }
    }

    /// Exchange the refresh token for a new Microsoft token
    ///
    /// The server invalidates the old refresh token; concurrent refreshes of
    /// the same token must be serialized by the caller.
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: &MicrosoftToken) -> Result<MicrosoftToken> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("scope", self.config.scope.as_str()),
            ("refresh_token", token.refresh_token()),
        ];

        debug!("Refreshing Microsoft access token");
        let response: OAuthResponse<MsTokenResponse> = self
            .post_form(
                &self.config.endpoints.token,
                &form,
                "Failed to send refresh request to Microsoft",
            )
            .await?;

        match response {
            OAuthResponse::Error(error) => {
                warn!(error = %error.error, "Token refresh rejected");
                Err(error.into())
            }
            OAuthResponse::Success(body) => Ok(body.into()),
        }
    }
}
