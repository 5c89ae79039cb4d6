use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::AuthError;

/// Microsoft OAuth response: either an error body or the expected payload
///
/// A body with an `error` key is always the error shape, so a malformed
/// payload reports the field that failed rather than a variant mismatch.
#[derive(Debug, Clone)]
pub enum OAuthResponse<T> {
    Error(OAuthErrorResponse),
    Success(T),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OAuthResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let response = if value.get("error").is_some() {
            serde_json::from_value(value).map(Self::Error)
        } else {
            serde_json::from_value(value).map(Self::Success)
        };
        response.map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthErrorResponse {
    /// "<error> (<first line of description>)"
    pub fn describe(&self) -> String {
        let summary = self
            .error_description
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(str::trim)
            .filter(|d| !d.is_empty());

        match summary {
            Some(summary) => format!("{} ({})", self.error, summary),
            None => self.error.clone(),
        }
    }
}

impl From<OAuthErrorResponse> for AuthError {
    fn from(response: OAuthErrorResponse) -> Self {
        AuthError::new(format!(
            "Request returned error response: {}",
            response.describe()
        ))
    }
}

/// Device authorization response
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    pub user_code: String,
    pub device_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Microsoft OAuth token response (from both device_code and refresh_token grants)
#[derive(Debug, Clone, Deserialize)]
pub struct MsTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// XBL authenticate / XSTS authorize request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XboxAuthRequest<'a, P> {
    pub properties: P,
    pub relying_party: &'a str,
    pub token_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblAuthProperties<'a> {
    pub auth_method: &'a str,
    pub site_name: &'a str,
    pub rps_ticket: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsAuthProperties<'a> {
    pub sandbox_id: &'a str,
    pub user_tokens: Vec<&'a str>,
}

/// XBL/XSTS response: either an XErr body or a token
#[derive(Debug, Clone)]
pub enum XboxResponse {
    Error(XboxErrorResponse),
    Success(XboxAuthResponse),
}

impl<'de> Deserialize<'de> for XboxResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let response = if value.get("XErr").is_some() {
            serde_json::from_value(value).map(Self::Error)
        } else {
            serde_json::from_value(value).map(Self::Success)
        };
        response.map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XboxAuthResponse {
    pub token: String,
    pub not_after: DateTime<Utc>,
    pub display_claims: XboxDisplayClaims,
    #[serde(default)]
    pub issue_instant: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XboxDisplayClaims {
    pub xui: Vec<XboxUserInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XboxUserInfo {
    pub uhs: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XboxErrorResponse {
    #[serde(rename = "XErr", deserialize_with = "deserialize_xerr")]
    pub xerr: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// XErr is a 32-bit HRESULT; some responses send it sign-extended
fn deserialize_xerr<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let number = Number::deserialize(deserializer)?;
    if let Some(code) = number.as_u64() {
        return Ok(code);
    }

    match number.as_i64().map(i32::try_from) {
        Some(Ok(code)) => Ok(u64::from(code as u32)),
        _ => Err(de::Error::custom(format!("invalid XErr code: {number}"))),
    }
}

/// Minecraft login_with_xbox request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McLoginRequest {
    pub identity_token: String,
}

/// Minecraft login_with_xbox response
#[derive(Debug, Clone, Deserialize)]
pub struct McLoginResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Minecraft profile response
#[derive(Debug, Clone, Deserialize)]
pub struct McProfileResponse {
    /// UUID without dashes
    pub id: String,
    pub name: String,
}

/// Session server join request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest<'a> {
    pub access_token: &'a str,
    pub selected_profile: String,
    pub server_id: &'a str,
}

/// Claims read from a Minecraft access token
#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    pub xuid: String,
}
