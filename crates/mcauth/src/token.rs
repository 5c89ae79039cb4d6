use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, Result, ResultExt};
use crate::models::JwtClaims;

/// JWT segments are unpadded, but tolerate padding anyway
const JWT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// `issued + ttl_secs`, saturating at the latest representable instant
pub(crate) fn expiry_after(issued: DateTime<Utc>, ttl_secs: u64) -> DateTime<Utc> {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| issued.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Anything carrying an absolute expiry instant
pub trait Expiring {
    fn expires_at(&self) -> DateTime<Utc>;

    /// Expiry as epoch milliseconds
    fn expiry_time(&self) -> i64 {
        self.expires_at().timestamp_millis()
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether expiry falls inside `window` from now
    fn expires_within(&self, window: std::time::Duration) -> bool {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        match Utc::now().checked_add_signed(window) {
            Some(deadline) => deadline >= self.expires_at(),
            None => true,
        }
    }
}

/// Token value with its expiry, shared by every credential stage
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Token that expires `ttl_secs` from now
    pub fn expiring_in(value: impl Into<String>, ttl_secs: u64) -> Self {
        Self::issued_at(value, ttl_secs, Utc::now())
    }

    /// Token issued at `issued` with a server-reported lifetime
    pub fn issued_at(value: impl Into<String>, ttl_secs: u64, issued: DateTime<Utc>) -> Self {
        Self::new(value, expiry_after(issued, ttl_secs))
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Expiring for Token {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

macro_rules! delegate_token {
    ($($stage:ty),+ $(,)?) => {
        $(
            impl $stage {
                pub fn token(&self) -> &Token {
                    &self.token
                }

                pub fn value(&self) -> &str {
                    self.token.value()
                }
            }

            impl Expiring for $stage {
                fn expires_at(&self) -> DateTime<Utc> {
                    self.token.expires_at()
                }
            }
        )+
    };
}

delegate_token!(MicrosoftToken, XboxToken, MojangToken);

/// Microsoft OAuth access token plus the refresh token issued alongside it
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrosoftToken {
    #[serde(flatten)]
    token: Token,
    refresh_token: String,
}

impl MicrosoftToken {
    pub fn new(token: Token, refresh_token: impl Into<String>) -> Self {
        Self {
            token,
            refresh_token: refresh_token.into(),
        }
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }
}

impl std::fmt::Debug for MicrosoftToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrosoftToken")
            .field("token", &self.token)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Xbox Live token (XBL or XSTS) with its user hash claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XboxToken {
    #[serde(flatten)]
    token: Token,
    user_hash: String,
}

impl XboxToken {
    pub fn new(token: Token, user_hash: impl Into<String>) -> Self {
        Self {
            token,
            user_hash: user_hash.into(),
        }
    }

    /// The "uhs" claim
    pub fn user_hash(&self) -> &str {
        &self.user_hash
    }
}

/// Minecraft services access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MojangToken {
    #[serde(flatten)]
    token: Token,
}

impl MojangToken {
    pub fn new(token: Token) -> Self {
        Self { token }
    }

    /// Xbox user ID read from the token's claims
    ///
    /// The signature is not verified.
    pub fn xbox_user_id(&self) -> Result<String> {
        let segments: Vec<&str> = self.value().split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(AuthError::new(format!(
                "Failed to get XUID from Mojang JWT, invalid token format ({} segments)",
                segments.len()
            )));
        };

        let payload = JWT_ENGINE
            .decode(payload)
            .context("Failed to get XUID from Mojang JWT - invalid base64")?;
        let claims: JwtClaims = serde_json::from_slice(&payload)
            .context("Failed to get XUID from Mojang JWT - invalid JSON")?;

        Ok(claims.xuid)
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let token = Token::expiring_in("value", 3600);
        assert!(!token.is_expired());

        let ms = MicrosoftToken::new(Token::expiring_in("ms", 60), "refresh");
        assert!(!ms.is_expired());
        assert_eq!(ms.refresh_token(), "refresh");
    }

    #[test]
    fn test_expiry_is_issue_time_plus_ttl() {
        let issued = Utc::now();
        let token = Token::issued_at("value", 3600, issued);

        assert_eq!(token.expiry_time(), issued.timestamp_millis() + 3_600_000);
        assert!(!token.is_expired_at(issued));
        assert!(!token.is_expired_at(token.expires_at()));
        assert!(token.is_expired_at(token.expires_at() + TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_expiring_in_uses_current_time() {
        let before = Utc::now();
        let token = Token::expiring_in("value", 10);
        let after = Utc::now();

        assert!(token.expires_at() >= before + TimeDelta::seconds(10));
        assert!(token.expires_at() <= after + TimeDelta::seconds(10));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let token = Token::expiring_in("value", u64::MAX);
        assert_eq!(token.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expires_within() {
        let token = Token::expiring_in("value", 60);
        assert!(token.expires_within(std::time::Duration::from_secs(300)));
        assert!(!token.expires_within(std::time::Duration::from_secs(1)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let ms = MicrosoftToken::new(Token::expiring_in("secret-access", 60), "secret-refresh");
        let debug = format!("{:?}", ms);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_xbox_user_id() {
        let token = MojangToken::new(Token::expiring_in(
            jwt(r#"{"xuid":"2535405290989094","sub":"abc"}"#),
            86400,
        ));
        assert_eq!(token.xbox_user_id().unwrap(), "2535405290989094");
    }

    #[test]
    fn test_xbox_user_id_accepts_padding() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"xuid":"1"}"#);
        let token = MojangToken::new(Token::expiring_in(format!("h.{}.s", payload), 60));
        assert_eq!(token.xbox_user_id().unwrap(), "1");
    }

    #[test]
    fn test_xbox_user_id_rejects_bad_segment_count() {
        let token = MojangToken::new(Token::expiring_in("only.two", 60));
        let err = token.xbox_user_id().unwrap_err();
        assert!(err.message().contains("invalid token format"));

        let token = MojangToken::new(Token::expiring_in("a.b.c.d", 60));
        assert!(token.xbox_user_id().is_err());
    }

    #[test]
    fn test_xbox_user_id_rejects_bad_payload() {
        let token = MojangToken::new(Token::expiring_in(jwt("not json"), 60));
        assert!(token.xbox_user_id().unwrap_err().message().contains("invalid JSON"));

        let token = MojangToken::new(Token::expiring_in("a.!!!.c", 60));
        assert!(token.xbox_user_id().unwrap_err().message().contains("invalid base64"));

        let token = MojangToken::new(Token::expiring_in(jwt(r#"{"sub":"abc"}"#), 60));
        assert!(token.xbox_user_id().is_err());
    }

    #[test]
    fn test_serde_roundtrip_keeps_expiry() {
        let token = XboxToken::new(Token::expiring_in("xsts", 60), "uhs");
        let json = serde_json::to_string(&token).unwrap();
        let restored: XboxToken = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, token);
        assert_eq!(restored.user_hash(), "uhs");
    }
}
