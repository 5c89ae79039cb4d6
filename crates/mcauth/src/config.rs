use std::time::Duration;
use url::Url;

use crate::errors::{Result, ResultExt};

/// Default authentication endpoints
pub mod endpoints {
    pub const DEVICE_CODE: &str =
        "https://login.microsoftonline.com/consumers/oauth2/v2.0/devicecode";
    pub const TOKEN: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";
    pub const XBL_AUTHENTICATE: &str = "https://user.auth.xboxlive.com/user/authenticate";
    pub const XSTS_AUTHORIZE: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
    pub const MC_LOGIN: &str = "https://api.minecraftservices.com/authentication/login_with_xbox";
    pub const MC_PROFILE: &str = "https://api.minecraftservices.com/minecraft/profile";
    pub const SESSION_JOIN: &str = "https://sessionserver.mojang.com/session/minecraft/join";
}

/// OAuth scope requested for device-code logins
pub const DEFAULT_SCOPE: &str = "XboxLive.signin offline_access";

/// Grant type sent while polling a device code
pub const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Relying parties. The XBL one only works over plain http.
pub const RP_XBOXLIVE_AUTH: &str = "http://auth.xboxlive.com";
pub const RP_MINECRAFT: &str = "rp://api.minecraftservices.com/";

/// Time skew for session refresh (refresh 5 minutes early)
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(300);

/// Endpoint URLs used by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub device_code: Url,
    pub token: Url,
    pub xbl_authenticate: Url,
    pub xsts_authorize: Url,
    pub mc_login: Url,
    pub mc_profile: Url,
    pub session_join: Url,
}

impl Endpoints {
    /// Serve every endpoint from a single origin, keeping the real paths
    ///
    /// Useful for proxies and mock servers.
    pub fn from_base(base: &Url) -> Result<Self> {
        let join = |default: &str| -> Result<Url> {
            let path = Url::parse(default).context("Invalid default endpoint")?;
            base.join(path.path()).context("Invalid endpoint base URL")
        };

        Ok(Self {
            device_code: join(endpoints::DEVICE_CODE)?,
            token: join(endpoints::TOKEN)?,
            xbl_authenticate: join(endpoints::XBL_AUTHENTICATE)?,
            xsts_authorize: join(endpoints::XSTS_AUTHORIZE)?,
            mc_login: join(endpoints::MC_LOGIN)?,
            mc_profile: join(endpoints::MC_PROFILE)?,
            session_join: join(endpoints::SESSION_JOIN)?,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        let parse = |url: &str| Url::parse(url).expect("valid default endpoint");
        Self {
            device_code: parse(endpoints::DEVICE_CODE),
            token: parse(endpoints::TOKEN),
            xbl_authenticate: parse(endpoints::XBL_AUTHENTICATE),
            xsts_authorize: parse(endpoints::XSTS_AUTHORIZE),
            mc_login: parse(endpoints::MC_LOGIN),
            mc_profile: parse(endpoints::MC_PROFILE),
            session_join: parse(endpoints::SESSION_JOIN),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// Configuration for AuthClient
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Azure application (client) ID
    pub client_id: String,

    /// OAuth scope for device code and refresh requests
    pub scope: String,

    /// Grant type used when polling a device code
    pub grant_type: String,

    pub endpoints: Endpoints,

    /// HTTP client timeouts, ignored when a prebuilt client is supplied
    pub http_timeouts: HttpTimeouts,

    /// Custom user agent (optional)
    pub user_agent: Option<String>,
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: DEFAULT_SCOPE.to_string(),
            grant_type: DEVICE_CODE_GRANT_TYPE.to_string(),
            endpoints: Endpoints::default(),
            http_timeouts: HttpTimeouts::default(),
            user_agent: Some("mcauth".to_string()),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = grant_type.into();
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}
