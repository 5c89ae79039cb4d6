use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::AuthConfig;
use crate::errors::{AuthError, Result, ResultExt};
use crate::session::Session;
use crate::token::MicrosoftToken;

/// Client for the Microsoft → Xbox Live → Minecraft authentication chain
///
/// Every operation is a single request. Cloning is cheap and clones share
/// the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AuthClient {
    pub(crate) config: AuthConfig,
    pub(crate) http: Client,
}

impl AuthClient {
    /// Create a new authentication client with its own HTTP client
    pub fn new(config: AuthConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(config.user_agent.as_deref().unwrap_or("mcauth"))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { config, http })
    }

    /// Create a client on top of an existing HTTP client
    pub fn with_http_client(config: AuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// POST a url-encoded form and decode the JSON reply
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        context: &str,
    ) -> Result<T> {
        let response = self
            .http
            .post(url.clone())
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .context(context)?;

        Self::read_json(response, context).await
    }

    /// POST a JSON body and decode the JSON reply
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
        context: &str,
    ) -> Result<T> {
        let response = self
            .http
            .post(url.clone())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .context(context)?;

        Self::read_json(response, context).await
    }

    /// Decode a response body regardless of status; the body carries the API error
    ///
    /// Bodies may hold live tokens, so a decode failure reports only the
    /// status and the serde error, never the body itself.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await.context(context)?;

        serde_json::from_str(&body).map_err(|e| {
            AuthError::with_source(
                format!("{context}: unexpected response (HTTP {status}): {e}"),
                e,
            )
        })
    }

    /// Run the chain from a Microsoft token to a complete session
    #[instrument(skip(self, microsoft))]
    pub async fn authenticate(&self, microsoft: &MicrosoftToken) -> Result<Session> {
        debug!("Starting authentication chain");

        let xbl = self.get_xbl_token(microsoft).await?;
        let xsts = self.get_xsts_token(&xbl).await?;
        let mojang = self.get_access_token(&xsts).await?;
        let profile = self.get_profile(&mojang).await?;

        Ok(Session {
            microsoft: microsoft.clone(),
            xbl,
            xsts,
            mojang,
            profile,
        })
    }

    /// Refresh the Microsoft token and re-run the chain
    ///
    /// The given session is left untouched; callers should replace it with
    /// the returned one since the old refresh token is no longer valid.
    #[instrument(skip(self, session))]
    pub async fn refresh_session(&self, session: &Session) -> Result<Session> {
        debug!("Refreshing session");

        let microsoft = self.refresh(&session.microsoft).await?;
        self.authenticate(&microsoft).await
    }
}
