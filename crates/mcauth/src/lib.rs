//! Microsoft account authentication for Minecraft via the device code flow
//!
//! This crate implements the token exchange chain that turns a Microsoft
//! account into a Minecraft session, without ever handling the user's
//! credentials.
//!
//! # Authentication Flow
//!
//! Each step is one request and produces a new, immutable value:
//!
//! 1. Device code issuance and polling (Microsoft OAuth)
//! 2. Xbox Live (XBL) authentication
//! 3. XSTS authorization for Minecraft services
//! 4. Minecraft Services login
//! 5. Profile retrieval
//! 6. Session server join, when connecting to an online-mode server
//!
//! # Example
//!
//! ```no_run
//! use mcauth::{AuthClient, AuthConfig, PollingResult};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = AuthClient::new(AuthConfig::new("your-azure-client-id"))?;
//!
//! let code = client.request_device_code().await?;
//! println!("Visit {} and enter {}", code.verification_uri(), code.user_code());
//!
//! // The caller owns the polling loop
//! let microsoft = loop {
//!     match client.poll_device_code(&code).await? {
//!         PollingResult::Pending => tokio::time::sleep(code.interval()).await,
//!         PollingResult::Accepted(token) => break token,
//!         PollingResult::Declined | PollingResult::Expired => anyhow::bail!("login aborted"),
//!     }
//! };
//!
//! let session = client.authenticate(&microsoft).await?;
//! println!("Logged in as: {}", session.profile.username);
//!
//! // Later, refresh the session when needed
//! if session.needs_refresh() {
//!     let _refreshed = client.refresh_session(&session).await?;
//! }
//! # Ok(())
//! # }
//! # tokio_test::block_on(example()).unwrap();
//! ```
//!
//! # Important Notes
//!
//! - Tokens are never logged and are redacted from `Debug` output
//! - Persisting a [`Session`] is up to the caller; every value implements serde
//! - Refreshing invalidates the previous refresh token, so refreshes of one
//!   credential must not run concurrently

pub mod client;
pub mod config;
pub mod errors;
pub mod identity;
pub mod microsoft;
pub mod models;
pub mod mojang;
pub mod session;
pub mod token;
pub mod xbox;

// Re-export main types
pub use client::AuthClient;
pub use config::{AuthConfig, Endpoints, HttpTimeouts};
pub use errors::{AuthError, Result, XboxError};
pub use identity::{calculate_server_hash, minify_uuid, parse_mojang_uuid};
pub use microsoft::{DeviceCode, PollingResult, PollingState};
pub use mojang::GameProfile;
pub use session::Session;
pub use token::{Expiring, MicrosoftToken, MojangToken, Token, XboxToken};
