//! Log in with a device code and print the resulting profile.
//!
//! Usage: `cargo run --example device_login -- <azure-client-id>`

use anyhow::{Context, bail};
use mcauth::{AuthClient, AuthConfig, PollingResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcauth=debug")),
        )
        .init();

    let client_id = std::env::args()
        .nth(1)
        .context("client id required as first argument")?;
    let client = AuthClient::new(AuthConfig::new(client_id))?;

    let code = client.request_device_code().await?;
    println!(
        "Open {} and enter the code {}",
        code.verification_uri(), code.user_code()
    );

    let microsoft = loop {
        tokio::time::sleep(code.interval()).await;
        match client.poll_device_code(&code).await? {
            PollingResult::Pending => continue,
            PollingResult::Accepted(token) => break token,
            PollingResult::Declined => bail!("login was declined"),
            PollingResult::Expired => bail!("device code expired before login completed"),
        }
    };
    info!("Microsoft login complete");

    let session = client.authenticate(&microsoft).await?;
    println!(
        "Logged in as {} ({})",
        session.profile.username, session.profile.uuid
    );
    println!("XUID: {}", session.xbox_user_id()?);

    Ok(())
}
