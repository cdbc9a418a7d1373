//! OAuth and token commands.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vigil_core::Credential;
use vigil_core::config::VigilConfig;
use vigil_gateway::auth::{authorization_url, generate_state, parse_callback};
use vigil_gateway::rest::{RelayApiClient, TokenVerifier};
use vigil_telemetry::masking::SensitiveDataMasker;

/// Arguments for the exchange command
#[derive(Parser)]
pub struct ExchangeArgs {
    /// Authorization code, or the full callback URL it was delivered to
    #[arg(short, long)]
    pub code: String,

    /// Expected OAuth state when a callback URL is given
    #[arg(long)]
    pub state: Option<String>,

    /// Print the access token unmasked
    #[arg(long)]
    pub show_token: bool,
}

/// Arguments for the verify command
#[derive(Parser)]
pub struct VerifyArgs {
    /// Relay access token
    #[arg(short, long, env = "VIGIL_TOKEN", hide_env_values = true)]
    pub token: String,
}

/// Print the authorization URL the user must open.
///
/// # Errors
///
/// Returns error if the configured authorize URL is invalid.
pub fn authorize(config: &VigilConfig) -> Result<()> {
    let state = generate_state();
    let url = authorization_url(&config.oauth, Some(&state))
        .context("Failed to build authorization URL")?;

    println!("Open this URL to authorize:");
    println!("  {url}");
    println!();
    println!("State: {state}");
    Ok(())
}

/// Exchange an authorization code for a relay token.
///
/// # Errors
///
/// Returns error if the callback is invalid or the relay refuses the code.
pub async fn exchange(config: &VigilConfig, args: ExchangeArgs) -> Result<()> {
    let code = if args.code.contains("://") {
        parse_callback(&args.code, args.state.as_deref()).context("Invalid callback URL")?
    } else {
        args.code
    };

    let client = RelayApiClient::new(config.api.clone())?;
    let tokens = client
        .exchange_code(&code)
        .await
        .context("Token exchange failed")?;
    info!("Token exchange succeeded");

    let token = if args.show_token {
        tokens.access_token.clone()
    } else {
        SensitiveDataMasker::new().mask_value(&tokens.access_token)
    };

    println!("Access token: {token}");
    println!("Token type:   {}", tokens.token_type);
    if let Some(expires_in) = tokens.expires_in {
        println!("Expires in:   {expires_in}s");
    }
    Ok(())
}

/// Check a token against the relay.
///
/// # Errors
///
/// Returns error if the relay cannot be reached.
pub async fn verify(config: &VigilConfig, args: VerifyArgs) -> Result<()> {
    let client = RelayApiClient::new(config.api.clone())?;
    let valid = client
        .verify(&Credential::new(args.token))
        .await
        .context("Token verification failed")?;

    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(())
}
