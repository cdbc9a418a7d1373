//! Live account monitor.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Notify;
use tracing::{info, warn};

use vigil_core::Credential;
use vigil_core::config::VigilConfig;
use vigil_gateway::relay::SessionBinding;
use vigil_gateway::rest::RelayApiClient;

use crate::render::Dashboard;

/// Arguments for the watch command
#[derive(Parser)]
pub struct WatchArgs {
    /// Relay access token
    #[arg(short, long, env = "VIGIL_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Skip the token check before connecting
    #[arg(long)]
    pub skip_verify: bool,
}

/// Stream account state until Ctrl-C or the relay closes the connection.
///
/// # Errors
///
/// Returns error if the token is rejected or cannot be verified.
pub async fn run(config: &VigilConfig, args: WatchArgs) -> Result<()> {
    let session = SessionBinding::new(config.relay.clone());
    let dashboard = Dashboard::shared();
    Dashboard::attach(&dashboard, session.connection().registry());

    let closed = Arc::new(Notify::new());
    let observers = session.connection().observers();
    observers.on_opened(|id| println!("Connected ({id})"));
    observers.on_error(|id, error| eprintln!("Connection {id} failed: {error}"));
    {
        let closed = Arc::clone(&closed);
        observers.on_closed(move |id, cause| {
            println!("Disconnected ({id}): {cause}");
            closed.notify_one();
        });
    }

    let credential = Credential::new(args.token);
    let id = if args.skip_verify {
        session.bind(credential)?
    } else {
        let client = RelayApiClient::new(config.api.clone())?;
        session
            .bind_verified(credential, &client)
            .await
            .context("Cannot start session")?
    };
    info!(connection_id = %id, "Watching account");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupted, closing session");
        }
        () = closed.notified() => {}
    }

    session.unbind();
    observers.clear();

    let last = dashboard.lock().render();
    println!();
    println!("{last}");
    Ok(())
}
