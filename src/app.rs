//! Process wiring for the relay and the interactive uploader.

use crate::config::Config;
use crate::relay::{Relay, RelayState};
use crate::uploader::Uploader;
use crate::{Error, Result};
use clap::ValueEnum;
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

const READINESS_RETRIES: usize = 10;
const READINESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Run only the upload relay
    Server,
    /// Run only the interactive uploader against an already running relay
    Cli,
    /// Run the relay in the background and the uploader in the foreground
    #[value(skip)]
    Both,
}

pub struct App {
    config: Config,
    relay_state: RelayState,
}

impl App {
    pub fn new(config: Config) -> Self {
        let relay_state = RelayState::from_config(&config);
        Self::with_state(config, relay_state)
    }

    /// Build an app around a custom relay state (e.g. a mock pinning service).
    pub fn with_state(config: Config, relay_state: RelayState) -> Self {
        Self {
            config,
            relay_state,
        }
    }

    pub async fn run(&self, mode: Mode) -> Result<()> {
        info!("Running in {:?} mode", mode);
        match mode {
            Mode::Server => self.run_server().await,
            Mode::Cli => self.run_cli().await,
            Mode::Both => self.run_both().await,
        }
    }

    async fn run_server(&self) -> Result<()> {
        let relay = self.bind_relay().await?;
        relay.serve(shutdown_signal()).await
    }

    async fn run_cli(&self) -> Result<()> {
        let uploader = Uploader::from_config(&self.config);
        if uploader
            .wait_for_relay(READINESS_RETRIES, READINESS_INTERVAL)
            .await
            .is_err()
        {
            warn!(
                "Continuing without a reachable relay at {}",
                self.config.relay_url
            );
        }

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        uploader.run(stdin, &mut std::io::stdout()).await
    }

    async fn run_both(&self) -> Result<()> {
        // The listener is bound before the uploader starts, so its first
        // request cannot race the relay's startup.
        let relay = self.bind_relay().await?;
        let uploader = Uploader::from_config(&self.config);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());

        run_with_relay(relay, uploader, stdin, &mut std::io::stdout()).await
    }

    async fn bind_relay(&self) -> Result<Relay> {
        Relay::bind(&self.config.bind_addr, self.relay_state.clone())
            .await
            .map_err(|e| {
                error!("Failed to bind relay on {}: {}", self.config.bind_addr, e);
                e
            })
    }
}

/// Serve `relay` in a background task while the uploader loop runs. Returns
/// once the uploader exits (after shutting the relay down gracefully) or as
/// soon as the relay task ends on its own.
pub async fn run_with_relay<R, W>(
    relay: Relay,
    uploader: Uploader,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(relay.serve(async {
        let _ = shutdown_rx.await;
    }));

    tokio::select! {
        result = uploader.run(input, output) => result?,
        joined = &mut server => {
            let result = joined.map_err(|e| Error::Internal(format!("relay task failed: {}", e)))?;
            error!("Relay stopped before the uploader exited");
            return result;
        }
    }

    let _ = shutdown_tx.send(());
    server
        .await
        .map_err(|e| Error::Internal(format!("relay task failed: {}", e)))?
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down relay"),
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}
