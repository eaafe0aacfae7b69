use anyhow::Result;
use clap::Parser;
use ipfs_relay::app::{App, Mode};
use ipfs_relay::config::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ipfs-relay")]
#[command(about = "Relay file uploads to IPFS through Pinata")]
struct CliArgs {
    /// Run only the relay (`server`) or only the uploader (`cli`). Both run when omitted.
    #[arg(value_name = "MODE", value_enum)]
    mode: Option<Mode>,
}

impl CliArgs {
    fn mode(&self) -> Mode {
        self.mode.unwrap_or(Mode::Both)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipfs_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage problems are reported but are not a failure exit.
            let _ = e.print();
            return Ok(());
        }
    };

    info!("Starting ipfs-relay");

    if let Err(e) = App::new(config).run(args.mode()).await {
        error!("ipfs-relay failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
