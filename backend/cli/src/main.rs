mod bootstrap;
mod status_cmd;
mod suggest_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use charmline_config::defaults::DEFAULT_PORT;
use charmline_gateway::{build_router, start_server, GatewayState};
use charmline_logging::LogOptions;

use suggest_cmd::SuggestSource;

#[derive(Parser)]
#[command(name = "charmline")]
#[command(about = "Charmline: charming reply suggestions from chat screenshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Produce one suggestion locally and print it
    Suggest {
        #[command(flatten)]
        input: SuggestInput,
        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the status of a running server
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SuggestInput {
    /// Chat screenshot to read the conversation from
    #[arg(long)]
    image: Option<PathBuf>,
    /// Conversation text
    #[arg(long)]
    text: Option<String>,
}

impl SuggestInput {
    fn into_source(self) -> Option<SuggestSource> {
        match (self.image, self.text) {
            (Some(path), _) => Some(SuggestSource::Image(path)),
            (None, Some(text)) => Some(SuggestSource::Text(text)),
            (None, None) => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => run_server(port, config).await?,
        Commands::Suggest { input, config } => {
            let config = bootstrap::load_config(config.as_deref()).await?;
            // Keep stdout for the reply unless RUST_LOG asks for more.
            let options = LogOptions {
                level: "warn".to_string(),
                ..bootstrap::log_options(&config)
            };
            let _log_guard = bootstrap::init_logging(&config, &options);

            let Some(source) = input.into_source() else {
                anyhow::bail!("Either --image or --text is required");
            };
            let pipeline = bootstrap::build_pipeline(&config)?;
            suggest_cmd::run(&pipeline, source).await?;
        }
        Commands::Status { port } => {
            let port = match port {
                Some(port) => port,
                None => bootstrap::load_config(None)
                    .await
                    .map(|config| config.server.port)
                    .unwrap_or(DEFAULT_PORT),
            };
            status_cmd::run(port).await?;
        }
    }

    Ok(())
}

async fn run_server(port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = bootstrap::load_config(config_path.as_deref()).await?;
    if let Some(port) = port {
        config.server.port = port;
    }
    let _log_guard = bootstrap::init_logging(&config, &bootstrap::log_options(&config));

    let addr = bootstrap::bind_addr(&config)?;
    info!(
        addr = %addr,
        provider = config.generation.provider.as_str(),
        max_upload_bytes = config.server.max_upload_bytes,
        "Starting Charmline"
    );

    let pipeline = bootstrap::build_pipeline(&config)?;
    let app = build_router(GatewayState::new(pipeline), config.server.max_upload_bytes);
    start_server(addr, app, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn suggest_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["charmline", "suggest"]).is_err());
        assert!(Cli::try_parse_from(["charmline", "suggest", "--text", "hi", "--image", "a.png"]).is_err());

        let cli = Cli::try_parse_from(["charmline", "suggest", "--text", "A: hi"]).unwrap();
        match cli.command {
            Commands::Suggest { input, .. } => {
                assert!(matches!(input.into_source(), Some(SuggestSource::Text(t)) if t == "A: hi"));
            }
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn serve_accepts_port_and_config() {
        let cli = Cli::try_parse_from(["charmline", "serve", "-p", "4000", "--config", "c.yaml"]).unwrap();
        match cli.command {
            Commands::Serve { port, config } => {
                assert_eq!(port, Some(4000));
                assert_eq!(config, Some(PathBuf::from("c.yaml")));
            }
            _ => panic!("expected serve"),
        }
    }
}
