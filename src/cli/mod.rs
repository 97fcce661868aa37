use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::AppConfig;

pub mod chat;
pub mod commands;
pub mod render;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session against a streaming backend
    Chat {
        /// Chat endpoint, overrides STREAMCHAT_API_URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Run the mock streaming backend
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8000")]
        port: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Logs always go to stderr so they never end up in the middle of a
/// streamed reply.
fn init_tracing(default_filter: String) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let mut config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Chat { url }) => {
            init_tracing(format!("{}=warn", env!("CARGO_CRATE_NAME")));
            if let Some(url) = url {
                config.api_url = url;
            }
            chat::run(config).await?;
        }
        Some(Command::Serve { host, port }) => {
            // axum logs rejections from built-in extractors with the `axum::rejection`
            // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
            init_tracing(format!(
                "{}=debug,tower_http=debug,axum::rejection=trace",
                env!("CARGO_CRATE_NAME")
            ));
            serve::run(host, port, config).await?;
        }
        None => {}
    }

    Ok(())
}
