//! SourceChat CLI - talks to the backend through the gateway client.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gateway_client::{Config, Error, GatewayClient, SessionEvent};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so command output stays clean.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Failed to load configuration: {}. \
                 Check sourcechat.toml or the SOURCECHAT__* environment variables.",
                e
            );
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url.trim_end_matches('/').to_string();
    }

    let client = match GatewayClient::from_config(&config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Using backend at {}", client.base_url());

    let mut events = client.session().subscribe();
    let result = cli::run(&client, cli.command).await;

    // The expiry signal is where a UI would navigate back to login.
    let mut expired = false;
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::Expired {
            expired = true;
            eprintln!("Session expired. Run `sourcechat login <email>` to sign in again.");
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::AuthExpired) => {
            if !expired {
                eprintln!("Not logged in. Run `sourcechat login <email>` first.");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
