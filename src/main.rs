//! Taskdeck - task manager client
//!
#![doc = "Taskdeck - task manager client"]
#![doc = "Main entry point for the taskdeck command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taskdeck::cli::Cli;
use taskdeck::commands::{self, App};
use taskdeck::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Restore the session and execute the command
    let app = App::from_config(&config)?;
    commands::run(&app, cli.command).await
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `taskdeck=info`, or `taskdeck=debug`
/// with `--verbose`. Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "taskdeck=debug"
    } else {
        "taskdeck=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
