mod bootstrap;
mod health;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use courtside_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "courtside-server",
    about = "Telegram court signup bot",
    long_about = "Runs the court signup poll for one authorized Telegram group and a liveness endpoint.",
    after_help = "Examples:\n  courtside-server\n  courtside-server --config config/courtside.toml\n  courtside-server --check-config"
)]
struct Cli {
    #[arg(long, value_name = "PATH", help = "Load configuration from this file (must exist)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Override the configured log level")]
    log_level: Option<String>,
    #[arg(long, help = "Print the effective configuration with secrets redacted and exit")]
    check_config: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.load_options())?;

    if cli.check_config {
        println!("{}", config.redacted_summary());
        return Ok(());
    }

    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    health::spawn(&app.config.server.bind_address, app.config.server.port, app.service.clone())
        .await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        group_chat_id = app.config.telegram.group_chat_id,
        "courtside-server started"
    );

    tokio::select! {
        () = app.runner.start() => {
            tracing::warn!(
                event_name = "system.server.runner_stopped",
                correlation_id = "shutdown",
                "telegram update stream ended"
            );
        }
        signal = wait_for_shutdown() => signal?,
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "courtside-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::Cli;

    #[test]
    fn explicit_config_path_must_exist() {
        let cli = Cli::parse_from(["courtside-server", "--config", "deploy/courtside.toml"]);
        let options = cli.load_options();

        assert!(options.require_file);
        assert_eq!(options.config_path, Some(PathBuf::from("deploy/courtside.toml")));
        assert!(options.overrides.log_level.is_none());
    }

    #[test]
    fn defaults_search_standard_locations() {
        let cli = Cli::parse_from(["courtside-server", "--check-config", "--log-level", "debug"]);
        let options = cli.load_options();

        assert!(cli.check_config);
        assert!(!options.require_file);
        assert!(options.config_path.is_none());
        assert_eq!(options.overrides.log_level.as_deref(), Some("debug"));
    }
}
