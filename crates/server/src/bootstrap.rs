use std::sync::Arc;

use courtside_core::config::{AppConfig, ConfigError, LoadOptions};
use courtside_core::engine::AssignmentEngine;
use courtside_telegram::{
    poll_dispatcher, ChannelError, PollService, ReconnectPolicy, TelegramClient, UpdateRunner,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<PollService>,
    pub runner: UpdateRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("telegram client could not be built: {0}")]
    Client(#[source] ChannelError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        group_chat_id = config.telegram.group_chat_id,
        "starting application bootstrap"
    );

    let client = Arc::new(TelegramClient::new(&config.telegram).map_err(BootstrapError::Client)?);
    let service = Arc::new(PollService::new(
        AssignmentEngine::default(),
        client.clone(),
        config.telegram.group_chat_id,
    ));
    let runner = UpdateRunner::new(
        client,
        poll_dispatcher(service.clone()),
        ReconnectPolicy::from(&config.runner),
    );

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "poll service and update runner wired"
    );

    Ok(Application { config, service, runner })
}

#[cfg(test)]
mod tests {
    use courtside_core::config::{ConfigOverrides, LoadOptions};
    use courtside_core::poll::PollPhase;

    use crate::bootstrap::bootstrap;

    #[test]
    fn bootstrap_fails_fast_with_malformed_bot_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("invalid-token".to_string()),
                group_chat_id: Some(-5040590820),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = match result {
            Ok(_) => panic!("malformed token should be rejected"),
            Err(error) => error.to_string(),
        };
        assert!(message.contains("telegram.bot_token"));
    }

    #[tokio::test]
    async fn bootstrap_wires_an_idle_poll() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("123456:test-secret".to_string()),
                group_chat_id: Some(-5040590820),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed with valid overrides");

        assert_eq!(app.config.telegram.group_chat_id, -5040590820);
        assert_eq!(app.service.group_chat_id(), -5040590820);
        assert_eq!(app.service.snapshot().await.phase, PollPhase::Idle);
    }
}
