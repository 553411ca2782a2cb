use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use courtside_core::config::RunnerConfig;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::Update;
use crate::events::{EventContext, EventDispatcher, TelegramEnvelope};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
}

/// Backoff between transport attempts. Failures never stop the runner; past `max_retries`
/// consecutive failures they are logged as errors instead of warnings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 8, base_delay_ms: 500, max_delay_ms: 30_000 }
    }
}

impl From<&RunnerConfig> for ReconnectPolicy {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Inbound side of the bot.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    /// Next batch of updates starting at `offset`; `None` once the stream has ended.
    async fn next_batch(&self, offset: Option<i64>) -> Result<Option<Vec<Update>>, TransportError>;
}

#[derive(Debug, Default)]
struct PumpState {
    offset: Option<i64>,
    consecutive_failures: u32,
}

pub struct UpdateRunner {
    transport: Arc<dyn UpdateTransport>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
}

impl UpdateRunner {
    pub fn new(
        transport: Arc<dyn UpdateTransport>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy }
    }

    /// Serves updates until the transport ends its stream. Transport failures are retried
    /// for as long as they last.
    pub async fn start(&self) {
        let mut state = PumpState::default();

        loop {
            match self.connect_and_pump(&mut state).await {
                Ok(()) => return,
                Err(transport_error) => {
                    state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                    let delay = self.reconnect_policy.backoff(state.consecutive_failures - 1);

                    if state.consecutive_failures > self.reconnect_policy.max_retries {
                        error!(
                            event_name = "ingress.telegram.transport_degraded",
                            attempt = state.consecutive_failures,
                            max_retries = self.reconnect_policy.max_retries,
                            retry_in_ms = delay.as_millis() as u64,
                            error = %transport_error,
                            "telegram update transport keeps failing; still retrying"
                        );
                    } else {
                        warn!(
                            event_name = "ingress.telegram.transport_failed",
                            attempt = state.consecutive_failures,
                            max_retries = self.reconnect_policy.max_retries,
                            retry_in_ms = delay.as_millis() as u64,
                            error = %transport_error,
                            "telegram update transport failed"
                        );
                    }

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn connect_and_pump(&self, state: &mut PumpState) -> Result<(), TransportError> {
        info!(
            event_name = "ingress.telegram.connecting",
            attempt = state.consecutive_failures,
            "opening telegram update transport"
        );
        self.transport.connect().await?;

        loop {
            let Some(updates) = self.transport.next_batch(state.offset).await? else {
                info!(
                    event_name = "ingress.telegram.stream_closed",
                    "telegram update stream closed"
                );
                return Ok(());
            };
            state.consecutive_failures = 0;

            for update in updates {
                // Advance first so a failing update is never fetched again.
                state.offset = Some(update.update_id + 1);
                self.process(update).await;
            }
        }
    }

    async fn process(&self, update: Update) {
        let envelope = TelegramEnvelope::from_update(update);
        let context = EventContext { correlation_id: envelope.correlation_id() };

        debug!(
            event_name = "ingress.telegram.update_received",
            correlation_id = %context.correlation_id,
            update_id = envelope.update_id,
            event_type = ?envelope.event.event_type(),
            "received telegram update"
        );

        match self.dispatcher.dispatch(&envelope, &context).await {
            Ok(result) => debug!(
                event_name = "ingress.telegram.update_handled",
                correlation_id = %context.correlation_id,
                result = ?result,
                "telegram update handled"
            ),
            Err(error) => warn!(
                event_name = "ingress.telegram.update_failed",
                correlation_id = %context.correlation_id,
                error = %error,
                "event dispatch failed; continuing update loop"
            ),
        }
    }
}
