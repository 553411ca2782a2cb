use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use courtside_core::poll::PollSnapshot;
use courtside_telegram::PollService;
use serde::Serialize;
use tracing::{error, info};

pub const LIVENESS_TEXT: &str = "Courtside is running!";

#[derive(Clone)]
pub struct HealthState {
    service: Arc<PollService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub poll: PollSnapshot,
    pub checked_at: String,
}

pub fn router(service: Arc<PollService>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .with_state(HealthState { service })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    service: Arc<PollService>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "liveness endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(service)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "liveness endpoint terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: "courtside-server",
        poll: state.service.snapshot().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{extract::State, Json};
    use courtside_core::engine::AssignmentEngine;
    use courtside_core::poll::{MessageHandle, PollPhase};
    use courtside_core::presentation::ControlLayout;
    use courtside_telegram::{ChannelError, ChatChannel, PollService};
    use tower::ServiceExt;

    use crate::health::{health, router, HealthState, LIVENESS_TEXT};

    struct SilentChannel;

    #[async_trait]
    impl ChatChannel for SilentChannel {
        async fn publish(
            &self,
            chat_id: i64,
            _text: &str,
            _controls: &ControlLayout,
        ) -> Result<MessageHandle, ChannelError> {
            Ok(MessageHandle { chat_id, message_id: 1 })
        }

        async fn edit(
            &self,
            _handle: MessageHandle,
            _text: &str,
            _controls: &ControlLayout,
        ) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn acknowledge(
            &self,
            _callback_id: &str,
            _text: Option<&str>,
        ) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn announce(&self, _chat_id: i64, _text: &str) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    fn service() -> Arc<PollService> {
        Arc::new(PollService::new(AssignmentEngine::default(), Arc::new(SilentChannel), -1))
    }

    #[tokio::test]
    async fn health_reports_idle_poll_after_startup() {
        let (status, Json(payload)) = health(State(HealthState { service: service() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service, "courtside-server");
        assert_eq!(payload.poll.phase, PollPhase::Idle);
        assert_eq!(payload.poll.slots.len(), 3);
        assert!(payload.poll.slots.iter().all(|slot| slot.occupied == 0 && slot.capacity == 12));
    }

    #[tokio::test]
    async fn root_route_answers_with_liveness_text() {
        let response = router(service())
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.expect("body reads");
        assert_eq!(&body[..], LIVENESS_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = router(service())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
