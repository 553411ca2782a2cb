use std::sync::Arc;

use async_trait::async_trait;
use courtside_core::engine::{AssignmentEngine, Selection};
use courtside_core::poll::{MessageHandle, PollSnapshot};
use courtside_core::presentation::{
    render_acknowledgement, render_announcement, render_controls, render_rejection, render_roster,
    render_summary, ControlLayout, STALE_POLL_NOTICE,
};
use courtside_core::slots::Occupant;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::{ChannelError, ChatChannel};
use crate::commands::{CommandOutcome, CommandPayload, CommandRouteError, PollCommandService};
use crate::events::{CallbackAction, EventContext, SelectionOutcome, SelectionService};

/// Drives the assignment engine on behalf of inbound commands and button presses.
///
/// The engine is only touched under `engine`'s lock, and every message to send is rendered
/// before the lock is released. Delivery happens afterwards; delivery failures are logged and
/// never undo a state change.
pub struct PollService {
    engine: Mutex<AssignmentEngine>,
    channel: Arc<dyn ChatChannel>,
    group_chat_id: i64,
}

/// Messages rendered under the engine lock, delivered once it is released.
struct Delivery {
    acknowledgement: Option<String>,
    refresh: Option<(MessageHandle, String, ControlLayout)>,
    announcement_chat: i64,
    announcements: Vec<String>,
}

impl PollService {
    pub fn new(
        engine: AssignmentEngine,
        channel: Arc<dyn ChatChannel>,
        group_chat_id: i64,
    ) -> Self {
        Self { engine: Mutex::new(engine), channel, group_chat_id }
    }

    pub fn group_chat_id(&self) -> i64 {
        self.group_chat_id
    }

    pub async fn snapshot(&self) -> PollSnapshot {
        self.engine.lock().await.state().snapshot()
    }

    async fn deliver(&self, callback_id: &str, delivery: Delivery, correlation_id: &str) {
        let acknowledged =
            self.channel.acknowledge(callback_id, delivery.acknowledgement.as_deref()).await;
        log_delivery_failure("acknowledge", correlation_id, acknowledged);

        if let Some((handle, text, controls)) = delivery.refresh {
            let edited = self.channel.edit(handle, &text, &controls).await;
            log_delivery_failure("edit", correlation_id, edited);
        }

        for text in delivery.announcements {
            let announced = self.channel.announce(delivery.announcement_chat, &text).await;
            log_delivery_failure("announce", correlation_id, announced);
        }
    }
}

fn log_delivery_failure(
    operation: &'static str,
    correlation_id: &str,
    result: Result<(), ChannelError>,
) {
    if let Err(error) = result {
        warn!(
            event_name = "egress.telegram.delivery_failed",
            correlation_id = %correlation_id,
            operation,
            error = %error,
            "telegram delivery failed"
        );
    }
}

#[async_trait]
impl PollCommandService for PollService {
    async fn new_match(
        &self,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError> {
        let (generation, text, controls) = {
            let mut engine = self.engine.lock().await;
            let generation = engine.reset();
            (generation, render_summary(engine.state()), render_controls(engine.state()))
        };
        info!(
            event_name = "poll.reset",
            correlation_id = %payload.correlation_id,
            issued_by = ?payload.user_id,
            generation,
            "poll reset; publishing announcement"
        );

        let handle = self
            .channel
            .publish(payload.chat_id, &text, &controls)
            .await
            .map_err(CommandRouteError::Publish)?;

        let accepted = self.engine.lock().await.mark_published(generation, handle);
        if !accepted {
            info!(
                event_name = "poll.publish_superseded",
                correlation_id = %payload.correlation_id,
                generation,
                message_id = handle.message_id,
                "a newer poll replaced this one while it was publishing"
            );
            return Ok(CommandOutcome::Superseded);
        }

        info!(
            event_name = "poll.published",
            correlation_id = %payload.correlation_id,
            generation,
            chat_id = handle.chat_id,
            message_id = handle.message_id,
            "poll is open"
        );
        Ok(CommandOutcome::Published(handle))
    }

    async fn status(&self, payload: &CommandPayload) -> Result<CommandOutcome, CommandRouteError> {
        let roster = {
            let engine = self.engine.lock().await;
            render_roster(engine.state())
        };

        let sent = self.channel.announce(payload.chat_id, &roster).await;
        log_delivery_failure("announce", &payload.correlation_id, sent);
        Ok(CommandOutcome::StatusSent)
    }

    async fn close_poll(
        &self,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError> {
        let (text, phase) = {
            let mut engine = self.engine.lock().await;
            let announcement = engine.force_close();
            (render_announcement(engine.state(), &announcement), engine.state().phase())
        };
        info!(
            event_name = "poll.closed_manually",
            correlation_id = %payload.correlation_id,
            issued_by = ?payload.user_id,
            phase = phase.as_str(),
            "poll closed by command"
        );

        let sent = self.channel.announce(payload.chat_id, &text).await;
        log_delivery_failure("announce", &payload.correlation_id, sent);
        Ok(CommandOutcome::Closed)
    }
}

#[async_trait]
impl SelectionService for PollService {
    async fn select(&self, action: &CallbackAction, ctx: &EventContext) -> SelectionOutcome {
        let (outcome, delivery) = {
            let mut engine = self.engine.lock().await;
            let current = engine.state().message();
            let announcement_chat = current.map_or(self.group_chat_id, |handle| handle.chat_id);
            let stale = action
                .message_id
                .zip(current)
                .filter(|(pressed, handle)| *pressed != handle.message_id)
                .map(|(pressed, _)| pressed);
            let selection = action
                .data
                .as_deref()
                .and_then(|data| Selection::parse(data, engine.state()));

            match (stale, selection) {
                (Some(message_id), _) => (
                    SelectionOutcome::Stale { message_id },
                    Delivery {
                        acknowledgement: Some(STALE_POLL_NOTICE.to_owned()),
                        refresh: None,
                        announcement_chat,
                        announcements: Vec::new(),
                    },
                ),
                (None, None) => {
                    let data = action.data.clone().unwrap_or_default();
                    (
                        SelectionOutcome::UnknownSelector(data),
                        Delivery {
                            acknowledgement: None,
                            refresh: None,
                            announcement_chat,
                            announcements: Vec::new(),
                        },
                    )
                }
                (None, Some(selection)) => {
                    let occupant = Occupant::new(action.user_id, action.display_name.clone());
                    let result = engine.apply(&selection, occupant);
                    let state = engine.state();

                    match result {
                        Ok(outcome) => {
                            let refresh = state
                                .message()
                                .filter(|_| outcome.changed_state())
                                .map(|handle| {
                                    (handle, render_summary(state), render_controls(state))
                                });
                            let delivery = Delivery {
                                acknowledgement: Some(render_acknowledgement(state, &outcome)),
                                refresh,
                                announcement_chat,
                                announcements: outcome
                                    .announcements
                                    .iter()
                                    .map(|announcement| render_announcement(state, announcement))
                                    .collect(),
                            };
                            (SelectionOutcome::Applied(outcome), delivery)
                        }
                        Err(error) => {
                            let delivery = Delivery {
                                acknowledgement: Some(render_rejection(state, &error)),
                                refresh: None,
                                announcement_chat,
                                announcements: Vec::new(),
                            };
                            (SelectionOutcome::Rejected(error), delivery)
                        }
                    }
                }
            }
        };

        match &outcome {
            SelectionOutcome::Applied(applied) => info!(
                event_name = "poll.assignment.applied",
                correlation_id = %ctx.correlation_id,
                participant_id = action.user_id,
                slot = %applied.slot,
                kind = ?applied.kind,
                closed_poll = applied.closed_poll(),
                "assignment applied"
            ),
            SelectionOutcome::Rejected(error) => info!(
                event_name = "poll.assignment.rejected",
                correlation_id = %ctx.correlation_id,
                participant_id = action.user_id,
                reason = error.kind(),
                "assignment rejected"
            ),
            SelectionOutcome::Stale { message_id } => info!(
                event_name = "poll.assignment.stale",
                correlation_id = %ctx.correlation_id,
                participant_id = action.user_id,
                message_id,
                "button press on a replaced poll message"
            ),
            SelectionOutcome::UnknownSelector(data) => warn!(
                event_name = "ingress.telegram.unknown_selector",
                correlation_id = %ctx.correlation_id,
                participant_id = action.user_id,
                data = %data,
                "button press carried an unknown selector"
            ),
        }

        self.deliver(&action.callback_id, delivery, &ctx.correlation_id).await;
        outcome
    }
}
