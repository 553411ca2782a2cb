use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use courtside_core::config::group_accepts_chat;
use courtside_core::engine::AssignmentOutcome;
use courtside_core::errors::AssignmentError;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::Update;
use crate::commands::{
    parse_poll_command, CommandOutcome, CommandPayload, CommandRouteError, CommandRouter,
    PollCommandService,
};
use crate::service::PollService;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramEnvelope {
    pub update_id: i64,
    pub event: TelegramEvent,
}

impl TelegramEnvelope {
    pub fn from_update(update: Update) -> Self {
        let update_id = update.update_id;
        let correlation_id = correlation_id(update_id);

        let event = if let Some(callback) = update.callback_query {
            let message = callback.message.as_ref();
            TelegramEvent::CallbackAction(CallbackAction {
                callback_id: callback.id,
                message_id: message.map(|message| message.message_id),
                user_id: callback.from.id,
                display_name: callback.from.display_name(),
                data: callback.data,
            })
        } else if let Some(message) = update.message {
            match message.text {
                Some(text) if text.trim_start().starts_with('/') => {
                    TelegramEvent::Command(CommandPayload {
                        chat_id: message.chat.id,
                        user_id: message.from.map(|user| user.id),
                        text,
                        correlation_id,
                    })
                }
                _ => TelegramEvent::Unsupported { event_type: "message".to_owned() },
            }
        } else {
            TelegramEvent::Unsupported { event_type: "unknown".to_owned() }
        };

        Self { update_id, event }
    }

    pub fn correlation_id(&self) -> String {
        correlation_id(self.update_id)
    }
}

fn correlation_id(update_id: i64) -> String {
    format!("update-{update_id}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelegramEvent {
    Command(CommandPayload),
    CallbackAction(CallbackAction),
    Unsupported { event_type: String },
}

impl TelegramEvent {
    pub fn event_type(&self) -> TelegramEventType {
        match self {
            Self::Command(_) => TelegramEventType::Command,
            Self::CallbackAction(_) => TelegramEventType::CallbackAction,
            Self::Unsupported { .. } => TelegramEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TelegramEventType {
    Command,
    CallbackAction,
    Unsupported,
}

/// A press on one of the poll's inline buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackAction {
    pub callback_id: String,
    /// Message carrying the pressed button; compared against the current poll message.
    pub message_id: Option<i64>,
    pub user_id: i64,
    pub display_name: String,
    pub data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    Applied(AssignmentOutcome),
    Rejected(AssignmentError),
    UnknownSelector(String),
    /// The button belongs to an older poll message than the one currently published.
    Stale { message_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Command(CommandOutcome),
    Selection(SelectionOutcome),
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Route(#[from] CommandRouteError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> TelegramEventType;
    async fn handle(
        &self,
        envelope: &TelegramEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<TelegramEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &TelegramEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Wires both handlers to one shared poll service.
pub fn poll_dispatcher(service: Arc<PollService>) -> EventDispatcher {
    let group_chat_id = service.group_chat_id();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(CommandHandler::new(service.clone(), group_chat_id));
    dispatcher.register(CallbackActionHandler::new(service));
    dispatcher
}

pub struct CommandHandler<S> {
    router: CommandRouter<S>,
    group_chat_id: i64,
}

impl<S> CommandHandler<S>
where
    S: PollCommandService,
{
    pub fn new(service: S, group_chat_id: i64) -> Self {
        Self { router: CommandRouter::new(service), group_chat_id }
    }
}

#[async_trait]
impl<S> EventHandler for CommandHandler<S>
where
    S: PollCommandService + 'static,
{
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::Command
    }

    async fn handle(
        &self,
        envelope: &TelegramEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::Command(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let Some(command) = parse_poll_command(&payload.text) else {
            debug!(
                event_name = "ingress.telegram.command_ignored",
                correlation_id = %ctx.correlation_id,
                chat_id = payload.chat_id,
                "message is not a poll command"
            );
            return Ok(HandlerResult::Ignored);
        };

        if !group_accepts_chat(self.group_chat_id, payload.chat_id) {
            info!(
                event_name = "ingress.telegram.unauthorized_command",
                correlation_id = %ctx.correlation_id,
                chat_id = payload.chat_id,
                command = command.name(),
                "dropping poll command from unauthorized chat"
            );
            return Ok(HandlerResult::Ignored);
        }

        let outcome = self.router.route(command, payload).await?;
        Ok(HandlerResult::Command(outcome))
    }
}

#[async_trait]
pub trait SelectionService: Send + Sync {
    async fn select(&self, action: &CallbackAction, ctx: &EventContext) -> SelectionOutcome;
}

#[async_trait]
impl<T> SelectionService for Arc<T>
where
    T: SelectionService + ?Sized,
{
    async fn select(&self, action: &CallbackAction, ctx: &EventContext) -> SelectionOutcome {
        (**self).select(action, ctx).await
    }
}

pub struct CallbackActionHandler<S> {
    service: S,
}

impl<S> CallbackActionHandler<S>
where
    S: SelectionService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> EventHandler for CallbackActionHandler<S>
where
    S: SelectionService + 'static,
{
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::CallbackAction
    }

    async fn handle(
        &self,
        envelope: &TelegramEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::CallbackAction(action) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        Ok(HandlerResult::Selection(self.service.select(action, ctx).await))
    }
}
