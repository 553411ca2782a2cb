use std::sync::Arc;

use async_trait::async_trait;
use courtside_core::poll::MessageHandle;
use thiserror::Error;

use crate::client::ChannelError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPayload {
    pub chat_id: i64,
    pub user_id: Option<i64>,
    pub text: String,
    pub correlation_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollCommand {
    NewMatch,
    Status,
    ClosePoll,
}

impl PollCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMatch => "newmatch",
            Self::Status => "status",
            Self::ClosePoll => "closepoll",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Published(MessageHandle),
    /// A newer `/newmatch` replaced the poll before this one finished publishing.
    Superseded,
    StatusSent,
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("poll announcement could not be published: {0}")]
    Publish(#[source] ChannelError),
}

/// Extracts a poll command from message text.
///
/// Only the first token counts, and a `@botname` suffix is dropped, so `/status@CourtsideBot`
/// and `/STATUS now` both resolve to [`PollCommand::Status`].
pub fn parse_poll_command(text: &str) -> Option<PollCommand> {
    let token = text.split_whitespace().next()?;
    let command = token.strip_prefix('/')?;
    let name = command.split_once('@').map_or(command, |(name, _)| name);

    match name.to_ascii_lowercase().as_str() {
        "newmatch" => Some(PollCommand::NewMatch),
        "status" => Some(PollCommand::Status),
        "closepoll" => Some(PollCommand::ClosePoll),
        _ => None,
    }
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: PollCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(
        &self,
        command: PollCommand,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError> {
        match command {
            PollCommand::NewMatch => self.service.new_match(payload).await,
            PollCommand::Status => self.service.status(payload).await,
            PollCommand::ClosePoll => self.service.close_poll(payload).await,
        }
    }
}

#[async_trait]
pub trait PollCommandService: Send + Sync {
    async fn new_match(&self, payload: &CommandPayload)
        -> Result<CommandOutcome, CommandRouteError>;

    async fn status(&self, payload: &CommandPayload) -> Result<CommandOutcome, CommandRouteError>;

    async fn close_poll(
        &self,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError>;
}

#[async_trait]
impl<T> PollCommandService for Arc<T>
where
    T: PollCommandService + ?Sized,
{
    async fn new_match(
        &self,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError> {
        (**self).new_match(payload).await
    }

    async fn status(&self, payload: &CommandPayload) -> Result<CommandOutcome, CommandRouteError> {
        (**self).status(payload).await
    }

    async fn close_poll(
        &self,
        payload: &CommandPayload,
    ) -> Result<CommandOutcome, CommandRouteError> {
        (**self).close_poll(payload).await
    }
}
