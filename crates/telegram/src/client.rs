use std::time::Duration;

use async_trait::async_trait;
use courtside_core::config::TelegramConfig;
use courtside_core::poll::MessageHandle;
use courtside_core::presentation::ControlLayout;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, GetUpdatesRequest, Message,
    SendMessageRequest, Update, User,
};
use crate::keyboard::inline_keyboard;
use crate::runner::{TransportError, UpdateTransport};

const PARSE_MODE: &str = "HTML";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("telegram request failed: {0}")]
    Http(String),
    #[error("telegram rejected `{method}` ({code}): {description}")]
    Api { method: String, code: i64, description: String },
    #[error("telegram response could not be decoded: {0}")]
    Decode(String),
}

/// Outbound side of the bot: everything the poll service says to the group.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    async fn publish(
        &self,
        chat_id: i64,
        text: &str,
        controls: &ControlLayout,
    ) -> Result<MessageHandle, ChannelError>;

    async fn edit(
        &self,
        handle: MessageHandle,
        text: &str,
        controls: &ControlLayout,
    ) -> Result<(), ChannelError>;

    async fn acknowledge(&self, callback_id: &str, text: Option<&str>)
        -> Result<(), ChannelError>;

    async fn announce(&self, chat_id: i64, text: &str) -> Result<(), ChannelError>;
}

pub struct TelegramClient {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: SecretString,
    long_poll_timeout: Duration,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChannelError> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| ChannelError::Http(error.to_string()))?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token.clone(),
            long_poll_timeout: Duration::from_secs(config.long_poll_timeout_secs),
            request_timeout,
        })
    }

    pub async fn get_me(&self) -> Result<User, ChannelError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ChannelError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.long_poll_timeout.as_secs(),
            allowed_updates: vec!["message", "callback_query"],
        };
        // The HTTP deadline has to outlive the server-side long poll.
        let deadline = self.long_poll_timeout + self.request_timeout;
        self.call("getUpdates", &request, Some(deadline)).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base_url, self.bot_token.expose_secret())
    }

    async fn call<P, T>(
        &self,
        method: &str,
        payload: &P,
        timeout: Option<Duration>,
    ) -> Result<T, ChannelError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(self.method_url(method)).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // reqwest errors embed the request URL, which carries the bot token.
        let response = request
            .send()
            .await
            .map_err(|error| ChannelError::Http(error.without_url().to_string()))?;
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|error| ChannelError::Decode(error.without_url().to_string()))?;

        if !envelope.ok {
            return Err(ChannelError::Api {
                method: method.to_owned(),
                code: envelope.error_code.unwrap_or_default(),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| ChannelError::Decode(format!("`{method}` returned no result")))
    }
}

#[async_trait]
impl ChatChannel for TelegramClient {
    async fn publish(
        &self,
        chat_id: i64,
        text: &str,
        controls: &ControlLayout,
    ) -> Result<MessageHandle, ChannelError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: Some(inline_keyboard(controls)),
        };
        let message: Message = self.call("sendMessage", &request, None).await?;

        Ok(MessageHandle { chat_id: message.chat.id, message_id: message.message_id })
    }

    async fn edit(
        &self,
        handle: MessageHandle,
        text: &str,
        controls: &ControlLayout,
    ) -> Result<(), ChannelError> {
        let request = EditMessageTextRequest {
            chat_id: handle.chat_id,
            message_id: handle.message_id,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: Some(inline_keyboard(controls)),
        };

        match self.call::<_, serde_json::Value>("editMessageText", &request, None).await {
            Ok(_) => Ok(()),
            Err(error) if is_not_modified(&error) => {
                debug!(
                    event_name = "egress.telegram.edit_unchanged",
                    message_id = handle.message_id,
                    "poll message already up to date"
                );
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    async fn acknowledge(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChannelError> {
        let request = AnswerCallbackQueryRequest { callback_query_id: callback_id, text };
        self.call::<_, bool>("answerCallbackQuery", &request, None).await.map(|_| ())
    }

    async fn announce(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let request = SendMessageRequest { chat_id, text, parse_mode: PARSE_MODE, reply_markup: None };
        self.call::<_, Message>("sendMessage", &request, None).await.map(|_| ())
    }
}

#[async_trait]
impl UpdateTransport for TelegramClient {
    async fn connect(&self) -> Result<(), TransportError> {
        let me = self.get_me().await.map_err(|error| TransportError::Connect(error.to_string()))?;
        info!(
            event_name = "ingress.telegram.connected",
            bot_id = me.id,
            bot_username = me.username.as_deref().unwrap_or("unknown"),
            "telegram bot token verified"
        );
        Ok(())
    }

    async fn next_batch(&self, offset: Option<i64>) -> Result<Option<Vec<Update>>, TransportError> {
        self.get_updates(offset)
            .await
            .map(Some)
            .map_err(|error| TransportError::Receive(error.to_string()))
    }
}

fn is_not_modified(error: &ChannelError) -> bool {
    matches!(
        error,
        ChannelError::Api { code: 400, description, .. }
            if description.contains("message is not modified")
    )
}
