//! Telegram adapter for the court signup poll.
//!
//! - **Runner** (`runner`) - long-polls `getUpdates` with reconnect backoff
//! - **Events** (`events`) - classifies updates and routes them to handlers
//! - **Commands** (`commands`) - `/newmatch`, `/status`, `/closepoll`
//! - **Service** (`service`) - drives the assignment engine and decides what to send
//! - **Client** (`client`) - Bot API calls behind the `ChatChannel` trait
//! - **Keyboard** (`keyboard`) - inline keyboards built from the poll's control layout
//!
//! # Architecture
//!
//! ```text
//! getUpdates → UpdateRunner → EventDispatcher → Handlers → PollService → AssignmentEngine
//!                                                              ↓
//!                                       ChatChannel (send / edit / answer) ← rendered text
//! ```

pub mod api;
pub mod client;
pub mod commands;
pub mod events;
pub mod keyboard;
pub mod runner;
pub mod service;

pub use client::{ChannelError, ChatChannel, TelegramClient};
pub use events::{poll_dispatcher, EventDispatcher, HandlerResult, TelegramEnvelope};
pub use runner::{ReconnectPolicy, TransportError, UpdateRunner, UpdateTransport};
pub use service::PollService;
