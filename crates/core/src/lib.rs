//! Poll domain for the court signup bot: slots, the assignment engine, and rendering.
//!
//! Nothing in this crate talks to a chat platform. The Telegram adapter drives
//! [`AssignmentEngine`] and turns its outcomes into messages.

pub mod config;
pub mod courts;
pub mod engine;
pub mod errors;
pub mod poll;
pub mod presentation;
pub mod slots;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use courts::{default_courts, COURT_CAPACITY};
pub use engine::{Announcement, AssignmentEngine, AssignmentKind, AssignmentOutcome, Selection};
pub use errors::{AssignmentError, SlotError};
pub use poll::{MessageHandle, PollPhase, PollSnapshot, PollState, SlotSnapshot};
pub use presentation::{Control, ControlLayout};
pub use slots::{Occupant, ParticipantId, Slot, SlotDefinition, SlotKey, SlotRegistry};
