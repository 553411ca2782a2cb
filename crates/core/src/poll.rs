use serde::{Deserialize, Serialize};

use crate::slots::SlotRegistry;

/// Identifies the published poll message on the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    /// Not announced yet (process start or just reset).
    Idle,
    Open,
    Filling,
    Full,
    Closed,
}

impl PollPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::Filling => "filling",
            Self::Full => "full",
            Self::Closed => "closed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollState {
    registry: SlotRegistry,
    active: bool,
    message: Option<MessageHandle>,
    generation: u64,
}

impl PollState {
    pub fn new(registry: SlotRegistry) -> Self {
        Self { registry, active: false, message: None, generation: 0 }
    }

    /// Empty, inactive, unpublished successor with the same slot definitions.
    pub(crate) fn successor(&self) -> Self {
        Self {
            registry: SlotRegistry::from_definitions(self.registry.definitions()),
            active: false,
            message: None,
            generation: self.generation.wrapping_add(1),
        }
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut SlotRegistry {
        &mut self.registry
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn message(&self) -> Option<MessageHandle> {
        self.message
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn publish(&mut self, handle: MessageHandle) {
        self.message = Some(handle);
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn phase(&self) -> PollPhase {
        match (self.active, self.message.is_some()) {
            (true, _) if self.registry.total_occupied() == 0 => PollPhase::Open,
            (true, _) => PollPhase::Filling,
            (false, false) => PollPhase::Idle,
            (false, true) if self.registry.is_saturated() => PollPhase::Full,
            (false, true) => PollPhase::Closed,
        }
    }

    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            phase: self.phase(),
            active: self.active,
            published: self.message.is_some(),
            generation: self.generation,
            slots: self
                .registry
                .slots()
                .iter()
                .map(|slot| SlotSnapshot {
                    key: slot.key().to_string(),
                    label: slot.label().to_owned(),
                    occupied: slot.occupied(),
                    capacity: slot.capacity(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PollSnapshot {
    pub phase: PollPhase,
    pub active: bool,
    pub published: bool,
    pub generation: u64,
    pub slots: Vec<SlotSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    pub key: String,
    pub label: String,
    pub occupied: usize,
    pub capacity: usize,
}
