use thiserror::Error;

use crate::slots::{ParticipantId, SlotKey};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot `{0}` is full")]
    Full(SlotKey),
    #[error("unknown slot `{0}`")]
    UnknownSlot(SlotKey),
    #[error("participant {participant} already occupies slot `{slot}`")]
    AssignedElsewhere { participant: ParticipantId, slot: SlotKey },
    #[error("invalid slot definition: {0}")]
    InvalidDefinition(String),
}

/// Rejections produced by the assignment engine. Each one is terminal: the requester gets a
/// single acknowledgement and poll state is left untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("no active poll")]
    PollNotActive,
    #[error("slot `{0}` is full")]
    SlotFull(SlotKey),
    #[error("participant is not assigned to any slot")]
    NotAssigned,
    #[error(transparent)]
    Slot(SlotError),
}

impl From<SlotError> for AssignmentError {
    fn from(value: SlotError) -> Self {
        match value {
            SlotError::Full(slot) => Self::SlotFull(slot),
            other => Self::Slot(other),
        }
    }
}

impl AssignmentError {
    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PollNotActive => "poll_not_active",
            Self::SlotFull(_) => "slot_full",
            Self::NotAssigned => "not_assigned",
            Self::Slot(_) => "slot_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{AssignmentError, SlotError};
    use crate::slots::{ParticipantId, SlotKey};

    #[test]
    fn full_slot_error_maps_to_slot_full_rejection() {
        let error = AssignmentError::from(SlotError::Full(SlotKey::new("courtA")));

        assert_eq!(error, AssignmentError::SlotFull(SlotKey::new("courtA")));
        assert_eq!(error.kind(), "slot_full");
    }

    #[test]
    fn other_slot_errors_are_wrapped_transparently() {
        let error = AssignmentError::from(SlotError::AssignedElsewhere {
            participant: ParticipantId(7),
            slot: SlotKey::new("courtB"),
        });

        assert!(matches!(error, AssignmentError::Slot(SlotError::AssignedElsewhere { .. })));
        assert_eq!(error.to_string(), "participant 7 already occupies slot `courtB`");
    }

    #[test]
    fn rejection_kinds_are_stable() {
        assert_eq!(AssignmentError::PollNotActive.kind(), "poll_not_active");
        assert_eq!(AssignmentError::NotAssigned.kind(), "not_assigned");
    }
}
