use serde::{Deserialize, Serialize};

use crate::courts::default_courts;
use crate::errors::{AssignmentError, SlotError};
use crate::poll::{MessageHandle, PollState};
use crate::slots::{
    Occupant, ParticipantId, Placement, SlotDefinition, SlotKey, SlotRegistry, LEAVE_SELECTOR,
};

/// A button press, decoded against the current slot set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Join(SlotKey),
    Leave,
}

impl Selection {
    pub fn parse(value: &str, state: &PollState) -> Option<Self> {
        let value = value.trim();
        if value == LEAVE_SELECTOR {
            return Some(Self::Leave);
        }

        state.registry().slot(&SlotKey::new(value)).map(|slot| Self::Join(slot.key().clone()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    Joined { participant: String, slot: SlotKey, occupied: usize, capacity: usize },
    Left { participant: String, slot: SlotKey, occupied: usize, capacity: usize },
    SlotFull { slot: SlotKey },
    /// Every slot reached capacity and the poll closed itself.
    PollFilled,
    PollClosedManually,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentKind {
    Joined,
    Switched { from: SlotKey },
    AlreadyPresent,
    Left,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub slot: SlotKey,
    pub kind: AssignmentKind,
    pub announcements: Vec<Announcement>,
}

impl AssignmentOutcome {
    /// False only for a re-click on the slot the participant already holds.
    pub fn changed_state(&self) -> bool {
        !matches!(self.kind, AssignmentKind::AlreadyPresent)
    }

    pub fn closed_poll(&self) -> bool {
        self.announcements.contains(&Announcement::PollFilled)
    }
}

/// Owns the single poll and is the only place it is mutated.
#[derive(Clone, Debug)]
pub struct AssignmentEngine {
    state: PollState,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self { state: PollState::new(SlotRegistry::from_definitions(default_courts())) }
    }
}

impl AssignmentEngine {
    pub fn new(definitions: Vec<SlotDefinition>) -> Result<Self, SlotError> {
        Ok(Self { state: PollState::new(SlotRegistry::new(definitions)?) })
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn apply(
        &mut self,
        selection: &Selection,
        occupant: Occupant,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        match selection {
            Selection::Join(slot) => self.join(occupant, slot),
            Selection::Leave => self.leave(occupant.id),
        }
    }

    pub fn join(
        &mut self,
        occupant: Occupant,
        slot: &SlotKey,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.ensure_active()?;

        let participant = occupant.display_name.clone();
        let kind = match self.state.registry_mut().move_occupant(slot, occupant)? {
            Placement::AlreadyPresent => {
                return Ok(AssignmentOutcome {
                    slot: slot.clone(),
                    kind: AssignmentKind::AlreadyPresent,
                    announcements: Vec::new(),
                });
            }
            Placement::Added => AssignmentKind::Joined,
            Placement::Moved { from } => AssignmentKind::Switched { from },
        };

        let target = self
            .state
            .registry()
            .slot(slot)
            .ok_or_else(|| SlotError::UnknownSlot(slot.clone()))?;
        let (occupied, capacity) = (target.occupied(), target.capacity());

        let mut announcements =
            vec![Announcement::Joined { participant, slot: slot.clone(), occupied, capacity }];
        if occupied == capacity {
            announcements.push(Announcement::SlotFull { slot: slot.clone() });
        }
        if let Some(closing) = self.close_if_saturated() {
            announcements.push(closing);
        }

        Ok(AssignmentOutcome { slot: slot.clone(), kind, announcements })
    }

    pub fn leave(
        &mut self,
        participant: ParticipantId,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.ensure_active()?;

        let name = self
            .state
            .registry()
            .find_occupant(participant)
            .and_then(|slot| slot.occupant(participant))
            .map(|occupant| occupant.display_name.clone())
            .ok_or(AssignmentError::NotAssigned)?;
        let slot = self
            .state
            .registry_mut()
            .remove_occupant(participant)
            .ok_or(AssignmentError::NotAssigned)?;

        let key = slot.key().clone();
        Ok(AssignmentOutcome {
            slot: key.clone(),
            kind: AssignmentKind::Left,
            announcements: vec![Announcement::Left {
                participant: name,
                slot: key,
                occupied: slot.occupied(),
                capacity: slot.capacity(),
            }],
        })
    }

    /// Replaces the poll with an empty, inactive, unpublished one and returns its generation.
    pub fn reset(&mut self) -> u64 {
        self.state = self.state.successor();
        self.state.generation()
    }

    /// Activates the poll once its announcement is published. A handle that belongs to an older
    /// generation is discarded and `false` is returned.
    pub fn mark_published(&mut self, generation: u64, handle: MessageHandle) -> bool {
        if generation != self.state.generation() {
            return false;
        }

        self.state.publish(handle);
        true
    }

    /// Closes the poll without emptying any slot.
    pub fn force_close(&mut self) -> Announcement {
        self.state.deactivate();
        Announcement::PollClosedManually
    }

    fn ensure_active(&self) -> Result<(), AssignmentError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(AssignmentError::PollNotActive)
        }
    }

    // Single check over all slots; it only runs after a successful join while active.
    fn close_if_saturated(&mut self) -> Option<Announcement> {
        if !self.state.is_active() || !self.state.registry().is_saturated() {
            return None;
        }

        self.state.deactivate();
        Some(Announcement::PollFilled)
    }
}
