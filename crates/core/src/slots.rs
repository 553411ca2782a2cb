use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SlotError;

/// Selector value reserved for the "leave" control.
pub const LEAVE_SELECTOR: &str = "leave";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey(pub String);

impl SlotKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Occupant {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self { id: ParticipantId(id), display_name: display_name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub key: SlotKey,
    /// Full name shown in the poll summary.
    pub name: String,
    /// Short name used on buttons and in announcements.
    pub label: String,
    pub marker: String,
    pub capacity: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    definition: SlotDefinition,
    occupants: Vec<Occupant>,
}

impl Slot {
    fn new(definition: SlotDefinition) -> Self {
        Self { definition, occupants: Vec::new() }
    }

    pub fn key(&self) -> &SlotKey {
        &self.definition.key
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn label(&self) -> &str {
        &self.definition.label
    }

    pub fn marker(&self) -> &str {
        &self.definition.marker
    }

    pub fn capacity(&self) -> usize {
        self.definition.capacity
    }

    /// Occupants in join order.
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn occupied(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.definition.capacity
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.occupants.iter().any(|occupant| occupant.id == id)
    }

    pub fn occupant(&self, id: ParticipantId) -> Option<&Occupant> {
        self.occupants.iter().find(|occupant| occupant.id == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Added,
    AlreadyPresent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    Added,
    Moved { from: SlotKey },
    AlreadyPresent,
}

/// Fixed set of slots for one poll instance. The slot set and capacities never change after
/// construction; only occupant lists do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    pub fn new(definitions: Vec<SlotDefinition>) -> Result<Self, SlotError> {
        validate_definitions(&definitions)?;
        Ok(Self::from_definitions(definitions))
    }

    pub(crate) fn from_definitions(definitions: Vec<SlotDefinition>) -> Self {
        Self { slots: definitions.into_iter().map(Slot::new).collect() }
    }

    pub fn definitions(&self) -> Vec<SlotDefinition> {
        self.slots.iter().map(|slot| slot.definition.clone()).collect()
    }

    /// Slots in canonical display order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.key() == key)
    }

    pub fn find_occupant(&self, id: ParticipantId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.contains(id))
    }

    /// Removes the participant from whichever slot holds them and returns that slot as it looks
    /// after the removal.
    pub fn remove_occupant(&mut self, id: ParticipantId) -> Option<&Slot> {
        let index = self.slots.iter().position(|slot| slot.contains(id))?;
        let slot = &mut self.slots[index];
        slot.occupants.retain(|occupant| occupant.id != id);
        Some(&self.slots[index])
    }

    pub fn add_occupant(
        &mut self,
        key: &SlotKey,
        occupant: Occupant,
    ) -> Result<Admission, SlotError> {
        let index = self.index_of(key)?;
        if self.slots[index].contains(occupant.id) {
            return Ok(Admission::AlreadyPresent);
        }
        if let Some(other) = self.find_occupant(occupant.id) {
            return Err(SlotError::AssignedElsewhere {
                participant: occupant.id,
                slot: other.key().clone(),
            });
        }
        if self.slots[index].is_full() {
            return Err(SlotError::Full(key.clone()));
        }

        self.slots[index].occupants.push(occupant);
        Ok(Admission::Added)
    }

    /// Places the participant in `key`, vacating any other slot they hold. Presence and
    /// capacity of the target are checked before anything is removed, so a rejected move keeps
    /// the participant where they were.
    pub fn move_occupant(
        &mut self,
        key: &SlotKey,
        occupant: Occupant,
    ) -> Result<Placement, SlotError> {
        let index = self.index_of(key)?;
        if self.slots[index].contains(occupant.id) {
            return Ok(Placement::AlreadyPresent);
        }
        if self.slots[index].is_full() {
            return Err(SlotError::Full(key.clone()));
        }

        let from = self.remove_occupant(occupant.id).map(|slot| slot.key().clone());
        self.slots[index].occupants.push(occupant);

        Ok(match from {
            Some(from) => Placement::Moved { from },
            None => Placement::Added,
        })
    }

    /// True when every slot is at capacity.
    pub fn is_saturated(&self) -> bool {
        self.slots.iter().all(Slot::is_full)
    }

    pub fn total_occupied(&self) -> usize {
        self.slots.iter().map(Slot::occupied).sum()
    }

    pub fn total_capacity(&self) -> usize {
        self.slots.iter().map(Slot::capacity).sum()
    }

    fn index_of(&self, key: &SlotKey) -> Result<usize, SlotError> {
        self.slots
            .iter()
            .position(|slot| slot.key() == key)
            .ok_or_else(|| SlotError::UnknownSlot(key.clone()))
    }
}

pub fn validate_definitions(definitions: &[SlotDefinition]) -> Result<(), SlotError> {
    if definitions.is_empty() {
        return Err(SlotError::InvalidDefinition("at least one slot is required".to_owned()));
    }

    let mut seen = HashSet::new();
    for definition in definitions {
        let key = definition.key.as_str();
        if key.trim().is_empty() {
            return Err(SlotError::InvalidDefinition("slot key must not be empty".to_owned()));
        }
        if key == LEAVE_SELECTOR {
            return Err(SlotError::InvalidDefinition(format!(
                "slot key `{LEAVE_SELECTOR}` is reserved for the leave control"
            )));
        }
        if definition.capacity == 0 {
            return Err(SlotError::InvalidDefinition(format!(
                "slot `{key}` must have a positive capacity"
            )));
        }
        if !seen.insert(key) {
            return Err(SlotError::InvalidDefinition(format!("duplicate slot key `{key}`")));
        }
    }

    Ok(())
}
