//! Text and control rendering for the poll message and its announcements.
//!
//! Everything here is a pure function of [`PollState`]; the published message can be rebuilt
//! from scratch after every mutation. Output is Telegram HTML, so participant names go through
//! [`escape_html`].

use serde::Serialize;

use crate::engine::{Announcement, AssignmentKind, AssignmentOutcome};
use crate::errors::{AssignmentError, SlotError};
use crate::poll::PollState;
use crate::slots::{SlotKey, LEAVE_SELECTOR};

pub const POLL_BANNER: &str = "👋 Hey! Ready for another Volley🏐 on the court?\n\
📅 This Sunday from 10:00 to 13:00\n\
⚡ Pick your court below and join the game — all levels welcome!";

pub const LEAVE_LABEL: &str = "🚫 Leave Court";
pub const STALE_POLL_NOTICE: &str = "⌛ This poll has been replaced. Please use the latest one!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: String,
    pub selector: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Default)]
pub struct ControlLayout {
    pub rows: Vec<Vec<Control>>,
}

impl ControlLayout {
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flatten()
    }
}

pub fn render_summary(state: &PollState) -> String {
    let mut text = format!("{POLL_BANNER}\n\n");
    for slot in state.registry().slots() {
        text.push_str(&format!(
            "{} {} ({}/{})\n",
            slot.marker(),
            escape_html(slot.name()),
            slot.occupied(),
            slot.capacity()
        ));
    }
    text
}

pub fn render_controls(state: &PollState) -> ControlLayout {
    let mut rows: Vec<Vec<Control>> = state
        .registry()
        .slots()
        .iter()
        .map(|slot| {
            vec![Control {
                label: format!(
                    "{} {} ({}/{})",
                    slot.marker(),
                    slot.label(),
                    slot.occupied(),
                    slot.capacity()
                ),
                selector: slot.key().to_string(),
            }]
        })
        .collect();
    rows.push(vec![Control { label: LEAVE_LABEL.to_owned(), selector: LEAVE_SELECTOR.to_owned() }]);

    ControlLayout { rows }
}

pub fn render_roster(state: &PollState) -> String {
    let mut text = String::from("📊 <b>Current Status:</b>\n\n");
    for slot in state.registry().slots() {
        text.push_str(&format!(
            "{} <b>{}</b> ({}/{}):\n",
            slot.marker(),
            escape_html(slot.name()),
            slot.occupied(),
            slot.capacity()
        ));

        if slot.occupants().is_empty() {
            text.push_str("No players yet\n");
        } else {
            for (index, occupant) in slot.occupants().iter().enumerate() {
                text.push_str(&format!("{}. {}\n", index + 1, escape_html(&occupant.display_name)));
            }
        }
        text.push('\n');
    }
    text
}

pub fn render_announcement(state: &PollState, announcement: &Announcement) -> String {
    match announcement {
        Announcement::Joined { participant, slot, occupied, capacity } => format!(
            "✅ {} joined {} ({occupied}/{capacity})",
            escape_html(participant),
            slot_tag(state, slot)
        ),
        Announcement::Left { participant, slot, occupied, capacity } => format!(
            "♻️ {} left {}. Spot reopened ({occupied}/{capacity})",
            escape_html(participant),
            slot_tag(state, slot)
        ),
        Announcement::SlotFull { slot } => {
            format!("{} is now full! Please vote for other courts.", slot_tag(state, slot))
        }
        Announcement::PollFilled => {
            "🚫 Poll closed! Thanks everyone — see you on Sunday 🏐💪".to_owned()
        }
        Announcement::PollClosedManually => "🚫 Poll manually closed by admin.".to_owned(),
    }
}

/// Short feedback shown only to the participant who pressed a button.
pub fn render_acknowledgement(state: &PollState, outcome: &AssignmentOutcome) -> String {
    let tag = slot_tag(state, &outcome.slot);
    match outcome.kind {
        AssignmentKind::Joined | AssignmentKind::Switched { .. } => format!("✅ You joined {tag}"),
        AssignmentKind::AlreadyPresent => format!("✅ You are already in {tag}"),
        AssignmentKind::Left => format!("✅ You left {tag}"),
    }
}

pub fn render_rejection(state: &PollState, error: &AssignmentError) -> String {
    match error {
        AssignmentError::PollNotActive => "❌ No active poll found!".to_owned(),
        AssignmentError::SlotFull(slot) => {
            format!("❌ {} is full! Please choose another court.", slot_tag(state, slot))
        }
        AssignmentError::NotAssigned => "❌ You are not in any court!".to_owned(),
        AssignmentError::Slot(SlotError::UnknownSlot(_)) => {
            "❌ That court is not part of this poll.".to_owned()
        }
        AssignmentError::Slot(_) => "❌ Could not update your court, please try again.".to_owned(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn slot_tag(state: &PollState, key: &SlotKey) -> String {
    match state.registry().slot(key) {
        Some(slot) => format!("{} {}", slot.marker(), slot.label()),
        None => key.to_string(),
    }
}
