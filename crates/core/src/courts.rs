//! The three volleyball courts offered by every match poll.

use crate::slots::{SlotDefinition, SlotKey};

pub const COURT_CAPACITY: usize = 12;

pub fn default_courts() -> Vec<SlotDefinition> {
    vec![
        court("courtA", "Court A", "Teams 1 & 2", "🟢"),
        court("courtB", "Court B", "Teams 3 & 4", "🔵"),
        court("courtC", "Court C", "Teams 5 & 6", "🔴"),
    ]
}

fn court(key: &str, label: &str, teams: &str, marker: &str) -> SlotDefinition {
    SlotDefinition {
        key: SlotKey::new(key),
        name: format!("{label} — {teams} 🏐"),
        label: label.to_owned(),
        marker: marker.to_owned(),
        capacity: COURT_CAPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::{default_courts, COURT_CAPACITY};
    use crate::slots::validate_definitions;

    #[test]
    fn default_courts_are_valid_and_ordered() {
        let courts = default_courts();

        assert!(validate_definitions(&courts).is_ok());
        let keys: Vec<_> = courts.iter().map(|court| court.key.as_str()).collect();
        assert_eq!(keys, ["courtA", "courtB", "courtC"]);
        assert!(courts.iter().all(|court| court.capacity == COURT_CAPACITY));
        assert_eq!(courts[0].name, "Court A — Teams 1 & 2 🏐");
    }
}
