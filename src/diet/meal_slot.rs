//! Meal slots
//!
//! The fixed set of times of day a diet entry can belong to.

use serde::{Deserialize, Serialize};

use super::LedgerError;

/// Meal slot, in the order a day is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    MorningSnack,
    Lunch,
    AfternoonSnack,
    Dinner,
    EveningSnack,
}

impl MealSlot {
    /// Every slot, in day order
    pub const ALL: [MealSlot; 6] = [
        MealSlot::Breakfast,
        MealSlot::MorningSnack,
        MealSlot::Lunch,
        MealSlot::AfternoonSnack,
        MealSlot::Dinner,
        MealSlot::EveningSnack,
    ];

    /// Position of this slot in `ALL`
    pub fn index(&self) -> usize {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::MorningSnack => 1,
            MealSlot::Lunch => 2,
            MealSlot::AfternoonSnack => 3,
            MealSlot::Dinner => 4,
            MealSlot::EveningSnack => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::MorningSnack => "morning_snack",
            MealSlot::Lunch => "lunch",
            MealSlot::AfternoonSnack => "afternoon_snack",
            MealSlot::Dinner => "dinner",
            MealSlot::EveningSnack => "evening_snack",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::MorningSnack => "Morning Snack",
            MealSlot::Lunch => "Lunch",
            MealSlot::AfternoonSnack => "Afternoon Snack",
            MealSlot::Dinner => "Dinner",
            MealSlot::EveningSnack => "Evening Snack",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "🌅",
            MealSlot::MorningSnack => "🍎",
            MealSlot::Lunch => "☀️",
            MealSlot::AfternoonSnack => "🥪",
            MealSlot::Dinner => "🌃",
            MealSlot::EveningSnack => "🦉",
        }
    }

    /// Parse a slot from its identifier (`morning_snack`) or display label
    /// (`Morning Snack`), ignoring case.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        MealSlot::ALL
            .iter()
            .copied()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| LedgerError::UnknownMealSlot(s.trim().to_string()))
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifiers_and_labels() {
        assert_eq!(MealSlot::parse("breakfast").unwrap(), MealSlot::Breakfast);
        assert_eq!(MealSlot::parse("Morning Snack").unwrap(), MealSlot::MorningSnack);
        assert_eq!(MealSlot::parse(" AFTERNOON_SNACK ").unwrap(), MealSlot::AfternoonSnack);
        assert_eq!(MealSlot::parse("evening-snack").unwrap(), MealSlot::EveningSnack);
    }

    #[test]
    fn test_parse_unknown_slot() {
        match MealSlot::parse("brunch") {
            Err(LedgerError::UnknownMealSlot(name)) => assert_eq!(name, "brunch"),
            other => panic!("expected UnknownMealSlot, got {:?}", other),
        }
    }

    #[test]
    fn test_index_matches_order() {
        for (i, slot) in MealSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }
}
