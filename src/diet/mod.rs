//! Diet prescription module
//!
//! The diet ledger, its meal slots, and display formatting.

pub mod format;
pub mod ledger;
pub mod meal_slot;

use thiserror::Error;

pub use ledger::{DietLedger, FoodEntry};
pub use meal_slot::MealSlot;

/// Validation failures from diet operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Quantity must be greater than 0 grams, got {0}")]
    InvalidQuantity(f64),

    #[error("Unknown meal slot '{0}'")]
    UnknownMealSlot(String),

    #[error("No entry at index {index} in {slot} ({len} entries)")]
    IndexOutOfRange {
        slot: MealSlot,
        index: usize,
        len: usize,
    },
}
