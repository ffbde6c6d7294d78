//! Diet ledger
//!
//! Holds the food entries of one patient-editing session, grouped by meal
//! slot, and computes per-meal and whole-day macro totals.
//!
//! Values are stored and summed unrounded. Rounding belongs to display code.

use serde::Serialize;

use crate::models::{Macros, NutritionFact};
use super::{LedgerError, MealSlot};

/// A quantity-scaled food added to a meal slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodEntry {
    food_name: String,
    quantity_g: f64,
    macros: Macros,
}

impl FoodEntry {
    fn from_fact(fact: &NutritionFact, quantity_g: f64) -> Self {
        Self {
            food_name: fact.name().to_string(),
            quantity_g,
            macros: fact.per_100g().scale(quantity_g / 100.0),
        }
    }

    pub fn food_name(&self) -> &str {
        &self.food_name
    }

    pub fn quantity_g(&self) -> f64 {
        self.quantity_g
    }

    /// Macros already scaled to `quantity_g`
    pub fn macros(&self) -> &Macros {
        &self.macros
    }
}

/// Food entries for every meal slot. Every slot always exists.
#[derive(Debug, Clone, Default)]
pub struct DietLedger {
    slots: [Vec<FoodEntry>; 6],
}

impl DietLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `quantity_g` grams of `fact` to the end of `slot`.
    pub fn add_entry(
        &mut self,
        slot: MealSlot,
        fact: &NutritionFact,
        quantity_g: f64,
    ) -> Result<&FoodEntry, LedgerError> {
        if !quantity_g.is_finite() || quantity_g <= 0.0 {
            return Err(LedgerError::InvalidQuantity(quantity_g));
        }

        let entries = &mut self.slots[slot.index()];
        entries.push(FoodEntry::from_fact(fact, quantity_g));
        Ok(&entries[entries.len() - 1])
    }

    /// Remove the entry at `index`, shifting later entries down.
    ///
    /// Indices move after every removal; derive them from the current state.
    pub fn remove_entry(&mut self, slot: MealSlot, index: usize) -> Result<FoodEntry, LedgerError> {
        let entries = &mut self.slots[slot.index()];
        if index >= entries.len() {
            return Err(LedgerError::IndexOutOfRange {
                slot,
                index,
                len: entries.len(),
            });
        }
        Ok(entries.remove(index))
    }

    pub fn entries(&self, slot: MealSlot) -> &[FoodEntry] {
        &self.slots[slot.index()]
    }

    pub fn meal_totals(&self, slot: MealSlot) -> Macros {
        self.entries(slot).iter().map(|e| e.macros).sum()
    }

    pub fn day_totals(&self) -> Macros {
        MealSlot::ALL.iter().map(|slot| self.meal_totals(*slot)).sum()
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        for entries in self.slots.iter_mut() {
            entries.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|entries| entries.is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.slots.iter().map(|entries| entries.len()).sum()
    }
}
