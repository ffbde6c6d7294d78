//! Display formatting for diet plans
//!
//! Rounding happens here and nowhere else: kcal with no decimals, grams with
//! one.

use crate::models::Macros;
use super::{DietLedger, MealSlot};

pub fn format_kcal(value: f64) -> String {
    format!("{:.0} kcal", value)
}

pub fn format_grams(value: f64) -> String {
    format!("{:.1} g", value)
}

/// One-line summary, e.g. `350 kcal | P: 12.0 g | C: 40.5 g | F: 9.1 g`
pub fn format_totals(totals: &Macros) -> String {
    format!(
        "{} | P: {} | C: {} | F: {}",
        format_kcal(totals.energy_kcal),
        format_grams(totals.protein_g),
        format_grams(totals.carbohydrate_g),
        format_grams(totals.fat_g),
    )
}

/// Render a diet plan as markdown. Empty slots are left out.
pub fn render_markdown(ledger: &DietLedger, patient_name: Option<&str>) -> String {
    let mut markdown = String::new();

    markdown.push_str("# Diet Plan\n\n");
    if let Some(name) = patient_name {
        markdown.push_str(&format!("**Patient:** {}\n\n", name));
    }
    markdown.push_str(&format!("**Day total:** {}\n\n", format_totals(&ledger.day_totals())));
    markdown.push_str("---\n\n");

    for slot in MealSlot::ALL {
        let entries = ledger.entries(slot);
        if entries.is_empty() {
            continue;
        }

        markdown.push_str(&format!("## {} {}\n\n", slot.emoji(), slot.label()));
        markdown.push_str("| # | Food | Qty (g) | Kcal | Carbs (g) | Prot (g) | Fat (g) |\n");
        markdown.push_str("|---|------|---------|------|-----------|----------|---------|\n");

        for (i, entry) in entries.iter().enumerate() {
            let m = entry.macros();
            markdown.push_str(&format!(
                "| {} | {} | {:.0} | {:.1} | {:.1} | {:.1} | {:.1} |\n",
                i,
                entry.food_name(),
                entry.quantity_g(),
                m.energy_kcal,
                m.carbohydrate_g,
                m.protein_g,
                m.fat_g,
            ));
        }

        markdown.push_str(&format!(
            "\n**Meal total:** {}\n\n",
            format_totals(&ledger.meal_totals(slot))
        ));
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutritionFact;

    #[test]
    fn test_format_totals_rounds_for_display_only() {
        let totals = Macros::new(349.6, 12.04, 9.06, 40.45);
        assert_eq!(format_totals(&totals), "350 kcal | P: 12.0 g | C: 40.5 g | F: 9.1 g");
    }

    #[test]
    fn test_render_markdown_skips_empty_slots() {
        let mut ledger = DietLedger::new();
        let fact = NutritionFact::new("Banana prata", Macros::new(98.0, 1.3, 0.1, 26.0)).unwrap();
        ledger.add_entry(MealSlot::MorningSnack, &fact, 120.0).unwrap();

        let md = render_markdown(&ledger, Some("Maria"));
        assert!(md.contains("**Patient:** Maria"));
        assert!(md.contains("## 🍎 Morning Snack"));
        assert!(md.contains("| 0 | Banana prata | 120 | 117.6 |"));
        assert!(!md.contains("Breakfast"));
    }
}
