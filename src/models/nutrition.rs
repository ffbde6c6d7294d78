//! Shared macro-nutrient data structure
//!
//! Used by nutrition facts, diet entries, and meal/day totals.

use serde::{Deserialize, Serialize};

/// Energy and macro-nutrient amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbohydrate_g: f64,
}

impl Macros {
    pub fn new(energy_kcal: f64, protein_g: f64, fat_g: f64, carbohydrate_g: f64) -> Self {
        Self {
            energy_kcal,
            protein_g,
            fat_g,
            carbohydrate_g,
        }
    }

    /// All-zero macros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale every value by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            energy_kcal: self.energy_kcal * multiplier,
            protein_g: self.protein_g * multiplier,
            fat_g: self.fat_g * multiplier,
            carbohydrate_g: self.carbohydrate_g * multiplier,
        }
    }

    /// Element-wise sum
    pub fn add(&self, other: &Macros) -> Self {
        Self {
            energy_kcal: self.energy_kcal + other.energy_kcal,
            protein_g: self.protein_g + other.protein_g,
            fat_g: self.fat_g + other.fat_g,
            carbohydrate_g: self.carbohydrate_g + other.carbohydrate_g,
        }
    }

    /// True when every value is finite and not negative
    pub fn is_valid(&self) -> bool {
        [self.energy_kcal, self.protein_g, self.fat_g, self.carbohydrate_g]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Macros {
    type Output = Macros;

    fn mul(self, multiplier: f64) -> Macros {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_sum() {
        let m = Macros::new(200.0, 10.0, 5.0, 20.0) * 1.5;
        assert_eq!(m, Macros::new(300.0, 15.0, 7.5, 30.0));

        let total: Macros = vec![m, Macros::new(1.0, 1.0, 1.0, 1.0)].into_iter().sum();
        assert_eq!(total, Macros::new(301.0, 16.0, 8.5, 31.0));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Macros = std::iter::empty().sum();
        assert_eq!(total, Macros::zero());
    }

    #[test]
    fn test_is_valid() {
        assert!(Macros::new(0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Macros::new(-1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Macros::new(f64::NAN, 0.0, 0.0, 0.0).is_valid());
    }
}
