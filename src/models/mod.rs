//! Data models
//!
//! Rust structs representing database entities.

mod consultation;
mod lead;
mod nutrition;
mod nutrition_fact;
mod nutritionist;
mod patient;

pub use consultation::{Consultation, ConsultationCreate};
pub use lead::{Lead, LeadCreate};
pub use nutrition::Macros;
pub use nutrition_fact::NutritionFact;
pub use nutritionist::{Nutritionist, NutritionistCreate};
pub use patient::{Goal, Patient, PatientCreate, Sex};

#[cfg(test)]
pub(crate) use patient::tests::sample_patient;
