//! Nutri Tools module
//!
//! MCP tool implementations for the clinic.

pub mod auth;
pub mod consultations;
pub mod diet;
pub mod leads;
pub mod nutrition_facts;
pub mod patients;
pub mod status;
