//! Nutri Library
//!
//! Clinic management for nutritionists: patient intake, consultations,
//! leads, and diet prescription against the TACO nutrition table.

pub mod build_info;
pub mod config;
pub mod db;
pub mod diet;
pub mod mcp;
pub mod models;
pub mod session;
pub mod tools;
