//! CLI command implementations.

pub mod contexts;
pub mod doctor;
pub mod generate;
pub mod secrets;
