//! Context configuration loading and validation.

mod contexts;

pub use contexts::*;
