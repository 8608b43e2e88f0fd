//! Core types and plumbing shared across the crate

pub mod types;
pub mod error;
pub mod logging;
pub mod camera;

pub use types::*;
pub use error::Error;
