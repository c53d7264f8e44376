//! # Sphinx Common
//!
//! Shared types, errors, and constants used across Sphinx components.
//!
//! ## Modules
//! - `types` - Shared data structures (WaveType, EdgePolicy, Argb, etc.)
//! - `error` - Common error types
//! - `constants` - Fixed formats and default parameters

pub mod constants;
pub mod error;
pub mod types;

pub use error::{SphinxError, SphinxResult};
pub use types::*;
