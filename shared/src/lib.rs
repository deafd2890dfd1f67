//! Shared types for the JalTrack services
//!
//! Common types used across crates: error codes, response structures,
//! and time/ID utilities.

pub mod error;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
