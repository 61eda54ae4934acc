//! Metrics definitions for botmux.
//!
//! Crates record through the `metrics` facade macros re-exported here, so
//! nothing is collected until the embedding process installs a recorder.
//!
//! ```rust,ignore
//! use botmux_metrics::{channels, counter};
//!
//! counter!(channels::MESSAGES_RECEIVED_TOTAL, "message_type" => "text").increment(1);
//! ```

mod definitions;

pub use definitions::*;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
