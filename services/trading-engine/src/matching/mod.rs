//! Matching logic module
//!
//! Crossing detection and trade pricing for the single-book match step

pub mod crossing;
pub mod executor;

pub use crossing::can_match;
pub use executor::MatchExecutor;
