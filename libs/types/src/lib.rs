//! Types library for the multi-ticker trading engine
//!
//! This library provides the core type definitions shared by the engine
//! service and its drivers, so that every crate agrees on identifiers,
//! numeric representation and the error taxonomy.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, TickerSymbol)
//! - `numeric`: Exact numeric types (Price, Quantity)
//! - `order`: Order and side types
//! - `trade`: Matched trade records
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::errors::*;
}
