//! Shared domain logic for the Estoque stock management platform
//!
//! This crate has no I/O. It holds the movement and status types, the stock
//! arithmetic behind movement reconciliation, listing filters, and input
//! validation used by the backend.

pub mod filter;
pub mod stock;
pub mod types;
pub mod validation;

pub use filter::*;
pub use stock::*;
pub use types::*;
pub use validation::*;
