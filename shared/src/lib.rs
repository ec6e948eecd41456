//! Shared types for the comanda client
//!
//! Wire models for the backend HTTP contract, lenient numeric decoding,
//! money helpers and the tab totals calculator. No I/O lives here.

pub mod lenient;
pub mod models;
pub mod money;
pub mod request;
pub mod totals;

// Re-exports
pub use models::*;
pub use money::{format_brl, parse_brl};
pub use request::*;
pub use totals::{Totals, compute_totals};
