//! Data models
//!
//! Records exchanged with the backend. Rust field names are English; the
//! wire names (Portuguese) are kept through `#[serde(rename)]`.
//! All IDs are `i64`, all money is `i64` minor units (centavos).

pub mod line_item;
pub mod payment;
pub mod product;
pub mod tab;
pub mod tab_detail;
pub mod table;

// Re-exports
pub use line_item::*;
pub use payment::*;
pub use product::*;
pub use tab::*;
pub use tab_detail::*;
pub use table::*;
