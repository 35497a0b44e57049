//! Price resolution around alerts.
//!
//! - [`model`] - `PriceSlot` and the per-alert `PriceTuple`
//! - [`resolver`] - Forward-scan lookup of a price at an instant
//! - [`source`] - The `PriceSource` trait, implemented by the series store

pub mod model;
pub mod resolver;
pub mod source;

pub use model::{PriceSlot, PriceTuple};
pub use resolver::price_at;
pub use source::PriceSource;
