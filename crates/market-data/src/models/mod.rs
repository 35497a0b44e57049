//! Market data models
//!
//! This module contains the core data types shared by providers and the cache:
//! - `price` - Minute-resolution price points and timestamp normalization
//! - `kind` - Equity/crypto classification of a series
//! - `coin` - Entries of the crypto universe listing

mod coin;
mod kind;
mod price;

pub use coin::CoinListing;
pub use kind::SeriesKind;
pub use price::{round_to_minute, truncate_to_minute, PricePoint};
