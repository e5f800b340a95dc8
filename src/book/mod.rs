//! Order book reconstruction module.
//!
//! This module owns the live book state rebuilt from MBO events: per-order
//! tracking, aggregated price levels per side, and the trade-sequence
//! normalization buffer.

mod level;
mod order_book;

pub use level::{update_price_level, LevelTotals};
pub use order_book::{BookStats, OrderBook, SEQUENCE_WINDOW};
