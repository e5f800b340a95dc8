//! # mbp-reconstructor
//!
//! MBO → MBP-10 order book reconstruction from CSV market data.
//!
//! This library replays a Market-By-Order (MBO) event stream through a live
//! limit order book and emits one Market-By-Price (MBP-10) snapshot row per
//! input event: the top 10 aggregated price levels on each side, flattened
//! next to the triggering event's own fields.
//!
//! ## Features
//!
//! - **MBO → MBP-10 Reconstruction**: Convert order-level events to aggregated
//!   price-level snapshots, one row per event
//! - **Trade-Sequence Normalization**: Collapse the feed's Trade → Fill →
//!   Cancel execution triples into a single book debit on the resting side
//! - **Idempotent Removal**: Standalone cancels and resolved sequences share
//!   one remove-if-live primitive, so an order can never be debited twice
//! - **Streaming CSV I/O**: Buffered readers/writers over any `Read`/`Write`,
//!   with optional skip-invalid tolerance for malformed records
//! - **Fixed-Point Prices**: `i64` nanodollar prices keep levels exactly
//!   ordered in the book maps, rendered at 2-decimal precision
//!
//! ## Quick Start
//!
//! ### Basic Book Reconstruction
//!
//! ```rust
//! use mbp_reconstructor::{OrderBook, MboEvent, Action, Side};
//!
//! let mut book = OrderBook::new();
//!
//! let event = MboEvent::new(
//!     1001,                    // order_id
//!     Action::Add,             // action
//!     Side::Bid,               // side
//!     100_000_000_000,         // price ($100.00 in fixed-point)
//!     100,                     // size
//! );
//!
//! book.apply(&event);
//!
//! if let Some(bid) = book.best_bid() {
//!     println!("Best Bid: ${:.2}", bid as f64 / 1e9);
//! }
//! ```
//!
//! ### Full File-to-File Reconstruction
//!
//! ```ignore
//! use mbp_reconstructor::Driver;
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! let input = File::open("data/mbo.csv")?;
//! let output = File::create("output_mbp.csv")?;
//!
//! let mut driver = Driver::new().skip_invalid(true);
//! let stats = driver.run(input, output)?;
//!
//! println!("{}", stats.to_json());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: `MboEvent`, `Action`, `Side`, `Order`, `PriceLevel` |
//! | [`book`] | Book state: `OrderBook`, level maps, sequence normalization |
//! | [`mbp`] | Snapshot rendering: output header and per-event row layout |
//! | [`loader`] | CSV I/O: `MboCsvReader`, `MbpCsvWriter`, record parsing |
//! | [`driver`] | End-to-end run loop: `Driver`, `RunStats` |
//! | [`error`] | Error type and crate-wide `Result` alias |

pub mod book;
pub mod driver;
pub mod error;
pub mod loader;
pub mod mbp;
pub mod types;

// Re-exports - Core types
pub use error::{MbpError, Result};
pub use types::{Action, MboEvent, Order, PriceLevel, Side, MBP_DEPTH, PRICE_SCALE};

// Re-exports - Book reconstruction
pub use book::{BookStats, OrderBook, SEQUENCE_WINDOW};

// Re-exports - CSV I/O
pub use loader::{MboCsvReader, MbpCsvWriter, ReaderStats, IO_BUFFER_SIZE};

// Re-exports - Driver
pub use driver::{Driver, RunStats};
