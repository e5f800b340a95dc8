//! MBP-10 snapshot rendering.
//!
//! Flattens the book's current top-10 levels per side, together with the
//! triggering event's own columns, into one delimited output record. Called
//! once per input event, including Reset events and side-None trades: the
//! book's *current* state is snapshotted every time, not only when it
//! changed.

use crate::book::OrderBook;
use crate::types::{MboEvent, PriceLevel, Side, MBP_DEPTH, PRICE_SCALE};

/// Record-type code stamped on every MBP output row.
const RTYPE_MBP: &str = "10";

/// Depth column, constant for this flattened representation.
const DEPTH: &str = "0";

/// Total number of columns in an output row (and in the header).
pub const COLUMN_COUNT: usize = 14 + MBP_DEPTH * 6 + 2;

/// Render a fixed-point price with 2-decimal precision.
#[inline]
pub fn format_price(price: i64) -> String {
    format!("{:.2}", price as f64 / PRICE_SCALE)
}

/// Column names for the output file: a leading unnamed row-index column, the
/// triggering event's columns, the 10x2 level columns with zero-padded level
/// indices, then symbol and order id.
pub fn header() -> Vec<String> {
    let mut columns = Vec::with_capacity(COLUMN_COUNT);
    for name in [
        "",
        "ts_recv",
        "ts_event",
        "rtype",
        "publisher_id",
        "instrument_id",
        "action",
        "side",
        "depth",
        "price",
        "size",
        "flags",
        "ts_in_delta",
        "sequence",
    ] {
        columns.push(name.to_string());
    }

    for i in 0..MBP_DEPTH {
        columns.push(format!("bid_px_{i:02}"));
        columns.push(format!("bid_sz_{i:02}"));
        columns.push(format!("bid_ct_{i:02}"));
        columns.push(format!("ask_px_{i:02}"));
        columns.push(format!("ask_sz_{i:02}"));
        columns.push(format!("ask_ct_{i:02}"));
    }

    columns.push("symbol".to_string());
    columns.push("order_id".to_string());
    columns
}

/// Render one output record: the triggering event's core fields verbatim,
/// then exactly [`MBP_DEPTH`] bid and ask levels best-first, then symbol and
/// order id. Missing levels render as the empty placeholder
/// (empty price, zero size, zero count).
pub fn render(book: &OrderBook, event: &MboEvent, row_index: u64) -> Vec<String> {
    let bids = book.top_levels(Side::Bid, MBP_DEPTH);
    let asks = book.top_levels(Side::Ask, MBP_DEPTH);

    let mut fields = Vec::with_capacity(COLUMN_COUNT);
    fields.push(row_index.to_string());
    fields.push(event.ts_recv.clone());
    fields.push(event.ts_event.clone());
    fields.push(RTYPE_MBP.to_string());
    fields.push(event.publisher_id.to_string());
    fields.push(event.instrument_id.to_string());
    fields.push((event.action.to_byte() as char).to_string());
    fields.push((event.side.to_byte() as char).to_string());
    fields.push(DEPTH.to_string());
    fields.push(format_price(event.price));
    fields.push(event.size.to_string());
    fields.push(event.flags.to_string());
    fields.push(event.ts_in_delta.to_string());
    fields.push(event.sequence.to_string());

    for i in 0..MBP_DEPTH {
        push_level(&mut fields, bids.get(i));
        push_level(&mut fields, asks.get(i));
    }

    fields.push(event.symbol.clone());
    fields.push(event.order_id.to_string());

    debug_assert_eq!(fields.len(), COLUMN_COUNT);
    fields
}

#[inline]
fn push_level(fields: &mut Vec<String>, level: Option<&PriceLevel>) {
    match level {
        Some(level) => {
            fields.push(format_price(level.price));
            fields.push(level.size.to_string());
            fields.push(level.count.to_string());
        }
        None => {
            fields.push(String::new());
            fields.push("0".to_string());
            fields.push("0".to_string());
        }
    }
}
