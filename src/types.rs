//! Core data types for MBO events and aggregated price levels.
//!
//! These types are designed to be:
//! - Memory efficient (fixed-size fields wherever the feed allows)
//! - Cheap to move around the hot path (the event is consumed by reference)
//! - Faithful to the delimited feed format (raw codes are preserved so the
//!   emitter can echo them verbatim)

use serde::{Deserialize, Serialize};

/// Number of price levels rendered per side in MBP output.
pub const MBP_DEPTH: usize = 10;

/// Fixed-point price scale: prices are stored as integer units of 1e-9 dollars.
pub const PRICE_SCALE: f64 = 1e9;

/// MBO action type (what happened to the order).
///
/// The feed encodes the cancel that terminates a trade sequence identically
/// to a plain cancel (`'C'`); the two are disambiguated by buffer-pattern
/// matching in the book, not by a distinct code. Unrecognized codes are kept
/// in `Unknown` so output rows can echo them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Add new order to book
    Add,
    /// Modify existing order (ignored by this reconstruction)
    Modify,
    /// Cancel/remove order (also the terminal record of a trade sequence)
    Cancel,
    /// Trade print (public side of an execution)
    Trade,
    /// Fill (book-side detail of an execution)
    Fill,
    /// Clear/reset marker, echoed but never applied
    Reset,
    /// Any other code, carried through for output fidelity
    Unknown(u8),
}

impl Action {
    /// Parse an action from its single-character feed code.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'A' => Action::Add,
            b'M' => Action::Modify,
            b'C' => Action::Cancel,
            b'T' => Action::Trade,
            b'F' => Action::Fill,
            b'R' => Action::Reset,
            other => Action::Unknown(other),
        }
    }

    /// Convert back to the feed's byte representation.
    pub fn to_byte(self) -> u8 {
        match self {
            Action::Add => b'A',
            Action::Modify => b'M',
            Action::Cancel => b'C',
            Action::Trade => b'T',
            Action::Fill => b'F',
            Action::Reset => b'R',
            Action::Unknown(other) => other,
        }
    }

    /// Whether this action participates in trade-sequence detection.
    #[inline]
    pub fn is_execution(self) -> bool {
        matches!(self, Action::Trade | Action::Fill | Action::Cancel)
    }
}

/// Order side (bid or ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy order (bid)
    Bid = b'B',
    /// Sell order (ask)
    Ask = b'A',
    /// Non-directional (used for anonymous trade prints)
    None = b'N',
}

impl Side {
    /// Parse side from a byte. Unrecognized codes map to `None`.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'B' => Side::Bid,
            b'A' => Side::Ask,
            _ => Side::None,
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if this is a bid.
    #[inline(always)]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }

    /// Check if this is an ask.
    #[inline(always)]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }
}

/// Market By Order (MBO) event.
///
/// One event per input record. Timestamps are opaque strings: the
/// reconstruction never interprets them, it only echoes them into output
/// rows. Events are immutable once constructed and consumed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MboEvent {
    /// Receipt timestamp (opaque)
    pub ts_recv: String,

    /// Exchange timestamp (opaque)
    pub ts_event: String,

    /// Record type code
    pub rtype: u8,

    /// Publisher identifier
    pub publisher_id: u16,

    /// Instrument identifier
    pub instrument_id: u32,

    /// Order action
    pub action: Action,

    /// Order side
    pub side: Side,

    /// Price in fixed-point format (divide by 1e9 for dollars)
    pub price: i64,

    /// Order size in shares/contracts
    pub size: u32,

    /// Channel identifier
    pub channel_id: u16,

    /// Unique order identifier
    pub order_id: u64,

    /// Venue flags, echoed verbatim
    pub flags: u32,

    /// Delta between matching-engine and gateway timestamps
    pub ts_in_delta: i32,

    /// Monotonically non-decreasing sequence number
    pub sequence: u64,

    /// Instrument symbol
    pub symbol: String,
}

impl MboEvent {
    /// Create an event with the fields the book cares about; the remaining
    /// pass-through fields get neutral defaults. Mostly useful for tests and
    /// benchmarks.
    pub fn new(order_id: u64, action: Action, side: Side, price: i64, size: u32) -> Self {
        Self {
            ts_recv: String::new(),
            ts_event: String::new(),
            rtype: 160,
            publisher_id: 0,
            instrument_id: 0,
            action,
            side,
            price,
            size,
            channel_id: 0,
            order_id,
            flags: 0,
            ts_in_delta: 0,
            sequence: 0,
            symbol: String::new(),
        }
    }

    /// Set the symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Set the sequence number.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Get price as floating point dollars.
    #[inline]
    pub fn price_as_f64(&self) -> f64 {
        self.price as f64 / PRICE_SCALE
    }
}

/// Order information tracked while the order is live.
///
/// Minimal representation: cancels and sequence resolutions debit the book
/// using these stored values, never the triggering event's own price/size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub side: Side,
    pub price: i64,
    pub size: u32,
}

/// Aggregated price level as exposed by book queries and output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price in fixed-point format
    pub price: i64,

    /// Total size of all live orders at this price
    pub size: u32,

    /// Number of live orders contributing to this level
    pub count: u32,
}

impl PriceLevel {
    /// Get the level price as floating point dollars.
    #[inline]
    pub fn price_as_f64(&self) -> f64 {
        self.price as f64 / PRICE_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_byte() {
        assert_eq!(Action::from_byte(b'A'), Action::Add);
        assert_eq!(Action::from_byte(b'M'), Action::Modify);
        assert_eq!(Action::from_byte(b'C'), Action::Cancel);
        assert_eq!(Action::from_byte(b'T'), Action::Trade);
        assert_eq!(Action::from_byte(b'F'), Action::Fill);
        assert_eq!(Action::from_byte(b'R'), Action::Reset);
        assert_eq!(Action::from_byte(b'X'), Action::Unknown(b'X'));
    }

    #[test]
    fn test_action_round_trip() {
        for byte in [b'A', b'M', b'C', b'T', b'F', b'R', b'?'] {
            assert_eq!(Action::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn test_action_is_execution() {
        assert!(Action::Trade.is_execution());
        assert!(Action::Fill.is_execution());
        assert!(Action::Cancel.is_execution());
        assert!(!Action::Add.is_execution());
        assert!(!Action::Reset.is_execution());
        assert!(!Action::Unknown(b'?').is_execution());
    }

    #[test]
    fn test_side_from_byte() {
        assert_eq!(Side::from_byte(b'B'), Side::Bid);
        assert_eq!(Side::from_byte(b'A'), Side::Ask);
        assert_eq!(Side::from_byte(b'N'), Side::None);
        // Unknown side codes degrade to None rather than erroring
        assert_eq!(Side::from_byte(b'X'), Side::None);
    }

    #[test]
    fn test_side_checks() {
        assert!(Side::Bid.is_bid());
        assert!(!Side::Ask.is_bid());
        assert!(Side::Ask.is_ask());
        assert!(!Side::None.is_bid());
        assert!(!Side::None.is_ask());
    }

    #[test]
    fn test_event_price_conversion() {
        let event = MboEvent::new(123, Action::Add, Side::Bid, 100_000_000_000, 100);
        assert_eq!(event.price_as_f64(), 100.0);
    }

    #[test]
    fn test_event_builders() {
        let event = MboEvent::new(1, Action::Add, Side::Bid, 0, 0)
            .with_symbol("ARL")
            .with_sequence(851012);
        assert_eq!(event.symbol, "ARL");
        assert_eq!(event.sequence, 851012);
    }
}
