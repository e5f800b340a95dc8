//! The order-book state machine.
//!
//! High-performance implementation using:
//! - `BTreeMap` for sorted price levels (bids read in reverse, asks forward)
//! - ahash `AHashMap` for order lookups
//! - A fixed-size pending window for trade-sequence detection
//! - Minimal allocations on the hot path
//!
//! `apply` is a total function: malformed or logically-irrelevant events are
//! silently ignored, never errors. Error reporting belongs to the feed
//! parser upstream.

use ahash::AHashMap;
use std::collections::{BTreeMap, VecDeque};

use crate::book::level::{update_price_level, LevelTotals};
use crate::types::{Action, MboEvent, Order, PriceLevel, Side};

/// Length of the trade-sequence pattern, and therefore the size the pending
/// buffer is capped to. Only the last three execution records can ever
/// participate in a match, so a sliding window of the pattern length finds
/// every adjacent run without retaining unmatched records forever.
pub const SEQUENCE_WINDOW: usize = 3;

/// Pre-sizing hint for the order map. Non-semantic.
const ORDER_MAP_CAPACITY: usize = 10_000;

/// One execution-coded event retained for pattern matching.
///
/// Only the fields the resolution step reads are kept: the action for the
/// pattern test, and the fill's side and order id for the removal.
#[derive(Debug, Clone, Copy)]
struct PendingExec {
    action: Action,
    side: Side,
    order_id: u64,
}

/// Counters for monitoring book activity.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BookStats {
    /// Total events applied (including no-ops)
    pub events_applied: u64,

    /// Complete Trade->Fill->Cancel runs resolved as one unit
    pub sequences_resolved: u64,

    /// Cancels processed through the standalone path
    pub standalone_cancels: u64,

    /// Events that by definition never touch book state
    /// (Reset, side-None trades, Modify, unknown codes)
    pub ignored_events: u64,
}

/// Live order book rebuilt from a sequential MBO feed.
///
/// Owns three collections: the order map, and one sorted level map per side.
/// Bid levels are read best-first in descending price order, ask levels in
/// ascending order; that ordering defines "top N" for snapshot output.
///
/// # Example
///
/// ```
/// use mbp_reconstructor::{Action, MboEvent, OrderBook, Side};
///
/// let mut book = OrderBook::new();
/// book.apply(&MboEvent::new(1, Action::Add, Side::Bid, 100_000_000_000, 100));
/// book.apply(&MboEvent::new(2, Action::Add, Side::Bid, 100_000_000_000, 50));
///
/// let bids = book.top_levels(Side::Bid, 10);
/// assert_eq!(bids.len(), 1);
/// assert_eq!(bids[0].size, 150);
/// assert_eq!(bids[0].count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Order tracking: order_id -> Order
    orders: AHashMap<u64, Order>,

    /// Bid levels, iterated in reverse for best-first (highest) order
    bids: BTreeMap<i64, LevelTotals>,

    /// Ask levels, iterated forward for best-first (lowest) order
    asks: BTreeMap<i64, LevelTotals>,

    /// Sliding window of recent execution-coded events
    pending: VecDeque<PendingExec>,

    /// Activity counters
    stats: BookStats,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with the default order-map capacity hint.
    pub fn new() -> Self {
        Self::with_capacity(ORDER_MAP_CAPACITY)
    }

    /// Create an empty book sized for roughly `orders` concurrently live
    /// orders. Purely an allocator hint; behavior is identical.
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            orders: AHashMap::with_capacity(orders),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            pending: VecDeque::with_capacity(SEQUENCE_WINDOW + 1),
            stats: BookStats::default(),
        }
    }

    /// Apply a single MBO event to the book.
    ///
    /// Side-effecting only; never fails. Events that reference non-live
    /// orders, carry unknown codes, or are defined as book-neutral (Reset,
    /// side-None trades) leave the book unchanged.
    pub fn apply(&mut self, event: &MboEvent) {
        self.stats.events_applied += 1;

        match event.action {
            // The reconstruction starts from an empty book, so the feed's
            // reset marker is redundant; it is echoed in output only.
            Action::Reset => self.stats.ignored_events += 1,

            // Anonymous trade print with no resting-order counterpart
            // visible to this reconstruction.
            Action::Trade if event.side == Side::None => self.stats.ignored_events += 1,

            Action::Trade | Action::Fill | Action::Cancel => self.apply_execution(event),

            Action::Add => self.add_order(event),

            Action::Modify | Action::Unknown(_) => self.stats.ignored_events += 1,
        }
    }

    /// Add a new order and credit its price level.
    fn add_order(&mut self, event: &MboEvent) {
        let order = Order {
            side: event.side,
            price: event.price,
            size: event.size,
        };

        if let Some(stale) = self.orders.insert(event.order_id, order) {
            log::debug!(
                "order {} re-added while live (stale price={}, size={})",
                event.order_id,
                stale.price,
                stale.size
            );
        }

        match event.side {
            Side::Bid => update_price_level(&mut self.bids, event.price, event.size as i64, 1),
            Side::Ask => update_price_level(&mut self.asks, event.price, event.size as i64, 1),
            Side::None => {}
        }
    }

    /// Feed one Trade/Fill/Cancel-coded event through sequence detection.
    ///
    /// The feed represents one execution as three consecutive records: a
    /// Trade print (opposite side), a Fill (actual book side), and a Cancel
    /// finalizing removal. Every execution-coded event enters the window;
    /// when the last three match the exact (Trade, Fill, Cancel) pattern
    /// they are consumed and resolved as one unit. A Cancel that does not
    /// complete a pattern is processed immediately as a standalone cancel so
    /// an order is never left stuck if its Trade/Fill partners never arrive.
    fn apply_execution(&mut self, event: &MboEvent) {
        self.pending.push_back(PendingExec {
            action: event.action,
            side: event.side,
            order_id: event.order_id,
        });
        if self.pending.len() > SEQUENCE_WINDOW {
            self.pending.pop_front();
        }

        if self.sequence_complete() {
            // Resolution keys off the Fill record: its side selects the
            // level map (the Trade print sits on the opposite side), its
            // order id identifies the resting order.
            let fill = self.pending[1];
            self.pending.clear();
            self.stats.sequences_resolved += 1;

            if !self.remove_if_live(fill.order_id, Some(fill.side)) {
                // Already removed, typically by the standalone-cancel
                // fallback of an earlier window.
                log::debug!(
                    "trade sequence for order {} resolved against non-live order",
                    fill.order_id
                );
            }
            return;
        }

        if event.action == Action::Cancel && self.remove_if_live(event.order_id, None) {
            self.stats.standalone_cancels += 1;
        }
    }

    /// Test the window for the exact (Trade, Fill, Cancel) run.
    #[inline]
    fn sequence_complete(&self) -> bool {
        self.pending.len() == SEQUENCE_WINDOW
            && self.pending[0].action == Action::Trade
            && self.pending[1].action == Action::Fill
            && self.pending[2].action == Action::Cancel
    }

    /// Remove an order if it is live, debiting its level by the *stored*
    /// price and size. Returns whether an order was removed.
    ///
    /// Both removal paths (standalone cancel and sequence resolution) route
    /// through here, which makes removal idempotent per order id: the
    /// fallback cancel and a later pattern match for the same order cannot
    /// double-debit a level. `side_override` is the Fill record's side when
    /// resolving a sequence; standalone cancels use the order's stored side.
    fn remove_if_live(&mut self, order_id: u64, side_override: Option<Side>) -> bool {
        let order = match self.orders.remove(&order_id) {
            Some(order) => order,
            None => return false,
        };

        let levels = match side_override.unwrap_or(order.side) {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None => return true,
        };
        update_price_level(levels, order.price, -(order.size as i64), -1);
        true
    }

    /// Return up to `n` levels for `side`, best-first (descending price for
    /// bids, ascending for asks). Returns fewer if fewer exist; never fails.
    pub fn top_levels(&self, side: Side, n: usize) -> Vec<PriceLevel> {
        match side {
            Side::Bid => self
                .bids
                .iter()
                .rev()
                .take(n)
                .map(|(&price, totals)| Self::as_price_level(price, totals))
                .collect(),
            Side::Ask => self
                .asks
                .iter()
                .take(n)
                .map(|(&price, totals)| Self::as_price_level(price, totals))
                .collect(),
            Side::None => Vec::new(),
        }
    }

    #[inline]
    fn as_price_level(price: i64, totals: &LevelTotals) -> PriceLevel {
        debug_assert!(totals.size > 0 && totals.count > 0);
        PriceLevel {
            price,
            size: totals.size.clamp(0, u32::MAX as i64) as u32,
            count: totals.count.max(0) as u32,
        }
    }

    /// Best (highest) bid price, if any.
    #[inline]
    pub fn best_bid(&self) -> Option<i64> {
        self.bids.keys().next_back().copied()
    }

    /// Best (lowest) ask price, if any.
    #[inline]
    pub fn best_ask(&self) -> Option<i64> {
        self.asks.keys().next().copied()
    }

    /// Number of live orders.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of price levels on the bid side.
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of price levels on the ask side.
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Current depth of the pending execution window (at most
    /// [`SEQUENCE_WINDOW`]).
    pub fn pending_depth(&self) -> usize {
        self.pending.len()
    }

    /// Activity counters.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Reset the book to its empty state for reuse.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.pending.clear();
        self.stats = BookStats::default();
    }
}
