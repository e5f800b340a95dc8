//! End-to-end reconstruction driver.
//!
//! Streams events from a reader, applies each to the book, and writes one
//! rendered MBP row per event. Single-threaded and synchronous: the book is
//! exclusively owned by the run loop, a snapshot is rendered only after the
//! event that produced it has been fully applied.

use std::io::{Read, Write};
use std::time::Instant;

use serde::Serialize;

use crate::book::{BookStats, OrderBook};
use crate::error::Result;
use crate::loader::{MboCsvReader, MbpCsvWriter};
use crate::mbp;

/// Statistics for one reconstruction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Events successfully parsed and applied
    pub events_in: u64,

    /// Snapshot rows written (one per event)
    pub rows_out: u64,

    /// Malformed records dropped (skip-invalid mode only)
    pub records_skipped: u64,

    /// Wall-clock time for the whole run, microseconds
    pub elapsed_us: u64,

    /// Book activity counters at end of run
    pub book: BookStats,
}

impl RunStats {
    /// Event throughput over the whole run.
    pub fn events_per_sec(&self) -> f64 {
        if self.elapsed_us == 0 {
            return 0.0;
        }
        self.events_in as f64 / (self.elapsed_us as f64 / 1e6)
    }

    /// Render the stats as pretty JSON (for logs and run summaries).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Reconstruction driver: owns the book for the duration of one run.
///
/// # Example
///
/// ```
/// use mbp_reconstructor::Driver;
/// use std::io::Cursor;
///
/// let feed = "ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol\n\
///             t0,t1,160,2,1108,A,B,100.00,100,0,1,130,165200,851012,TEST\n";
///
/// let mut out = Vec::new();
/// let mut driver = Driver::new();
/// let stats = driver.run(Cursor::new(feed), &mut out).unwrap();
/// assert_eq!(stats.rows_out, 1);
/// ```
#[derive(Debug, Default)]
pub struct Driver {
    book: OrderBook,
    skip_invalid: bool,
}

impl Driver {
    /// Create a driver with an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable skipping malformed input records instead of failing the run.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Access the book state (e.g. after a run).
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Run the full reconstruction: header, then one applied event and one
    /// written snapshot row per input record, in input order.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, unwritable output, or (unless skip-invalid
    /// is enabled) the first malformed record.
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<RunStats> {
        let start = Instant::now();

        let mut reader = MboCsvReader::new(input).skip_invalid(self.skip_invalid);
        let mut writer = MbpCsvWriter::new(output);
        writer.write_header()?;

        let mut row_index: u64 = 0;
        for item in reader.by_ref() {
            let event = item?;
            self.book.apply(&event);
            writer.write_row(&mbp::render(&self.book, &event, row_index))?;
            row_index += 1;
        }
        writer.flush()?;

        let elapsed = start.elapsed();
        let stats = RunStats {
            events_in: reader.stats().records_read,
            rows_out: writer.rows_written(),
            records_skipped: reader.stats().records_skipped,
            elapsed_us: elapsed.as_micros() as u64,
            book: self.book.stats().clone(),
        };

        log::info!(
            "reconstructed {} events into {} rows in {:.1?} ({:.0} events/s, {} skipped)",
            stats.events_in,
            stats.rows_out,
            elapsed,
            stats.events_per_sec(),
            stats.records_skipped
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol";

    fn run_feed(lines: &[&str]) -> (RunStats, String) {
        let feed = format!("{HEADER}\n{}\n", lines.join("\n"));
        let mut out = Vec::new();
        let mut driver = Driver::new();
        let stats = driver.run(Cursor::new(feed), &mut out).unwrap();
        (stats, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_one_row_per_event_in_order() {
        let (stats, output) = run_feed(&[
            "t0,t1,160,2,1108,R,N,,,0,0,8,0,0,ARL",
            "t0,t1,160,2,1108,A,B,100.00,100,0,1,130,0,1,ARL",
            "t0,t1,160,2,1108,A,A,101.00,50,0,2,130,0,2,ARL",
        ]);

        assert_eq!(stats.events_in, 3);
        assert_eq!(stats.rows_out, 3);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 rows
        assert!(lines[1].starts_with("0,t0,"));
        assert!(lines[2].starts_with("1,t0,"));
        assert!(lines[3].starts_with("2,t0,"));
    }

    #[test]
    fn test_malformed_record_fails_run_by_default() {
        let feed = format!("{HEADER}\nt0,t1,160\n");
        let mut driver = Driver::new();
        let result = driver.run(Cursor::new(feed), &mut Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_skip_invalid_keeps_going() {
        let feed = format!(
            "{HEADER}\nt0,t1,160\nt0,t1,160,2,1108,A,B,100.00,100,0,1,130,0,1,ARL\n"
        );
        let mut driver = Driver::new().skip_invalid(true);
        let stats = driver.run(Cursor::new(feed), &mut Vec::new()).unwrap();
        assert_eq!(stats.records_skipped, 1);
        assert_eq!(stats.rows_out, 1);
    }

    #[test]
    fn test_stats_json_renders() {
        let (stats, _) = run_feed(&["t0,t1,160,2,1108,A,B,100.00,100,0,1,130,0,1,ARL"]);
        let json = stats.to_json();
        assert!(json.contains("\"events_in\": 1"));
        assert!(json.contains("\"rows_out\": 1"));
    }
}
