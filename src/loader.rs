//! Delimited-text feed loading and snapshot writing.
//!
//! This module is the I/O boundary of the pipeline: it turns raw MBO feed
//! lines into structured [`MboEvent`]s and writes rendered MBP rows back
//! out. All malformed-input detection lives here; the book downstream only
//! ever sees well-formed events.
//!
//! Field order (>= 15 fields per record, one header line first):
//! ts_recv, ts_event, rtype, publisher_id, instrument_id, action, side,
//! price, size, channel_id, order_id, flags, ts_in_delta, sequence, symbol.
//!
//! Blank price and size fields are legal (0.0 and 0 respectively, as the
//! feed emits for reset markers); blank action/side codes degrade to the
//! `'?'` placeholder and `None`.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{MbpError, Result};
use crate::mbp;
use crate::types::{Action, MboEvent, Side, PRICE_SCALE};

/// Minimum number of fields a feed record must carry.
pub const MIN_FIELDS: usize = 15;

/// I/O buffer size for reading and writing.
///
/// Default buffers are 8KB; a larger buffer reduces syscall overhead on the
/// one-row-per-event output path.
pub const IO_BUFFER_SIZE: usize = 1024 * 1024; // 1 MB

/// Statistics for feed reading.
#[derive(Debug, Clone, Default)]
pub struct ReaderStats {
    /// Records successfully converted into events
    pub records_read: u64,

    /// Records dropped in skip-invalid mode
    pub records_skipped: u64,
}

/// Streaming reader over a delimited MBO feed.
///
/// Yields `Result<MboEvent>` per record. By default a malformed record ends
/// in an error item; with [`skip_invalid`](Self::skip_invalid) enabled it is
/// logged and skipped instead, and processing continues.
///
/// # Example
///
/// ```
/// use mbp_reconstructor::loader::MboCsvReader;
/// use std::io::Cursor;
///
/// let feed = "ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol\n\
///             t0,t1,160,2,1108,A,B,5.51,100,0,1001,130,165200,851012,ARL\n";
/// let mut reader = MboCsvReader::new(Cursor::new(feed));
/// let event = reader.next().unwrap().unwrap();
/// assert_eq!(event.order_id, 1001);
/// assert_eq!(event.price, 5_510_000_000);
/// ```
pub struct MboCsvReader<R: Read> {
    reader: csv::Reader<R>,

    /// Reusable record buffer, avoids per-row allocation of field storage
    record: StringRecord,

    stats: ReaderStats,

    skip_invalid: bool,
}

impl<R: Read> MboCsvReader<R> {
    /// Create a reader over `inner`. The first line is consumed as header.
    pub fn new(inner: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(IO_BUFFER_SIZE)
            .from_reader(inner);

        Self {
            reader,
            record: StringRecord::new(),
            stats: ReaderStats::default(),
            skip_invalid: false,
        }
    }

    /// Enable skipping records that fail to parse.
    ///
    /// When enabled, malformed records are logged and counted instead of
    /// surfacing as errors.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Get current statistics.
    pub fn stats(&self) -> &ReaderStats {
        &self.stats
    }
}

impl<R: Read> Iterator for MboCsvReader<R> {
    type Item = Result<MboEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {
                    let line = self
                        .record
                        .position()
                        .map(|p| p.line())
                        .unwrap_or_default();
                    match parse_event(&self.record, line) {
                        Ok(event) => {
                            self.stats.records_read += 1;
                            return Some(Ok(event));
                        }
                        Err(e) => {
                            if self.skip_invalid {
                                log::warn!("skipping record: {e}");
                                self.stats.records_skipped += 1;
                                continue;
                            }
                            return Some(Err(e));
                        }
                    }
                }
                // Reader-level failures (I/O, invalid UTF-8) are fatal even
                // in skip-invalid mode.
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Convert one raw record into an [`MboEvent`].
///
/// `line` is the 1-based input line for error reporting.
pub fn parse_event(record: &StringRecord, line: u64) -> Result<MboEvent> {
    if record.len() < MIN_FIELDS {
        return Err(MbpError::malformed(
            line,
            format!("expected at least {MIN_FIELDS} fields, got {}", record.len()),
        ));
    }

    Ok(MboEvent {
        ts_recv: field(record, 0).to_string(),
        ts_event: field(record, 1).to_string(),
        rtype: parse_num(record, 2, line, "rtype")?,
        publisher_id: parse_num(record, 3, line, "publisher_id")?,
        instrument_id: parse_num(record, 4, line, "instrument_id")?,
        action: Action::from_byte(code_byte(field(record, 5))),
        side: Side::from_byte(code_byte(field(record, 6))),
        price: parse_price(field(record, 7), line)?,
        size: parse_num_or_zero(record, 8, line, "size")?,
        channel_id: parse_num(record, 9, line, "channel_id")?,
        order_id: parse_num(record, 10, line, "order_id")?,
        flags: parse_num(record, 11, line, "flags")?,
        ts_in_delta: parse_num(record, 12, line, "ts_in_delta")?,
        sequence: parse_num(record, 13, line, "sequence")?,
        symbol: field(record, 14).to_string(),
    })
}

#[inline]
fn field<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}

/// First byte of a single-character code field, `'?'` when blank.
#[inline]
fn code_byte(raw: &str) -> u8 {
    raw.bytes().next().unwrap_or(b'?')
}

fn parse_num<T>(record: &StringRecord, idx: usize, line: u64, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = field(record, idx);
    raw.parse::<T>()
        .map_err(|e| MbpError::malformed(line, format!("bad {name} {raw:?}: {e}")))
}

fn parse_num_or_zero(record: &StringRecord, idx: usize, line: u64, name: &str) -> Result<u32> {
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|e| MbpError::malformed(line, format!("bad {name} {raw:?}: {e}")))
}

/// Parse a decimal price field into fixed-point units. Blank means 0.0.
fn parse_price(raw: &str, line: u64) -> Result<i64> {
    if raw.is_empty() {
        return Ok(0);
    }
    let value: f64 = raw
        .parse()
        .map_err(|e| MbpError::malformed(line, format!("bad price {raw:?}: {e}")))?;
    Ok((value * PRICE_SCALE).round() as i64)
}

/// Writer for rendered MBP snapshot rows.
pub struct MbpCsvWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

impl<W: Write> MbpCsvWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .buffer_capacity(IO_BUFFER_SIZE)
            .from_writer(inner);
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Write the MBP column header.
    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_record(&mbp::header())?;
        Ok(())
    }

    /// Write one rendered snapshot row.
    pub fn write_row(&mut self, fields: &[String]) -> Result<()> {
        self.writer.write_record(fields)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush buffered output to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of data rows written so far (header excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol";

    fn reader_over(lines: &[&str]) -> MboCsvReader<Cursor<String>> {
        let body = format!("{HEADER}\n{}\n", lines.join("\n"));
        MboCsvReader::new(Cursor::new(body))
    }

    #[test]
    fn test_parse_full_record() {
        let mut reader = reader_over(&[
            "2025-07-17T08:05:03.360677248Z,2025-07-17T08:05:03.360603039Z,160,2,1108,A,B,5.51,100,0,817593,130,165200,851012,ARL",
        ]);
        let event = reader.next().unwrap().unwrap();

        assert_eq!(event.ts_recv, "2025-07-17T08:05:03.360677248Z");
        assert_eq!(event.rtype, 160);
        assert_eq!(event.publisher_id, 2);
        assert_eq!(event.instrument_id, 1108);
        assert_eq!(event.action, Action::Add);
        assert_eq!(event.side, Side::Bid);
        assert_eq!(event.price, 5_510_000_000);
        assert_eq!(event.size, 100);
        assert_eq!(event.channel_id, 0);
        assert_eq!(event.order_id, 817593);
        assert_eq!(event.flags, 130);
        assert_eq!(event.ts_in_delta, 165200);
        assert_eq!(event.sequence, 851012);
        assert_eq!(event.symbol, "ARL");
        assert!(reader.next().is_none());
        assert_eq!(reader.stats().records_read, 1);
    }

    #[test]
    fn test_parse_blank_price_size_and_codes() {
        let mut reader = reader_over(&["t0,t1,160,2,1108,R,N,,,0,0,8,0,0,ARL"]);
        let event = reader.next().unwrap().unwrap();

        assert_eq!(event.action, Action::Reset);
        assert_eq!(event.side, Side::None);
        assert_eq!(event.price, 0);
        assert_eq!(event.size, 0);
    }

    #[test]
    fn test_blank_action_becomes_unknown_placeholder() {
        let mut reader = reader_over(&["t0,t1,160,2,1108,,,1.00,5,0,1,0,0,0,ARL"]);
        let event = reader.next().unwrap().unwrap();
        assert_eq!(event.action, Action::Unknown(b'?'));
        assert_eq!(event.side, Side::None);
    }

    #[test]
    fn test_short_record_is_malformed() {
        let mut reader = reader_over(&["t0,t1,160"]);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, MbpError::MalformedRecord { .. }));
    }

    #[test]
    fn test_bad_numeric_field_is_malformed() {
        let mut reader = reader_over(&["t0,t1,xyz,2,1108,A,B,5.51,100,0,1,130,0,0,ARL"]);
        let err = reader.next().unwrap().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("rtype"), "unexpected error: {text}");
    }

    #[test]
    fn test_skip_invalid_counts_and_continues() {
        let mut reader = reader_over(&[
            "t0,t1,xyz,2,1108,A,B,5.51,100,0,1,130,0,0,ARL",
            "t0,t1,160,2,1108,A,B,5.51,100,0,2,130,0,1,ARL",
        ])
        .skip_invalid(true);

        let event = reader.next().unwrap().unwrap();
        assert_eq!(event.order_id, 2);
        assert!(reader.next().is_none());
        assert_eq!(reader.stats().records_skipped, 1);
        assert_eq!(reader.stats().records_read, 1);
    }

    #[test]
    fn test_negative_price_parses() {
        let mut reader = reader_over(&["t0,t1,160,2,1108,A,B,-0.25,100,0,1,130,0,0,ARL"]);
        let event = reader.next().unwrap().unwrap();
        assert_eq!(event.price, -250_000_000);
    }

    #[test]
    fn test_writer_round_trip() {
        let mut buf = Vec::new();
        {
            let mut writer = MbpCsvWriter::new(&mut buf);
            writer.write_header().unwrap();
            // A row must carry exactly as many fields as the header.
            let mut row = vec![String::new(); mbp::COLUMN_COUNT];
            row[0] = "0".to_string();
            row[1] = "t0".to_string();
            writer.write_row(&row).unwrap();
            writer.flush().unwrap();
            assert_eq!(writer.rows_written(), 1);
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with(",ts_recv,ts_event,"));
        assert!(lines.next().unwrap().starts_with("0,t0,"));
    }
}
