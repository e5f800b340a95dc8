//! CLI tool for reconstructing MBP-10 snapshots from an MBO CSV feed.
//!
//! Replays every order-level event through a live book and writes one
//! snapshot row (top 10 price levels per side) per input event.
//!
//! # Usage
//!
//! ```bash
//! # Reconstruct with the default output path
//! cargo run --release --bin reconstruct_mbp -- data/mbo.csv
//!
//! # Explicit output path, tolerate malformed records
//! cargo run --release --bin reconstruct_mbp -- \
//!     --input data/mbo.csv \
//!     --output data/mbp.csv \
//!     --skip-invalid
//! ```

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use mbp_reconstructor::{Driver, IO_BUFFER_SIZE};

/// Command-line arguments
struct Args {
    /// Input MBO CSV file
    input: PathBuf,
    /// Output MBP-10 CSV file
    output: PathBuf,
    /// Skip malformed records instead of aborting
    skip_invalid: bool,
    /// Print the run stats as JSON on completion
    json_stats: bool,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut skip_invalid = false;
    let mut json_stats = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                i += 1;
                if i >= args.len() {
                    return Err("--input requires a path".to_string());
                }
                input = Some(PathBuf::from(&args[i]));
            }
            "--output" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a path".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "--skip-invalid" | "-s" => {
                skip_invalid = true;
            }
            "--json-stats" | "-j" => {
                json_stats = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                // Positional arguments
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else if output.is_none() {
                    output = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("Unknown argument: {}", arg));
                }
            }
        }
        i += 1;
    }

    let input = input.ok_or("Input path is required")?;
    let output = output.unwrap_or_else(|| PathBuf::from("output_mbp.csv"));

    Ok(Args {
        input,
        output,
        skip_invalid,
        json_stats,
    })
}

fn print_help() {
    eprintln!(
        r#"
Reconstruct MBP-10 Snapshots from MBO Data

Replays an order-level (MBO) CSV feed through a live limit order book and
writes one top-10-levels-per-side (MBP-10) snapshot row per input event.

USAGE:
    reconstruct_mbp [OPTIONS] --input <FILE>
    reconstruct_mbp <INPUT> [OUTPUT]

OPTIONS:
    -i, --input <FILE>    Input MBO CSV file
    -o, --output <FILE>   Output MBP-10 CSV file [default: output_mbp.csv]
    -s, --skip-invalid    Skip malformed records instead of aborting
    -j, --json-stats      Print run statistics as JSON on completion
    -h, --help            Print this help message

EXAMPLES:
    # Reconstruct with the default output path
    reconstruct_mbp data/mbo.csv

    # Explicit output, tolerant of bad records
    reconstruct_mbp -i data/mbo.csv -o data/mbp.csv --skip-invalid
"#
    );
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Parse arguments
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let input = match File::open(&args.input) {
        Ok(file) => BufReader::with_capacity(IO_BUFFER_SIZE, file),
        Err(e) => {
            eprintln!("Error opening {}: {}", args.input.display(), e);
            std::process::exit(1);
        }
    };

    let output = match File::create(&args.output) {
        Ok(file) => BufWriter::with_capacity(IO_BUFFER_SIZE, file),
        Err(e) => {
            eprintln!("Error creating {}: {}", args.output.display(), e);
            std::process::exit(1);
        }
    };

    let mut driver = Driver::new().skip_invalid(args.skip_invalid);
    let stats = match driver.run(input, output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Reconstruction failed: {}", e);
            std::process::exit(1);
        }
    };

    if args.json_stats {
        println!("{}", stats.to_json());
        return;
    }

    println!("Reconstruction Complete!");
    println!("  Input:  {}", args.input.display());
    println!("  Output: {}", args.output.display());
    println!("  Events processed: {}", stats.events_in);
    println!("  Rows written: {}", stats.rows_out);
    println!("  Records skipped: {}", stats.records_skipped);
    println!("  Sequences resolved: {}", stats.book.sequences_resolved);
    println!("  Standalone cancels: {}", stats.book.standalone_cancels);
    println!(
        "  Throughput: {:.0} events/s ({:.1} ms total)",
        stats.events_per_sec(),
        stats.elapsed_us as f64 / 1000.0
    );
}
