//! Load a file of `begin<TAB>end<TAB>...` range records and answer longest-prefix match queries
//! for the addresses read from stdin, one per line.
//!
//! ```text
//! cargo run --example range_lookup -- ranges.tsv < addresses.txt
//! ```
//!
//! Records that cannot be parsed are reported on stderr together with their line number.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use log::{LevelFilter, Log, Metadata, Record};
use lpm_trie::*;

/// Writes `info` and above to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= LevelFilter::Info
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: range_lookup <ranges file>")?;
    log::set_logger(&LOGGER).map_err(|e| e.to_string())?;
    log::set_max_level(LevelFilter::Info);

    let mut trie = PrefixTrie::new();
    let stats = ingest::load_ranges(BufReader::new(File::open(&path)?), &mut trie)?;
    trie.compress();
    eprintln!(
        "{path}: {} records, {} skipped, depth {}",
        stats.inserted,
        stats.skipped,
        trie.depth()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        match query.parse::<Prefix>() {
            Ok(prefix) => match trie.lookup_prefix(&prefix) {
                Some((_, record)) => writeln!(out, "{query} => {record}")?,
                None => writeln!(out, "{query} => no match")?,
            },
            Err(e) => writeln!(out, "{query} => {e}")?,
        }
    }
    Ok(())
}
