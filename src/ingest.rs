//! Loading of address range records.
//!
//! Each record is a line of tab-separated fields, where the first two fields are the first and
//! the last address of a range. The range must describe a single CIDR block. The whole line is
//! stored as the value of that block.
//!
//! ```
//! # use lpm_trie::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "10.0.0.0\t10.255.255.255\tprivate\n\
//!             10.1.0.0\t10.1.0.127\tlab\n\
//!             10.2.0.0\t10.2.0.2\tbroken\n";
//! let mut trie = PrefixTrie::new();
//! let stats = ingest::load_ranges(data.as_bytes(), &mut trie)?;
//! assert_eq!(stats, ingest::LoadStats { inserted: 2, skipped: 1 });
//! let (prefix, record) = trie.lookup_ip("10.1.0.5".parse()?).unwrap();
//! assert_eq!(prefix.to_string(), "10.1.0.0/25");
//! assert_eq!(record, "10.1.0.0\t10.1.0.127\tlab");
//! # Ok(())
//! # }
//! ```

use std::io::{self, BufRead};

use log::{info, warn};

use crate::{ParseError, Prefix, PrefixTrie};

/// Outcome of [`load_ranges`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of records inserted into the trie.
    pub inserted: usize,
    /// Number of malformed records that were skipped.
    pub skipped: usize,
}

/// Parse the prefix of a single record. Returns the prefix and the record without its line
/// terminator.
pub fn parse_record(line: &str) -> Result<(Prefix, &str), ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.split('\t').map(str::trim);
    let begin = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField("begin"))?;
    let end = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField("end"))?;
    let prefix = Prefix::from_range(begin.parse()?, end.parse()?)?;
    Ok((prefix, line))
}

/// Read all records from `reader` and insert them into `trie`. Malformed records are skipped, each
/// with a `warn!` naming its line and the parse error; blank lines are ignored. Only I/O errors
/// abort the load.
pub fn load_ranges<R: BufRead>(reader: R, trie: &mut PrefixTrie<String>) -> io::Result<LoadStats> {
    let mut stats = LoadStats::default();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line) {
            Ok((prefix, record)) => {
                trie.insert(prefix, record.to_string());
                stats.inserted += 1;
            }
            Err(e) => {
                warn!("skipping record on line {}: {}", n + 1, e);
                stats.skipped += 1;
            }
        }
    }
    info!(
        "loaded {} records ({} skipped), {} distinct prefixes",
        stats.inserted,
        stats.skipped,
        trie.len()
    );
    Ok(stats)
}
