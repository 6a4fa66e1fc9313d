//! Sorting a feature file into address order.
//!
//! Reconstruction expects non-decreasing addresses; bulk_extractor's output
//! is only roughly ordered when scanners run in parallel.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use gestalt_error::Result;
use gestalt_types::{ByteAddress, is_blank, is_comment, parse_address_field};
use tracing::{debug, info};

/// File-name prefix of the default sort output.
pub const SORTED_PREFIX: &str = "sorted_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    pub lines_read: usize,
    pub skipped_lines: usize,
    pub records: usize,
}

struct Record {
    address: ByteAddress,
    line_number: usize,
    line: Vec<u8>,
}

/// Read feature lines, drop comments and blank lines, and write the rest in
/// address order. Lines with equal addresses keep their input order.
///
/// Fails if any two addresses cannot be ordered against each other.
pub fn sort_feature_lines<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
) -> Result<SortStats> {
    let mut stats = SortStats::default();
    let mut records = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        stats.lines_read += 1;
        if is_comment(&line) || is_blank(&line) {
            stats.skipped_lines += 1;
            continue;
        }
        let address = parse_address_field(&line)
            .map_err(|err| err.at_line(stats.lines_read))?;
        records.push(Record {
            address,
            line_number: stats.lines_read,
            line: line.clone(),
        });
    }
    debug!(records = records.len(), "sorting feature lines");

    records.sort_by(|a, b| a.address.cmp(&b.address));
    // Any incomparable pair in the set leaves an incomparable pair of
    // neighbors in this order.
    for pair in records.windows(2) {
        pair[0]
            .address
            .try_cmp(&pair[1].address)
            .map_err(|err| err.at_line(pair[1].line_number))?;
    }

    for record in &records {
        writer.write_all(&record.line)?;
        if !record.line.ends_with(b"\n") {
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;

    stats.records = records.len();
    Ok(stats)
}

/// `sorted_<basename>` in the current directory.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(SORTED_PREFIX);
    if let Some(base) = input.file_name() {
        name.push(base);
    }
    PathBuf::from(name)
}

/// Sort `input` into `output`.
pub fn sort_feature_file(input: &Path, output: &Path) -> Result<SortStats> {
    info!(input = %input.display(), output = %output.display(), "sorting feature file");
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    let stats = sort_feature_lines(reader, writer)?;
    info!(
        records = stats.records,
        skipped = stats.skipped_lines,
        "sort complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestalt_error::GestaltError;

    fn sort(input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        sort_feature_lines(input, &mut out)?;
        Ok(out)
    }

    #[test]
    fn orders_by_address_numerically() {
        let out = sort(b"# header\n12\tb\tb\n3\ta\ta\n12-GZIP-5\tc\tc\n").expect("sort");
        assert_eq!(out, b"3\ta\ta\n12\tb\tb\n12-GZIP-5\tc\tc\n");
    }

    #[test]
    fn equal_addresses_keep_input_order() {
        let out = sort(b"7\tsecond\tsecond\n5\tx\tx\n7\tfirst\tfirst\n").expect("sort");
        assert_eq!(out, b"5\tx\tx\n7\tsecond\tsecond\n7\tfirst\tfirst\n");
    }

    #[test]
    fn terminates_final_line() {
        let out = sort(b"9\ta\ta\n1\tb\tb").expect("sort");
        assert_eq!(out, b"1\tb\tb\n9\ta\ta\n");
    }

    #[test]
    fn incomparable_addresses_abort() {
        let err = sort(b"20-GZIP-4\ta\ta\n20-30\tb\tb\n").expect_err("incomparable");
        match err {
            GestaltError::AtLine { source, .. } => {
                assert!(matches!(*source, GestaltError::IncomparableAddresses { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_output_uses_basename() {
        assert_eq!(
            default_output_path(Path::new("/data/run1/email.txt")),
            PathBuf::from("sorted_email.txt")
        );
    }
}
