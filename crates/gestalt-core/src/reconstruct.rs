//! Whole-file reconstruction: read a feature file, absorb every line, resolve
//! ambiguity, and write the merged feature file with its diagnostic trailer.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use gestalt_error::Result;
use gestalt_types::{FeatureKind, is_blank, is_comment, parse_feature_line};
use serde::Serialize;
use tracing::{debug, info};

use crate::database::{ReconstructionDatabase, ResolutionStats};

/// Heading of the isolated-feature section of the trailer.
pub const ISOLATED_HEADING: &str = "#(Ambiguously-parsed, isolated features)";

/// Counters describing one reconstruction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionSummary {
    pub kind: FeatureKind,
    pub lines_read: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub ambiguous_lines: usize,
    pub candidates: usize,
    pub entries: usize,
    pub pending_ambiguous: usize,
    pub failed_merges: usize,
    pub isolated_ambiguous: usize,
    pub resolution: ResolutionStats,
}

/// Streaming front half of a run: feed lines, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct Reconstructor {
    database: ReconstructionDatabase,
    summary: ReconstructionSummary,
}

impl Reconstructor {
    #[must_use]
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            database: ReconstructionDatabase::new(kind),
            summary: ReconstructionSummary::default(),
        }
    }

    /// Absorb one raw input line (terminator included or not).
    ///
    /// Comment and blank lines are counted and skipped. Parse and ordering
    /// failures are reported with the 1-based line number.
    pub fn absorb_line(&mut self, line: &[u8]) -> Result<()> {
        self.summary.lines_read += 1;
        let line_number = self.summary.lines_read;

        if is_comment(line) {
            self.summary.comment_lines += 1;
            return Ok(());
        }
        if is_blank(line) {
            self.summary.blank_lines += 1;
            return Ok(());
        }

        let candidates = parse_feature_line(line)
            .map_err(|err| err.at_line(line_number))?;
        if candidates.len() > 1 {
            self.summary.ambiguous_lines += 1;
            debug!(
                line = line_number,
                candidates = candidates.len(),
                "fragment occurs more than once in its context"
            );
        }
        self.summary.candidates += candidates.len();

        for candidate in candidates {
            self.database
                .add_feature(candidate, false)
                .map_err(|err| err.at_line(line_number))?;
        }
        Ok(())
    }

    /// Absorb every line of `reader`.
    pub fn absorb_reader<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            self.absorb_line(&line)?;
        }
    }

    /// Resolve parked ambiguous candidates and close the run.
    pub fn finish(mut self) -> Result<Reconstruction> {
        let resolution = self.database.resolve_ambiguous_entries()?;

        let mut summary = self.summary;
        summary.kind = self.database.kind();
        summary.resolution = resolution;
        summary.entries = self.database.len();
        summary.pending_ambiguous = self.database.pending_candidate_count();
        summary.failed_merges = self.database.failed_merges().len();
        summary.isolated_ambiguous = self.database.isolated_ambiguous().len();

        info!(
            kind = %summary.kind,
            lines = summary.lines_read,
            candidates = summary.candidates,
            entries = summary.entries,
            pending = summary.pending_ambiguous,
            failed = summary.failed_merges,
            isolated = summary.isolated_ambiguous,
            passes = resolution.passes,
            "reconstruction complete"
        );

        Ok(Reconstruction {
            database: self.database,
            summary,
        })
    }
}

/// A finished run: merged entries plus diagnostics.
#[derive(Debug)]
pub struct Reconstruction {
    database: ReconstructionDatabase,
    summary: ReconstructionSummary,
}

impl Reconstruction {
    #[must_use]
    pub fn database(&self) -> &ReconstructionDatabase {
        &self.database
    }

    #[must_use]
    pub fn summary(&self) -> &ReconstructionSummary {
        &self.summary
    }

    /// Write the merged feature file followed by the diagnostic trailer.
    pub fn write_feature_file<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in &self.database {
            writeln!(out, "{}", entry.to_feature_file_line())?;
        }

        writeln!(out, "{ISOLATED_HEADING}")?;
        for line in self.database.isolated_origin_lines() {
            out.write_all(b"#")?;
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
        writeln!(
            out,
            "#Ambiguously-parsed features not merged: {}.",
            self.summary.pending_ambiguous
        )?;
        writeln!(
            out,
            "#Unambiguously-parsed features that failed to merge: {}.",
            self.summary.failed_merges
        )?;
        writeln!(
            out,
            "#Ambiguously-parsed, isolated features: {}.",
            self.summary.isolated_ambiguous
        )?;
        out.flush()
    }

    /// Write the features that failed to merge as feature lines, in address
    /// order.
    pub fn write_failed_merges<W: Write>(&self, mut out: W) -> io::Result<()> {
        for feature in self.database.failed_merges().values() {
            writeln!(out, "{}", feature.to_feature_file_line())?;
        }
        out.flush()
    }
}

/// Reconstruct from any buffered reader.
pub fn reconstruct_reader<R: BufRead>(reader: R, kind: FeatureKind) -> Result<Reconstruction> {
    let mut reconstructor = Reconstructor::new(kind);
    reconstructor.absorb_reader(reader)?;
    reconstructor.finish()
}

/// Reconstruct a feature file on disk.
pub fn reconstruct_file(path: &Path, kind: FeatureKind) -> Result<Reconstruction> {
    info!(path = %path.display(), %kind, "reading feature file");
    let file = File::open(path)?;
    reconstruct_reader(BufReader::new(file), kind)
}
