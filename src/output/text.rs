//! Plain-text output for duplicate scan results.
//!
//! Pairs go to the primary writer (stdout), one line each:
//!
//! ```text
//! found duplicated files: /data/a.txt and /data/b.txt
//! ```
//!
//! Skipped files go to the error writer (stderr):
//!
//! ```text
//! Error on file: /data/locked.bin, Permission denied
//! ```
//!
//! A summary line follows the pairs unless quiet.

use std::io::{self, Write};

use crate::duplicates::{DuplicatePair, ScanSummary};

/// Text formatter.
pub struct TextOutput<'a> {
    pairs: &'a [DuplicatePair],
    summary: &'a ScanSummary,
    quiet: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(pairs: &'a [DuplicatePair], summary: &'a ScanSummary) -> Self {
        Self {
            pairs,
            summary,
            quiet: false,
        }
    }

    /// Omit the summary line.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Write pairs and the summary to `out`, skipped files to `err`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by either writer.
    pub fn write_to<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> io::Result<()> {
        for pair in self.pairs {
            writeln!(
                out,
                "found duplicated files: {} and {}",
                pair.original.path.display(),
                pair.duplicate.path.display()
            )?;
        }

        for error in &self.summary.scan_errors {
            writeln!(
                err,
                "Error on file: {}, {}",
                error.path().display(),
                error.reason()
            )?;
        }

        if !self.quiet {
            writeln!(out, "{}", self.summary_line())?;
        }

        out.flush()?;
        err.flush()
    }

    /// One-line scan summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let s = self.summary;
        let mut line = format!(
            "{} duplicate pair(s), {} reclaimable; {} files ({}) scanned in {:.2}s",
            s.duplicate_pairs,
            s.reclaimable_display(),
            s.total_files,
            s.total_size_display(),
            s.scan_duration.as_secs_f64()
        );
        if s.has_errors() {
            line.push_str(&format!(", {} skipped", s.scan_errors.len()));
        }
        if s.verify_mismatches > 0 {
            line.push_str(&format!(
                ", {} fingerprint match(es) failed verification",
                s.verify_mismatches
            ));
        }
        line
    }
}
