use std::collections::BTreeMap;

use context_error::*;
use pepcore::{NormalizeError, error::NormalizeErrorKind, sequence::ModificationTarget};

use crate::table::TableRow;

/// A row that could not be normalised
#[derive(Clone, Debug)]
pub struct RowFailure {
    /// The index of the line (0 based)
    pub line_index: usize,
    /// The spectrum (or scan) this row describes
    pub spectrum: Option<String>,
    /// The peptide as written in the report
    pub peptide: Option<String>,
    /// The reason this row was rejected
    pub error: NormalizeError,
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Line {}, spectrum '{}', peptide '{}': {}",
            self.line_index + 1,
            self.spectrum.as_deref().unwrap_or("-"),
            self.peptide.as_deref().unwrap_or("-"),
            self.error.get_long_description()
        )
    }
}

/// Everything that went wrong while normalising a report, without stopping the normalisation
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSummary {
    /// The number of modification tokens that could not be parsed
    pub unparsable_modifications: usize,
    /// The unparsable modification tokens, only kept if asked for
    pub offending_tokens: Vec<String>,
    /// The modifications (lowercase name and target) that are not in the modification table
    pub unknown_modifications: Vec<(String, ModificationTarget)>,
    /// All protein accessions that could not be parsed, with the number of times they were seen
    pub unparsed_accessions: BTreeMap<String, usize>,
    /// The number of rows left out, eg because of the accession policy
    pub dropped_rows: usize,
    /// The rows that could not be normalised
    pub failures: Vec<RowFailure>,
    /// All warnings
    pub warnings: Vec<NormalizeError>,
}

impl DiagnosticSummary {
    /// Check if nothing was reported at all
    pub fn is_clean(&self) -> bool {
        self.unparsable_modifications == 0
            && self.unknown_modifications.is_empty()
            && self.unparsed_accessions.is_empty()
            && self.dropped_rows == 0
            && self.failures.is_empty()
            && self.warnings.is_empty()
    }

    /// The total number of unparsed accessions
    pub fn unparsed_accession_count(&self) -> usize {
        self.unparsed_accessions.values().sum()
    }

    /// Record a warning
    pub(crate) fn warn(&mut self, warning: NormalizeError) {
        if warning.get_kind() == NormalizeErrorKind::UnparsableModificationToken {
            self.unparsable_modifications += 1;
        }
        self.warnings.push(warning);
    }

    /// Record a row failure, the spectrum and peptide are read from the given columns
    pub(crate) fn fail(
        &mut self,
        row: &TableRow,
        spectrum_column: &str,
        peptide_column: &str,
        error: NormalizeError,
    ) {
        self.failures.push(RowFailure {
            line_index: row.line_index(),
            spectrum: row.get(spectrum_column).map(ToString::to_string),
            peptide: row.get(peptide_column).map(ToString::to_string),
            error,
        });
    }

    /// Log a summary at warning level
    pub fn log(&self) {
        if self.unparsable_modifications > 0 {
            log::warn!(
                "Could not parse {} modification(s)",
                self.unparsable_modifications
            );
        }
        for token in &self.offending_tokens {
            log::warn!("\t{token}");
        }
        let accessions = self.unparsed_accession_count();
        if accessions > 0 {
            log::warn!("Unable to parse the protein accession for {accessions} peptide(s)");
            for (accession, count) in &self.unparsed_accessions {
                log::debug!("\t{accession} -> {count} times");
            }
        }
        if self.dropped_rows > 0 {
            log::warn!("Removed {} row(s)", self.dropped_rows);
        }
        for failure in &self.failures {
            log::warn!("{failure}");
        }
    }
}
