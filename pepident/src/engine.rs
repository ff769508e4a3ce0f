use std::sync::LazyLock;

use context_error::*;
use pepcore::{NormalizeError, error::NormalizeErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::{ReportTable, TableRow};

/// The column with the spectrum title
pub const SPECTRUM_NAME: &str = "spectrum_name";
/// The column with the MS/MS sample
pub const MS_MS_SAMPLE_NAME: &str = "ms/ms_sample_name";

static PROTEOME_DISCOVERER_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",scan_([0-9]+),type").unwrap());
static PROTEOME_DISCOVERER_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Experiment [\w\-: ]+ from ([\w\- ]+)").unwrap());
static MAXQUANT_SCAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+-\d+_(\d+)$").unwrap());
static MAXQUANT_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\w \+\-]+:\s*)?([\w\+\- ]+)$").unwrap());
static MASCOT_1_SCAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Scan (\w+)").unwrap());
static MASCOT_1_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Scan \w+.*\\([A-Za-z0-9_\-\+ ]+\.\w+)").unwrap());
static MASCOT_2_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+-\d+-\d+_(\d+)$").unwrap());
static MASCOT_2_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-\d+-\d+_\d+$").unwrap());

/// The search engines that can be behind a spectrum report, each leaves the scan number and
/// source file in different places in the report.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SearchEngineProfile {
    /// Proteome Discoverer
    ProteomeDiscoverer,
    /// MaxQuant
    MaxQuant,
    /// Mascot with the scan and file path in the spectrum name
    MascotFormat1,
    /// Mascot with a `<file>-<n>-<n>_<scan>` spectrum name
    MascotFormat2,
}

impl SearchEngineProfile {
    /// All profiles, in the order they are tried by [`Self::detect`]
    pub const ALL: [Self; 4] = [
        Self::ProteomeDiscoverer,
        Self::MaxQuant,
        Self::MascotFormat1,
        Self::MascotFormat2,
    ];

    /// The column containing the scan number
    pub const fn scan_column(self) -> &'static str {
        SPECTRUM_NAME
    }

    /// The pattern to extract the scan number, from the first capture group
    pub fn scan_regex(self) -> &'static Regex {
        match self {
            Self::ProteomeDiscoverer => &PROTEOME_DISCOVERER_SCAN,
            Self::MaxQuant => &MAXQUANT_SCAN,
            Self::MascotFormat1 => &MASCOT_1_SCAN,
            Self::MascotFormat2 => &MASCOT_2_SCAN,
        }
    }

    /// The column containing the source file name
    pub const fn source_column(self) -> &'static str {
        match self {
            Self::ProteomeDiscoverer | Self::MaxQuant => MS_MS_SAMPLE_NAME,
            Self::MascotFormat1 | Self::MascotFormat2 => SPECTRUM_NAME,
        }
    }

    /// The pattern to extract the source file name, from the first capture group
    pub fn source_regex(self) -> &'static Regex {
        match self {
            Self::ProteomeDiscoverer => &PROTEOME_DISCOVERER_SOURCE,
            Self::MaxQuant => &MAXQUANT_SOURCE,
            Self::MascotFormat1 => &MASCOT_1_SOURCE,
            Self::MascotFormat2 => &MASCOT_2_SOURCE,
        }
    }

    /// Get the scan number of a row
    /// # Errors
    /// If the column is missing or the pattern does not match.
    pub fn scan_number(self, row: &TableRow) -> Result<String, NormalizeError> {
        self.extract(row, self.scan_column(), self.scan_regex(), "scan number")
    }

    /// Get the source file name of a row
    /// # Errors
    /// If the column is missing or the pattern does not match.
    pub fn source_file(self, row: &TableRow) -> Result<String, NormalizeError> {
        self.extract(
            row,
            self.source_column(),
            self.source_regex(),
            "source file",
        )
    }

    fn extract(
        self,
        row: &TableRow,
        column: &'static str,
        regex: &Regex,
        what: &str,
    ) -> Result<String, NormalizeError> {
        let cell = row.cell(column).ok_or_else(|| {
            BoxedError::new(
                NormalizeErrorKind::UnrecognizedFormat,
                format!("Not a {self} report"),
                format!("The column '{column}' is missing"),
                row.full_context().to_owned(),
            )
        })?;
        regex
            .captures(cell.as_str())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                BoxedError::new(
                    NormalizeErrorKind::UnrecognizedFormat,
                    format!("Not a {self} report"),
                    format!("The {what} could not be found with the pattern '{regex}'"),
                    cell.context(),
                )
            })
    }

    /// Check that all rows of the table can be read with this profile
    /// # Errors
    /// The first problem, if any row could not be read.
    pub fn check(self, table: &ReportTable) -> Result<(), NormalizeError> {
        for column in [self.scan_column(), self.source_column()] {
            if !table.has_column(column) {
                return Err(BoxedError::new(
                    NormalizeErrorKind::UnrecognizedFormat,
                    format!("Not a {self} report"),
                    format!("The column '{column}' is missing"),
                    Context::none(),
                ));
            }
        }
        for row in table.rows() {
            self.scan_number(row)?;
            self.source_file(row)?;
        }
        Ok(())
    }

    /// Find the first profile (in the order of [`Self::ALL`]) that can read all rows of the table
    /// # Errors
    /// If no profile fits, the underlying errors specify for each profile why it was rejected.
    pub fn detect(table: &ReportTable) -> Result<Self, NormalizeError> {
        let mut errors = Vec::new();
        for profile in Self::ALL {
            match profile.check(table) {
                Ok(()) => {
                    log::debug!("Detected search engine {profile}");
                    return Ok(profile);
                }
                Err(err) => {
                    log::debug!("Rejected search engine {profile}: {}", err.get_long_description());
                    errors.push(err);
                }
            }
        }
        Err(BoxedError::new(
            NormalizeErrorKind::UnrecognizedFormat,
            "Unrecognised search engine",
            "None of the known search engines fit all rows of this report",
            Context::none(),
        )
        .add_underlying_errors(errors))
    }
}

impl std::fmt::Display for SearchEngineProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::ProteomeDiscoverer => "Proteome Discoverer",
                Self::MaxQuant => "MaxQuant",
                Self::MascotFormat1 => "Mascot format 1",
                Self::MascotFormat2 => "Mascot format 2",
            }
        )
    }
}
