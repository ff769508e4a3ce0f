//! The [`NormalizeErrorKind`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::ErrorKind;
use serde::{Deserialize, Serialize};

/// All things that can go wrong while normalising a report. The kind also determines if the
/// problem is fatal (see [`ErrorKind::is_error`]) or just a warning.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NormalizeErrorKind {
    /// No search engine profile matched all rows of the report
    UnrecognizedFormat,
    /// The report does not contain a usable table
    #[default]
    MalformedReport,
    /// A modification names a residue that is not present at that position
    SequenceMismatch,
    /// A modification is not present in the modification table
    UnknownModification,
    /// A modification token could not be read, the token is skipped
    UnparsableModificationToken,
    /// A peptide contains a character that is not a known amino acid
    UnknownResidue,
    /// A formula contains an element (or isotope) without mass data
    UnknownElement,
    /// The protein accession could not be split into its parts, the raw value is used instead
    UnparsableAccession,
    /// A cell could not be converted into the needed type, the value is left empty
    InvalidCell,
    /// The given options or modification table are invalid
    InvalidConfiguration,
}

impl NormalizeErrorKind {
    /// Check if this kind only ever signals a recoverable problem
    pub const fn is_warning(self) -> bool {
        matches!(
            self,
            Self::UnparsableModificationToken | Self::UnparsableAccession | Self::InvalidCell
        )
    }
}

impl std::fmt::Display for NormalizeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::UnrecognizedFormat => "unrecognized format",
                Self::MalformedReport => "malformed report",
                Self::SequenceMismatch => "sequence mismatch",
                Self::UnknownModification => "unknown modification",
                Self::UnparsableModificationToken => "unparsable modification",
                Self::UnknownResidue => "unknown residue",
                Self::UnknownElement => "unknown element",
                Self::UnparsableAccession => "unparsable accession",
                Self::InvalidCell => "invalid cell",
                Self::InvalidConfiguration => "invalid configuration",
            }
        )
    }
}

impl ErrorKind for NormalizeErrorKind {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        if self.is_warning() { "warning" } else { "error" }
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        !self.is_warning()
    }
}
