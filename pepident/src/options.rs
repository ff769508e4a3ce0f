use std::sync::LazyLock;

use context_error::*;
use pepcore::{
    NormalizeError,
    chemistry::MassMode,
    error::NormalizeErrorKind,
    sequence::{AminoAcid, Marker},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::accession::BadAccessionPolicy;

static FIXED_MODIFICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]):(.+)$").unwrap());

/// How many scans to keep per peptide when reading MaxQuant files
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum GroupMethod {
    /// Keep all scans
    AllScans,
    /// Keep the best scoring scan per sequence and file
    #[default]
    BestPerSequenceAndFile,
    /// Keep the best scoring scan per sequence, file, and charge state
    BestPerSequenceFileAndCharge,
}

/// All settings for normalisation, missing fields in JSON get their default value
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Calculate the molecular formula (and mass) of all peptides, this needs all modifications
    /// to be present in the modification table
    pub calc_formula: bool,
    /// The mass to report
    pub mass_mode: MassMode,
    /// The number of decimals used when rendering modification masses
    pub precision: usize,
    /// The modification that is shown as `<residue>*`
    pub marker: Option<Marker>,
    /// What to do with unparsable protein accessions
    pub bad_accession_policy: BadAccessionPolicy,
    /// The extension given to the precursor file names
    pub file_extension: String,
    /// Abort if not all modifications are present in the modification table
    pub require_known_modifications: bool,
    /// Keep all unparsable modification tokens in the diagnostics
    pub keep_offending_tokens: bool,
    /// The fixed modifications for MaxQuant files, comma separated `<residue>:<name>`
    pub fixed_modifications: String,
    /// How many scans to keep per peptide for MaxQuant files
    pub group_method: GroupMethod,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            calc_formula: false,
            mass_mode: MassMode::Monoisotopic,
            precision: 2,
            marker: Some(Marker::default()),
            bad_accession_policy: BadAccessionPolicy::Drop,
            file_extension: "mzML".to_string(),
            require_known_modifications: false,
            keep_offending_tokens: false,
            fixed_modifications: "C:carbamidomethyl".to_string(),
            group_method: GroupMethod::BestPerSequenceAndFile,
        }
    }
}

impl NormalizeOptions {
    /// Read options from JSON, all fields are optional
    /// # Errors
    /// If the text is not valid JSON or contains invalid values.
    pub fn from_json(text: &str) -> Result<Self, NormalizeError> {
        serde_json::from_str(text).map_err(|err| {
            BoxedError::new(
                NormalizeErrorKind::InvalidConfiguration,
                "Invalid options",
                err.to_string(),
                Context::none(),
            )
        })
    }

    /// Parse the fixed modifications into (residue, lowercase name) pairs, duplicates are removed
    /// # Errors
    /// If any modification is not `<residue>:<name>`.
    pub fn parsed_fixed_modifications(&self) -> Result<Vec<(AminoAcid, String)>, NormalizeError> {
        let mut output: Vec<(AminoAcid, String)> = Vec::new();
        let text = self.fixed_modifications.as_str();
        let mut offset = 0;
        for part in text.split(',') {
            let trimmed = part.trim();
            let start = offset + part.len() - part.trim_start().len();
            offset += part.len() + 1;
            if trimmed.is_empty() {
                continue;
            }
            let error = || {
                BoxedError::new(
                    NormalizeErrorKind::InvalidConfiguration,
                    "Invalid fixed modification",
                    "A fixed modification should be written as '<residue>:<name>', eg 'C:carbamidomethyl'",
                    Context::line(None, text, start, trimmed.len()).to_owned(),
                )
            };
            let captures = FIXED_MODIFICATION.captures(trimmed).ok_or_else(error)?;
            let residue = AminoAcid::try_from(captures[1].as_bytes()[0]).map_err(|()| error())?;
            let modification = (residue, captures[2].trim().to_lowercase());
            if !output.contains(&modification) {
                output.push(modification);
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::FullErrorContent;
    use pepcore::{chemistry::MassMode, error::NormalizeErrorKind, sequence::AminoAcid};

    use super::{GroupMethod, NormalizeOptions};
    use crate::accession::BadAccessionPolicy;

    #[test]
    fn defaults() {
        let options = NormalizeOptions::default();
        assert!(!options.calc_formula);
        assert_eq!(options.precision, 2);
        assert_eq!(options.file_extension, "mzML");
        assert_eq!(options.bad_accession_policy, BadAccessionPolicy::Drop);
        assert_eq!(options.group_method, GroupMethod::BestPerSequenceAndFile);
        assert_eq!(
            options.marker.map(|m| (m.residue, m.mass)),
            Some((AminoAcid::Arginine, 0.98))
        );
        assert_eq!(NormalizeOptions::from_json("{}").unwrap(), options);
    }

    #[test]
    fn json() {
        let options = NormalizeOptions::from_json(
            r#"{"calc_formula": true, "mass_mode": "Average", "marker": null, "bad_accession_policy": "Keep", "file_extension": "ms2"}"#,
        )
        .unwrap();
        assert!(options.calc_formula);
        assert_eq!(options.mass_mode, MassMode::Average);
        assert_eq!(options.marker, None);
        assert_eq!(options.bad_accession_policy, BadAccessionPolicy::Keep);
        assert_eq!(options.file_extension, "ms2");
        assert_eq!(options.precision, 2);
        assert_eq!(
            NormalizeOptions::from_json(r#"{"precision": "two"}"#)
                .unwrap_err()
                .get_kind(),
            NormalizeErrorKind::InvalidConfiguration
        );
    }

    #[test]
    fn fixed_modifications() {
        let options = NormalizeOptions {
            fixed_modifications: "C:carbamidomethyl, M:Oxidation ,C:Carbamidomethyl,".to_string(),
            ..NormalizeOptions::default()
        };
        assert_eq!(
            options.parsed_fixed_modifications().unwrap(),
            vec![
                (AminoAcid::Cysteine, "carbamidomethyl".to_string()),
                (AminoAcid::Methionine, "oxidation".to_string())
            ]
        );
        for invalid in ["carbamidomethyl", "c:carbamidomethyl", "B:something", "C:"] {
            let options = NormalizeOptions {
                fixed_modifications: invalid.to_string(),
                ..NormalizeOptions::default()
            };
            assert_eq!(
                options.parsed_fixed_modifications().unwrap_err().get_kind(),
                NormalizeErrorKind::InvalidConfiguration,
                "{invalid}"
            );
        }
        let options = NormalizeOptions {
            fixed_modifications: String::new(),
            ..NormalizeOptions::default()
        };
        assert!(options.parsed_fixed_modifications().unwrap().is_empty());
    }
}
