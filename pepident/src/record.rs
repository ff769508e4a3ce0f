use pepcore::chemistry::MolecularFormula;
use serde::{Deserialize, Serialize};

/// A single normalised peptide identification
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AnnotatedPeptideRecord {
    /// The sample (experiment) this identification belongs to
    pub sample_name: String,
    /// The file containing the spectrum, with the configured extension
    pub precursor_file: String,
    /// The protein accession
    pub parent_id: Option<String>,
    /// The protein entry name
    pub parent_protein: Option<String>,
    /// The protein description
    pub parent_description: Option<String>,
    /// The annotated sequence, eg `AC(+57.02)DR*K`
    pub sequence: String,
    /// The molecular formula of the full (modified) peptide, if calculated
    pub formula: Option<MolecularFormula>,
    /// The mass of the full peptide, if the formula is calculated
    pub mass: Option<f64>,
    /// The scan number
    pub scan_number: String,
    /// If the peptide is unique to this protein
    pub unique: Option<bool>,
    /// The precursor m/z
    pub precursor_mz: Option<f64>,
    /// The precursor charge
    pub charge: Option<i32>,
    /// The score of the identification
    pub score: Option<f64>,
    /// The index of the line this record was read from (0 based)
    pub line_index: usize,
}

impl AnnotatedPeptideRecord {
    /// The full sequence, this is the same as the annotated sequence
    pub fn full_sequence(&self) -> &str {
        &self.sequence
    }
}
