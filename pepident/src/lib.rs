#![doc = include_str!("../README.md")]

/// Protein accession and description extraction
pub mod accession;
/// The collected problems of a normalisation run
pub mod diagnostics;
/// Detection of the search engine that produced a spectrum report
pub mod engine;
pub mod maxquant;
/// Normalisation of Scaffold spectrum reports
pub mod normalize;
/// The settings for normalisation
pub mod options;
pub mod output;
/// The normalised peptide record
pub mod record;
/// Extraction of the table from a Scaffold spectrum report
pub mod report;
/// A tab separated table with context for every cell
pub mod table;

pub use accession::{AccessionResolver, BadAccessionPolicy, ProteinAccession};
pub use diagnostics::{DiagnosticSummary, RowFailure};
pub use engine::SearchEngineProfile;
pub use maxquant::normalize_maxquant_table;
pub use normalize::{NormalizedReport, normalize_scaffold_report};
pub use options::{GroupMethod, NormalizeOptions};
pub use record::AnnotatedPeptideRecord;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::{
        AnnotatedPeptideRecord, BadAccessionPolicy, DiagnosticSummary, GroupMethod,
        NormalizeOptions, NormalizedReport, SearchEngineProfile, normalize_maxquant_table,
        normalize_scaffold_report,
    };
}
