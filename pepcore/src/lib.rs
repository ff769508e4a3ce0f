#![doc = include_str!("../README.md")]

#[macro_use]
mod helper_functions;

/// Contains all things related to the underlying chemistry.
pub mod chemistry;
/// The error kinds shared by all normalisation steps
pub mod error;
/// The reference data for modifications
pub mod ontology;
/// Contains all things related to sequences, amongst others amino acids and modification annotations.
pub mod sequence;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::chemistry::{Element, MassMode, MolecularFormula};
    pub use crate::error::NormalizeErrorKind;
    pub use crate::molecular_formula;
    pub use crate::ontology::ModificationTable;
    pub use crate::sequence::{
        AminoAcid, AnnotatedResidue, AnnotatedSequence, Marker, ModificationCheck,
        ModificationParser, ModificationSite, ModificationTarget, ModificationToken, Residue,
    };
}

/// The error type used throughout the crate
pub type NormalizeError = context_error::BoxedError<'static, error::NormalizeErrorKind>;

/// The result of a parser, contains the result and a list of warnings if it succeeded and only the error if it failed.
pub type ParserResult<T> = Result<(T, Vec<NormalizeError>), NormalizeError>;
