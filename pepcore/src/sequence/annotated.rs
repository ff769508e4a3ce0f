use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    NormalizeError,
    chemistry::MolecularFormula,
    error::NormalizeErrorKind,
    sequence::{AminoAcid, ModificationSite},
};

/// One slot of an [`AnnotatedSequence`], a synthetic terminus or an amino acid
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Residue {
    /// The synthetic N-terminal slot
    NTerm,
    /// An amino acid
    AminoAcid(AminoAcid),
    /// The synthetic C-terminal slot
    CTerm,
}

/// A residue with the sum of all mass modifications placed on it
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct AnnotatedResidue {
    /// The residue or terminus
    pub residue: Residue,
    /// The total mass delta of all modifications on this residue
    pub mass_delta: f64,
}

/// The residue and mass that are shortened to `<residue>*` when rendering a sequence
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Marker {
    /// The residue
    pub residue: AminoAcid,
    /// The mass delta, compared after formatting it at the rendering precision
    pub mass: f64,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            residue: AminoAcid::Arginine,
            mass: 0.98,
        }
    }
}

/// A peptide with per residue mass deltas. Index 0 is the N-terminus, index `len + 1` the
/// C-terminus, so residue positions (1-based) directly index into the sequence. The length is
/// fixed at creation, only the mass deltas can be changed.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AnnotatedSequence {
    elements: Vec<AnnotatedResidue>,
}

impl AnnotatedSequence {
    /// Read a plain peptide sequence (case insensitive), surrounding whitespace is ignored.
    /// # Errors
    /// If any character is not a known amino acid.
    pub fn from_peptide(peptide: &str) -> Result<Self, NormalizeError> {
        let trimmed = peptide.trim();
        let offset = peptide.len() - peptide.trim_start().len();
        let mut elements = Vec::with_capacity(trimmed.len() + 2);
        elements.push(AnnotatedResidue {
            residue: Residue::NTerm,
            mass_delta: 0.0,
        });
        for (index, c) in trimmed.char_indices() {
            let aa = AminoAcid::try_from(c).map_err(|()| {
                BoxedError::new(
                    NormalizeErrorKind::UnknownResidue,
                    "Unknown amino acid",
                    format!("The character '{c}' is not a known amino acid"),
                    Context::line(None, peptide, offset + index, c.len_utf8()).to_owned(),
                )
            })?;
            elements.push(AnnotatedResidue {
                residue: Residue::AminoAcid(aa),
                mass_delta: 0.0,
            });
        }
        elements.push(AnnotatedResidue {
            residue: Residue::CTerm,
            mass_delta: 0.0,
        });
        Ok(Self { elements })
    }

    /// The number of amino acids (not counting the termini)
    pub fn len(&self) -> usize {
        self.elements.len() - 2
    }

    /// Check if there are no amino acids
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the slot at the given index, 0 is the N-terminus
    pub fn get(&self, index: usize) -> Option<&AnnotatedResidue> {
        self.elements.get(index)
    }

    /// All slots including both termini
    pub fn elements(&self) -> &[AnnotatedResidue] {
        &self.elements
    }

    /// The residue (or terminus) at the given index
    pub fn residue(&self, index: usize) -> Option<Residue> {
        self.elements.get(index).map(|e| e.residue)
    }

    /// The amino acid at the given 1-based position
    pub fn amino_acid(&self, position: usize) -> Option<AminoAcid> {
        match self.elements.get(position)?.residue {
            Residue::AminoAcid(aa) => Some(aa),
            Residue::NTerm | Residue::CTerm => None,
        }
    }

    /// All amino acids in order
    pub fn amino_acids(&self) -> impl Iterator<Item = AminoAcid> + '_ {
        self.elements.iter().filter_map(|e| match e.residue {
            Residue::AminoAcid(aa) => Some(aa),
            Residue::NTerm | Residue::CTerm => None,
        })
    }

    /// The mass deltas of all slots including both termini
    pub fn mass_deltas(&self) -> impl Iterator<Item = f64> + '_ {
        self.elements.iter().map(|e| e.mass_delta)
    }

    /// The plain uppercase peptide
    pub fn as_peptide(&self) -> String {
        self.amino_acids().map(AminoAcid::one_letter_code).collect()
    }

    /// The index of the slot a modification on the given site has to be placed at. Returns
    /// `None` if the site names an amino acid that is not present at that position.
    pub fn site_index(&self, site: ModificationSite) -> Option<usize> {
        match site {
            ModificationSite::NTerm => Some(0),
            ModificationSite::CTerm => Some(self.elements.len() - 1),
            ModificationSite::AminoAcid(aa, position) => {
                (self.amino_acid(position)? == aa).then_some(position)
            }
        }
    }

    /// Add a mass delta to the slot at the given index, an out of range index is ignored
    pub fn add_mass_delta(&mut self, index: usize, delta: f64) {
        if let Some(element) = self.elements.get_mut(index) {
            element.mass_delta += delta;
        }
    }

    /// The base formula of this peptide, see [`MolecularFormula::from_residues`]
    pub fn formula(&self, n_term: bool, c_term: bool) -> MolecularFormula {
        MolecularFormula::from_residues(&self.amino_acids().collect::<Vec<_>>(), n_term, c_term)
            .with_sequence(self.as_peptide())
    }

    /// Write all amino acids followed by their mass delta in parentheses with the given number
    /// of decimals, if the delta is not zero. Deltas on the termini are not shown.
    pub fn render(&self, precision: usize) -> String {
        let mut output = String::with_capacity(self.len());
        for element in &self.elements {
            if let Residue::AminoAcid(aa) = element.residue {
                output.push(aa.one_letter_code());
                if element.mass_delta != 0.0 {
                    output.push_str(&format!("({:+.precision$})", element.mass_delta));
                }
            }
        }
        output
    }

    /// Render (see [`Self::render`]) and replace the marker residue with marker mass by `<residue>*`.
    pub fn render_with_marker(&self, precision: usize, marker: Option<&Marker>) -> String {
        let rendered = self.render(precision);
        if let Some(marker) = marker {
            rendered.replace(
                &format!("{}({:+.precision$})", marker.residue, marker.mass),
                &format!("{}*", marker.residue),
            )
        } else {
            rendered
        }
    }
}

impl std::fmt::Display for AnnotatedSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(2))
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::FullErrorContent;

    use crate::{
        error::NormalizeErrorKind,
        molecular_formula,
        sequence::{AminoAcid, AnnotatedSequence, Marker, ModificationSite, Residue},
    };

    #[test]
    fn unmodified_renders_identically() {
        for peptide in ["PEPTIDE", "ACDEFGHIKLMNPQRSTUVWY", "K", "MMM"] {
            let sequence = AnnotatedSequence::from_peptide(peptide).unwrap();
            assert_eq!(sequence.render(2), peptide);
            assert_eq!(sequence.render_with_marker(4, Some(&Marker::default())), peptide);
            assert_eq!(sequence.len(), peptide.len());
            assert!(sequence.mass_deltas().all(|d| d == 0.0));
            assert_eq!(sequence.mass_deltas().count(), peptide.len() + 2);
        }
    }

    #[test]
    fn lowercase_and_unknown() {
        let sequence = AnnotatedSequence::from_peptide("pepTide").unwrap();
        assert_eq!(sequence.as_peptide(), "PEPTIDE");
        let error = AnnotatedSequence::from_peptide("PEP1DE").unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::UnknownResidue);
        assert!(AnnotatedSequence::from_peptide("").unwrap().is_empty());
    }

    #[test]
    fn site_indices() {
        let sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        assert_eq!(sequence.residue(0), Some(Residue::NTerm));
        assert_eq!(sequence.residue(8), Some(Residue::CTerm));
        assert_eq!(sequence.residue(9), None);
        assert_eq!(sequence.site_index(ModificationSite::NTerm), Some(0));
        assert_eq!(sequence.site_index(ModificationSite::CTerm), Some(8));
        assert_eq!(
            sequence.site_index(ModificationSite::AminoAcid(AminoAcid::Threonine, 4)),
            Some(4)
        );
        assert_eq!(
            sequence.site_index(ModificationSite::AminoAcid(AminoAcid::Lysine, 5)),
            None
        );
        assert_eq!(
            sequence.site_index(ModificationSite::AminoAcid(AminoAcid::Proline, 0)),
            None
        );
        assert_eq!(
            sequence.site_index(ModificationSite::AminoAcid(AminoAcid::Proline, 9)),
            None
        );
    }

    #[test]
    fn render_deltas() {
        let mut sequence = AnnotatedSequence::from_peptide("ACDRK").unwrap();
        sequence.add_mass_delta(0, 42.01);
        sequence.add_mass_delta(2, 57.021);
        sequence.add_mass_delta(4, 0.984);
        sequence.add_mass_delta(5, -1.5);
        sequence.add_mass_delta(6, 3.0);
        assert_eq!(sequence.render(2), "AC(+57.02)DR(+0.98)K(-1.50)");
        assert_eq!(sequence.render(1), "AC(+57.0)DR(+1.0)K(-1.5)");
        assert_eq!(
            sequence.render_with_marker(2, Some(&Marker::default())),
            "AC(+57.02)DR*K(-1.50)"
        );
        assert_eq!(
            sequence.render_with_marker(2, None),
            "AC(+57.02)DR(+0.98)K(-1.50)"
        );
    }

    #[test]
    fn formula() {
        let sequence = AnnotatedSequence::from_peptide("G").unwrap();
        assert_eq!(sequence.formula(true, true), molecular_formula!(C 2 H 5 N 1 O 2));
        assert_eq!(sequence.formula(true, true).sequence(), "G");
    }
}
