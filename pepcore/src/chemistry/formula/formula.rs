use std::num::NonZeroU16;

use context_error::*;

use crate::{
    NormalizeError,
    chemistry::{Element, MassMode, MolecularFormula},
    error::NormalizeErrorKind,
    sequence::AminoAcid,
};

/// The order in which the elements are written, any element not in this list is written after these in first seen order
const CANONICAL_ORDER: &[(Element, Option<u16>)] = &[
    (Element::C, None),
    (Element::C, Some(13)),
    (Element::H, None),
    (Element::H, Some(2)),
    (Element::Br, None),
    (Element::Cl, None),
    (Element::N, None),
    (Element::N, Some(15)),
    (Element::O, None),
    (Element::O, Some(18)),
    (Element::P, None),
    (Element::S, None),
    (Element::Se, None),
];

impl MolecularFormula {
    /// The formula of the N-terminal group (H)
    pub fn n_terminus() -> Self {
        molecular_formula!(H 1)
    }

    /// The formula of the C-terminal group (OH)
    pub fn c_terminus() -> Self {
        molecular_formula!(H 1 O 1)
    }

    /// The base formula of a peptide, the sum of all residues plus the selected terminal groups.
    /// The terminal groups are never added for an empty sequence.
    /// # Errors
    /// If the sequence contains a character that is not a known amino acid.
    pub fn from_sequence(
        sequence: &str,
        n_term: bool,
        c_term: bool,
    ) -> Result<Self, NormalizeError> {
        let residues = sequence
            .char_indices()
            .map(|(index, c)| {
                AminoAcid::try_from(c).map_err(|()| {
                    BoxedError::new(
                        NormalizeErrorKind::UnknownResidue,
                        "Unknown amino acid",
                        format!("The character '{c}' is not a known amino acid"),
                        Context::line(None, sequence, index, c.len_utf8()).to_owned(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_residues(&residues, n_term, c_term)
            .with_sequence(sequence.to_ascii_uppercase()))
    }

    /// The base formula for the given residues plus the selected terminal groups.
    /// The terminal groups are never added for an empty set of residues.
    pub fn from_residues(residues: &[AminoAcid], n_term: bool, c_term: bool) -> Self {
        let mut formula: Self = residues.iter().map(|aa| aa.formula()).sum();
        if !residues.is_empty() {
            if n_term {
                formula += Self::n_terminus();
            }
            if c_term {
                formula += Self::c_terminus();
            }
        }
        formula
    }

    /// The mass of the molecular formula in the given mode
    /// # Errors
    /// If any species in this formula has no mass data.
    pub fn mass(&self, mode: MassMode) -> Result<f64, NormalizeError> {
        self.elements()
            .map(|(e, i, n)| {
                match mode {
                    MassMode::Monoisotopic => e.mass(*i),
                    MassMode::Average => e.average_weight(*i),
                }
                .map(|m| m * f64::from(*n))
                .ok_or_else(|| {
                    BoxedError::new(
                        NormalizeErrorKind::UnknownElement,
                        "Unknown element",
                        format!(
                            "There is no {mode} mass known for '{}'",
                            e.species_symbol(*i)
                        ),
                        Context::show(self.to_string()),
                    )
                })
            })
            .sum()
    }

    /// The monoisotopic mass of the molecular formula
    /// # Errors
    /// If any species in this formula has no mass data.
    pub fn monoisotopic_mass(&self) -> Result<f64, NormalizeError> {
        self.mass(MassMode::Monoisotopic)
    }

    /// The average weight of the molecular formula
    /// # Errors
    /// If any species in this formula has no mass data.
    pub fn average_weight(&self) -> Result<f64, NormalizeError> {
        self.mass(MassMode::Average)
    }

    /// Write the formula in the fixed element order (C, H, D, Br, Cl, N, O, P, S, Se with the
    /// isotopes following their element). A count of one is written as just the symbol, any
    /// other count follows the symbol including its sign, zero counts are left out.
    pub fn notation(&self) -> String {
        let mut buffer = String::new();
        let mut write = |element: Element, isotope: Option<NonZeroU16>, count: i32| {
            if count != 0 {
                buffer.push_str(&element.species_symbol(isotope));
            }
            if count != 0 && count != 1 {
                buffer.push_str(&count.to_string());
            }
        };
        for (element, isotope) in CANONICAL_ORDER {
            let isotope = isotope.and_then(NonZeroU16::new);
            write(*element, isotope, self.count(*element, isotope));
        }
        for (element, isotope, count) in self.elements() {
            if !CANONICAL_ORDER
                .iter()
                .any(|(e, i)| e == element && i.and_then(NonZeroU16::new) == *isotope)
            {
                write(*element, *isotope, *count);
            }
        }
        buffer
    }
}

impl std::fmt::Display for MolecularFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.notation())
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::{
        chemistry::{MassMode, MolecularFormula},
        error::NormalizeErrorKind,
    };
    use context_error::FullErrorContent;

    #[test]
    fn notation() {
        assert_eq!(molecular_formula!(C 1 H 0 N -1).notation(), "CN-1");
        assert_eq!(molecular_formula!(O 1 H 2).notation(), "H2O");
        assert_eq!(
            molecular_formula!(N 1 O 1 H 3 C 2).notation(),
            "C2H3NO"
        );
        assert_eq!(
            molecular_formula!(H -1 O 1 N -1).to_string(),
            "H-1N-1O"
        );
        assert_eq!(
            molecular_formula!([2 H 3] C 2 [13 C 1] [15 N 1] Se 1).notation(),
            "C2(13)CD3(15)NSe"
        );
        assert_eq!(MolecularFormula::default().notation(), "");
    }

    #[test]
    fn notation_appends_unordered_elements() {
        assert_eq!(
            molecular_formula!(Fe 2 C 1 Na 1 K -1).notation(),
            "CFe2NaK-1"
        );
    }

    #[test]
    fn sequence() {
        let formula = MolecularFormula::from_sequence("ACDEK", true, true).unwrap();
        assert_eq!(formula, molecular_formula!(C 21 H 36 N 6 O 10 S 1));
        assert_eq!(formula.sequence(), "ACDEK");
        assert_eq!(
            MolecularFormula::from_sequence("G", false, false).unwrap(),
            molecular_formula!(C 2 H 3 O 1 N 1)
        );
        assert_eq!(
            MolecularFormula::from_sequence("G", true, false).unwrap(),
            molecular_formula!(C 2 H 4 O 1 N 1)
        );
        assert!(
            MolecularFormula::from_sequence("", true, true)
                .unwrap()
                .is_empty()
        );
        let error = MolecularFormula::from_sequence("PEPB", true, true).unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::UnknownResidue);
    }

    #[test]
    fn masses() {
        let water = molecular_formula!(H 2 O 1);
        assert!((water.monoisotopic_mass().unwrap() - 18.01057).abs() < 1e-9);
        assert!((water.average_weight().unwrap() - 18.015).abs() < 1e-9);
        let glycine = MolecularFormula::from_sequence("G", true, true).unwrap();
        assert!((glycine.mass(MassMode::Monoisotopic).unwrap() - 75.03204).abs() < 1e-9);
        assert_eq!(
            molecular_formula!(C 1 Fe 1)
                .mass(MassMode::Average)
                .unwrap_err()
                .get_kind(),
            NormalizeErrorKind::UnknownElement
        );
        assert_eq!(MolecularFormula::default().monoisotopic_mass().unwrap(), 0.0);
    }
}
