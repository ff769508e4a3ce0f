use std::sync::LazyLock;

use context_error::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    NormalizeError, ParserResult,
    chemistry::MolecularFormula,
    error::NormalizeErrorKind,
    helper_functions::split_with_offsets,
    ontology::ModificationTable,
    sequence::{AminoAcid, AnnotatedSequence},
};

/// The grammar of a single token: `site: name [(TYPE)] (signed-mass)`
static MODIFICATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([nNcC]-[tT][eE][rR][mM]|[a-zA-Z])(\d*): ([\w\-> ]+)(?: \([A-Z]+\))? \(([\-+]?\d+\.?\d*)\)$",
    )
    .unwrap()
});

/// Where a modification is placed
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ModificationSite {
    /// On the N-terminus
    NTerm,
    /// On the C-terminus
    CTerm,
    /// On the given amino acid at the given 1-based position
    AminoAcid(AminoAcid, usize),
}

impl ModificationSite {
    /// The target of the site, so the site disregarding the position
    pub const fn target(self) -> ModificationTarget {
        match self {
            Self::NTerm => ModificationTarget::NTerm,
            Self::CTerm => ModificationTarget::CTerm,
            Self::AminoAcid(aa, _) => ModificationTarget::AminoAcid(aa),
        }
    }
}

impl std::fmt::Display for ModificationSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "n-term"),
            Self::CTerm => write!(f, "c-term"),
            Self::AminoAcid(aa, position) => write!(f, "{aa}{position}"),
        }
    }
}

/// The residue or terminus a modification can be placed on
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ModificationTarget {
    /// The N-terminus
    NTerm,
    /// The C-terminus
    CTerm,
    /// The given amino acid
    AminoAcid(AminoAcid),
}

impl std::fmt::Display for ModificationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "N-TERM"),
            Self::CTerm => write!(f, "C-TERM"),
            Self::AminoAcid(aa) => write!(f, "{aa}"),
        }
    }
}

impl std::str::FromStr for ModificationTarget {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("n-term") {
            Ok(Self::NTerm)
        } else if s.eq_ignore_ascii_case("c-term") {
            Ok(Self::CTerm)
        } else {
            s.parse::<AminoAcid>().map(Self::AminoAcid)
        }
    }
}

/// A single parsed modification, eg `M5: Oxidation (+15.99)`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModificationToken {
    /// The location
    pub site: ModificationSite,
    /// The name as written
    pub name: String,
    /// The mass delta as written
    pub mass_delta: f64,
}

impl ModificationToken {
    /// Parse a single (trimmed) token. Returns `None` if the token does not follow the grammar or
    /// if an amino acid site does not give a position.
    pub fn parse(text: &str) -> Option<Self> {
        let captures = MODIFICATION_TOKEN.captures(text)?;
        let site_text = captures.get(1)?.as_str();
        let position = captures.get(2)?.as_str();
        let site = if site_text.eq_ignore_ascii_case("n-term") {
            ModificationSite::NTerm
        } else if site_text.eq_ignore_ascii_case("c-term") {
            ModificationSite::CTerm
        } else if position.is_empty() {
            return None;
        } else {
            ModificationSite::AminoAcid(site_text.parse().ok()?, position.parse().ok()?)
        };
        Some(Self {
            site,
            name: captures.get(3)?.as_str().trim().to_string(),
            mass_delta: captures.get(4)?.as_str().parse().ok()?,
        })
    }

    /// All parts of a comma separated description that are not valid tokens
    pub fn unparsable_parts(description: &str) -> Vec<&str> {
        split_with_offsets(description, ',')
            .into_iter()
            .filter_map(|(_, text)| Self::parse(text).is_none().then_some(text))
            .collect()
    }
}

impl std::str::FromStr for ModificationToken {
    type Err = NormalizeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| unparsable_token(s, 0, s.len()))
    }
}

impl std::fmt::Display for ModificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({:+})", self.site, self.name, self.mass_delta)
    }
}

fn unparsable_token(line: &str, offset: usize, length: usize) -> NormalizeError {
    BoxedError::new(
        NormalizeErrorKind::UnparsableModificationToken,
        "Unparsable modification",
        "A modification should be written as 'site: name (mass)', where the site is 'n-term', 'c-term', or a residue followed by its position. This modification is skipped.",
        Context::line(None, line, offset, length).to_owned(),
    )
}

fn mismatch_explanation(sequence: &AnnotatedSequence, site: ModificationSite) -> String {
    match site {
        ModificationSite::AminoAcid(aa, position) => sequence.amino_acid(position).map_or_else(
            || {
                format!(
                    "The modification is placed on {aa} at position {position} but the peptide '{}' only has {} residues",
                    sequence.as_peptide(),
                    sequence.len()
                )
            },
            |found| {
                format!(
                    "The modification is placed on {aa} at position {position} but the peptide '{}' has {found} at that position",
                    sequence.as_peptide(),
                )
            },
        ),
        ModificationSite::NTerm | ModificationSite::CTerm => format!(
            "The modification on {site} could not be placed on the peptide '{}'",
            sequence.as_peptide()
        ),
    }
}

/// Applies free text modification descriptions to annotated sequences
#[derive(Clone, Copy, Debug)]
pub struct ModificationParser<'a> {
    table: &'a ModificationTable,
    calc_formula: bool,
}

impl<'a> ModificationParser<'a> {
    /// Create a parser, if `calc_formula` is set every modification has to be present in the table
    pub const fn new(table: &'a ModificationTable, calc_formula: bool) -> Self {
        Self {
            table,
            calc_formula,
        }
    }

    /// Apply a comma separated modification description to the sequence. The mass of every
    /// modification is added to the mass delta of its site. Returns the summed formula of all
    /// modifications (empty if formula calculation is turned off) and the warnings for all
    /// tokens that could not be read and are skipped. A missing description (`None`) and an empty
    /// description both do nothing.
    /// # Errors
    /// * If a modification names a residue that is not the residue at that position.
    /// * If formula calculation is on and a modification is not in the table.
    pub fn apply(
        &self,
        sequence: &mut AnnotatedSequence,
        description: Option<&str>,
    ) -> ParserResult<MolecularFormula> {
        let mut formula = MolecularFormula::default();
        let mut warnings = Vec::new();
        let Some(description) = description else {
            return Ok((formula, warnings));
        };
        for (offset, text) in split_with_offsets(description, ',') {
            let Some(token) = ModificationToken::parse(text) else {
                warnings.push(unparsable_token(description, offset, text.len()));
                continue;
            };
            let Some(index) = sequence.site_index(token.site) else {
                return Err(BoxedError::new(
                    NormalizeErrorKind::SequenceMismatch,
                    "Modification does not match sequence",
                    mismatch_explanation(sequence, token.site),
                    Context::line(None, description, offset, text.len()).to_owned(),
                ));
            };
            sequence.add_mass_delta(index, token.mass_delta);
            if self.calc_formula {
                let delta = self
                    .table
                    .get(&token.name, token.site.target())
                    .ok_or_else(|| {
                        BoxedError::new(
                            NormalizeErrorKind::UnknownModification,
                            "Unknown modification",
                            format!(
                                "The modification '{}' on {} is not in the modification table, so no formula can be calculated",
                                token.name.to_lowercase(),
                                token.site.target()
                            ),
                            Context::line(None, description, offset, text.len()).to_owned(),
                        )
                    })?;
                formula += delta;
            }
        }
        Ok((formula, warnings))
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::FullErrorContent;

    use super::*;
    use crate::molecular_formula;

    #[test]
    fn parse_tokens() {
        assert_eq!(
            ModificationToken::parse("C2: Carbamidomethyl (+57.02)"),
            Some(ModificationToken {
                site: ModificationSite::AminoAcid(AminoAcid::Cysteine, 2),
                name: "Carbamidomethyl".to_string(),
                mass_delta: 57.02
            })
        );
        assert_eq!(
            ModificationToken::parse("n-term: Acetylation of the protein n-terminus (+42.01)"),
            Some(ModificationToken {
                site: ModificationSite::NTerm,
                name: "Acetylation of the protein n-terminus".to_string(),
                mass_delta: 42.01
            })
        );
        assert_eq!(
            ModificationToken::parse("N-term: Gln->pyro-Glu (-17.03)").map(|t| t.site),
            Some(ModificationSite::NTerm)
        );
        assert_eq!(
            ModificationToken::parse("c-term: Amidated (-0.98)").map(|t| (t.site, t.mass_delta)),
            Some((ModificationSite::CTerm, -0.98))
        );
        assert_eq!(
            ModificationToken::parse("q12: Deamidated (NQ) (+0.98)").map(|t| t.site),
            Some(ModificationSite::AminoAcid(AminoAcid::Glutamine, 12))
        );
        assert_eq!(ModificationToken::parse("M: Oxidation (+15.99)"), None);
        assert_eq!(ModificationToken::parse("M5 Oxidation (+15.99)"), None);
        assert_eq!(ModificationToken::parse("M5: Oxidation"), None);
        assert_eq!(ModificationToken::parse("B5: Oxidation (+15.99)"), None);
        assert!("garbage".parse::<ModificationToken>().is_err());
    }

    #[test]
    fn carbamidomethyl() {
        let mut sequence = AnnotatedSequence::from_peptide("ACDEK").unwrap();
        let base = sequence.formula(true, true);
        let (delta, warnings) = ModificationParser::new(ModificationTable::builtin(), true)
            .apply(&mut sequence, Some("C2: carbamidomethyl (+57.02)"))
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(sequence.render(2), "AC(+57.02)DEK");
        assert_eq!(delta, molecular_formula!(C 2 H 3 O 1 N 1));
        assert_eq!(&base + &delta - &base, molecular_formula!(C 2 H 3 O 1 N 1));
    }

    #[test]
    fn mismatch() {
        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        let error = ModificationParser::new(ModificationTable::builtin(), false)
            .apply(&mut sequence, Some("K5: oxidation (+15.99)"))
            .unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::SequenceMismatch);
        let error = ModificationParser::new(ModificationTable::builtin(), false)
            .apply(&mut sequence, Some("E8: oxidation (+15.99)"))
            .unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::SequenceMismatch);
    }

    #[test]
    fn absent_and_empty() {
        let parser = ModificationParser::new(ModificationTable::builtin(), true);
        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        let (delta, warnings) = parser.apply(&mut sequence, None).unwrap();
        assert!(delta.is_empty() && warnings.is_empty());
        let (delta, warnings) = parser.apply(&mut sequence, Some("")).unwrap();
        assert!(delta.is_empty() && warnings.is_empty());
        let (delta, warnings) = parser.apply(&mut sequence, Some(" , ")).unwrap();
        assert!(delta.is_empty() && warnings.is_empty());
        assert_eq!(sequence.render(2), "PEPTIDE");
    }

    #[test]
    fn unparsable_tokens_are_skipped() {
        let mut sequence = AnnotatedSequence::from_peptide("MPEPTIDEM").unwrap();
        let (delta, warnings) = ModificationParser::new(ModificationTable::builtin(), true)
            .apply(
                &mut sequence,
                Some("M1: Oxidation (+15.99), what is this, M9: Oxidation (+15.99)"),
            )
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].get_kind(),
            NormalizeErrorKind::UnparsableModificationToken
        );
        assert_eq!(sequence.render(2), "M(+15.99)PEPTIDEM(+15.99)");
        assert_eq!(delta, molecular_formula!(O 2));
        assert_eq!(
            ModificationToken::unparsable_parts(
                "M1: Oxidation (+15.99), what is this, M9: Oxidation (+15.99),"
            ),
            vec!["what is this"]
        );
    }

    #[test]
    fn termini() {
        let mut sequence = AnnotatedSequence::from_peptide("QPEPTIDE").unwrap();
        let (delta, _) = ModificationParser::new(ModificationTable::builtin(), true)
            .apply(
                &mut sequence,
                Some("n-term: Gln->pyro-Glu (-17.03), n-term: Acetyl (+42.01)"),
            )
            .unwrap();
        assert_eq!(sequence.render(2), "QPEPTIDE");
        assert!((sequence.get(0).unwrap().mass_delta - 24.98).abs() < 1e-9);
        assert_eq!(delta, molecular_formula!(C 2 O 0 H 0));

        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        ModificationParser::new(ModificationTable::builtin(), false)
            .apply(&mut sequence, Some("c-term: Amidated (-0.98)"))
            .unwrap();
        assert!((sequence.get(8).unwrap().mass_delta + 0.98).abs() < 1e-9);
    }

    #[test]
    fn unknown_modifications() {
        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        let error = ModificationParser::new(ModificationTable::builtin(), true)
            .apply(&mut sequence, Some("T4: Phospho (+79.97)"))
            .unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::UnknownModification);

        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        let (delta, warnings) = ModificationParser::new(ModificationTable::builtin(), false)
            .apply(&mut sequence, Some("T4: Phospho (+79.97)"))
            .unwrap();
        assert!(delta.is_empty() && warnings.is_empty());
        assert_eq!(sequence.render(2), "PEPT(+79.97)IDE");

        // Oxidation is only known on M
        let mut sequence = AnnotatedSequence::from_peptide("PEPTIDE").unwrap();
        let error = ModificationParser::new(ModificationTable::builtin(), true)
            .apply(&mut sequence, Some("P1: Oxidation (+15.99)"))
            .unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::UnknownModification);
    }
}
