//! The table of known modification compositions

use std::{
    collections::{BTreeMap, HashMap},
    sync::LazyLock,
};

use context_error::*;

use crate::{
    NormalizeError,
    chemistry::{Element, MolecularFormula},
    error::NormalizeErrorKind,
    molecular_formula,
    sequence::{AminoAcid, ModificationTarget},
};

/// The elemental composition delta for modifications, keyed by lowercase name and target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModificationTable {
    entries: HashMap<String, BTreeMap<ModificationTarget, MolecularFormula>>,
}

static BUILTIN: LazyLock<ModificationTable> = LazyLock::new(|| {
    use ModificationTarget::{AminoAcid as Aa, NTerm};

    let mut table = ModificationTable::default();
    let deamidation = molecular_formula!(H -1 O 1 N -1);
    let carbamidomethyl = molecular_formula!(C 2 H 3 O 1 N 1);
    for (name, target, formula) in [
        ("acetyl", NTerm, molecular_formula!(C 2 H 2 O 1)),
        (
            "acetylation of the protein n-terminus",
            NTerm,
            molecular_formula!(C 2 H 2 O 1),
        ),
        ("citrullination", Aa(AminoAcid::Arginine), deamidation.clone()),
        ("desthiocit1", Aa(AminoAcid::Arginine), molecular_formula!(C 32 H 44 N 6 O 9)),
        ("deamidated", Aa(AminoAcid::Asparagine), deamidation.clone()),
        ("deamidated", Aa(AminoAcid::Glutamine), deamidation.clone()),
        ("deamidation", Aa(AminoAcid::Asparagine), deamidation.clone()),
        ("deamidation", Aa(AminoAcid::Glutamine), deamidation),
        ("gln->pyro-glu", NTerm, molecular_formula!(H -2 O -1)),
        ("oxidation", Aa(AminoAcid::Methionine), molecular_formula!(O 1)),
        ("carbamidomethyl", Aa(AminoAcid::Cysteine), carbamidomethyl.clone()),
        ("iodoacetamide derivative", Aa(AminoAcid::Cysteine), carbamidomethyl),
    ] {
        table.insert(name, target, formula);
    }
    table
});

impl ModificationTable {
    /// The built in table
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Add (or replace) an entry, the name is stored lowercase
    pub fn insert(&mut self, name: &str, target: ModificationTarget, formula: MolecularFormula) {
        self.entries
            .entry(name.trim().to_lowercase())
            .or_default()
            .insert(target, formula);
    }

    /// Add all entries of the other table, replacing any existing entries for the same name and target
    pub fn extend(&mut self, other: Self) {
        for (name, targets) in other.entries {
            self.entries.entry(name).or_default().extend(targets);
        }
    }

    /// Get the composition of a modification on the given target, the name is matched case insensitively
    pub fn get(&self, name: &str, target: ModificationTarget) -> Option<&MolecularFormula> {
        self.entries
            .get(&name.trim().to_lowercase())
            .and_then(|targets| targets.get(&target))
    }

    /// Check if a modification is known for any target
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(&name.trim().to_lowercase())
    }

    /// All known modifications
    pub fn iter(&self) -> impl Iterator<Item = (&str, ModificationTarget, &MolecularFormula)> {
        self.entries.iter().flat_map(|(name, targets)| {
            targets
                .iter()
                .map(move |(target, formula)| (name.as_str(), *target, formula))
        })
    }

    /// The number of (name, target) entries
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a table from JSON. The format is an object with the modification names as keys,
    /// containing an object with the targets (`N-TERM`, `C-TERM`, or a residue) as keys, which
    /// in turn contains the element counts keyed by species (`C`, `(13)C`, `D`).
    /// ```json
    /// { "phospho": { "S": { "H": 1, "O": 3, "P": 1 }, "T": { "H": 1, "O": 3, "P": 1 } } }
    /// ```
    /// # Errors
    /// If the text is not valid JSON, or any target or species is not valid.
    pub fn from_json(text: &str) -> Result<Self, NormalizeError> {
        let raw: BTreeMap<String, BTreeMap<String, BTreeMap<String, i32>>> =
            serde_json::from_str(text).map_err(|err| {
                BoxedError::new(
                    NormalizeErrorKind::InvalidConfiguration,
                    "Invalid modification table",
                    err.to_string(),
                    Context::none(),
                )
            })?;
        let mut table = Self::default();
        for (name, targets) in raw {
            for (target, counts) in targets {
                let parsed_target = target.parse::<ModificationTarget>().map_err(|()| {
                    BoxedError::new(
                        NormalizeErrorKind::InvalidConfiguration,
                        "Invalid modification table",
                        format!(
                            "The target '{target}' for '{name}' is not valid, use 'N-TERM', 'C-TERM', or an amino acid"
                        ),
                        Context::show(target.clone()),
                    )
                })?;
                let elements = counts
                    .iter()
                    .map(|(species, count)| {
                        Element::parse_species(species)
                            .map(|(element, isotope)| (element, isotope, *count))
                            .ok_or_else(|| {
                                BoxedError::new(
                                    NormalizeErrorKind::InvalidConfiguration,
                                    "Invalid modification table",
                                    format!(
                                        "The element '{species}' for '{name}' on {target} is not valid"
                                    ),
                                    Context::show(species.clone()),
                                )
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                table.insert(&name, parsed_target, MolecularFormula::new(&elements));
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::FullErrorContent;

    use super::ModificationTable;
    use crate::{
        error::NormalizeErrorKind,
        molecular_formula,
        sequence::{AminoAcid, ModificationTarget},
    };

    #[test]
    fn builtin_lookup() {
        let table = ModificationTable::builtin();
        assert_eq!(
            table.get(
                "Carbamidomethyl",
                ModificationTarget::AminoAcid(AminoAcid::Cysteine)
            ),
            Some(&molecular_formula!(C 2 H 3 O 1 N 1))
        );
        assert_eq!(
            table.get("ACETYL", ModificationTarget::NTerm),
            Some(&molecular_formula!(C 2 H 2 O 1))
        );
        assert_eq!(
            table.get("oxidation", ModificationTarget::AminoAcid(AminoAcid::Proline)),
            None
        );
        assert!(table.contains_name("Oxidation"));
        assert!(!table.contains_name("phospho"));
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn json() {
        let mut table = ModificationTable::from_json(
            r#"{"Phospho": {"S": {"H": 1, "O": 3, "P": 1}, "t": {"H": 1, "O": 3, "P": 1}},
                "Label:13C(6)": {"K": {"C": -6, "(13)C": 6}},
                "Oxidation": {"C-TERM": {"O": 1}}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.get("phospho", ModificationTarget::AminoAcid(AminoAcid::Threonine)),
            Some(&molecular_formula!(H 1 O 3 P 1))
        );
        assert_eq!(
            table.get("label:13c(6)", ModificationTarget::AminoAcid(AminoAcid::Lysine)),
            Some(&molecular_formula!(C -6 [13 C 6]))
        );
        table.extend(ModificationTable::builtin().clone());
        assert_eq!(table.len(), 16);
        assert!(
            table
                .get("oxidation", ModificationTarget::CTerm)
                .is_some()
        );
    }

    #[test]
    fn invalid_json() {
        for text in [
            "[1, 2]",
            r#"{"a": {"X": {"C": 1}}}"#,
            r#"{"a": {"K": {"Q": 1}}}"#,
            r#"{"a": {"K": {"C": 1.5}}}"#,
        ] {
            assert_eq!(
                ModificationTable::from_json(text).unwrap_err().get_kind(),
                NormalizeErrorKind::InvalidConfiguration,
                "{text}"
            );
        }
    }
}
