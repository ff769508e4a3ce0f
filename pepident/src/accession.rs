use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static ACCESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+\|([A-Za-z0-9-]+)\|([A-Za-z0-9]+)_").unwrap());
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\w+\|[A-Za-z0-9\-]+\|[A-Za-z0-9_]+\s)?([\w\-/, \\;.\[\]\{\}()]+)(?:OS=.*)$")
        .unwrap()
});
static UNIPROT_ACCESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2}").unwrap()
});

/// What to do with rows for which the protein accession could not be parsed
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum BadAccessionPolicy {
    /// Remove the row
    #[default]
    Drop,
    /// Keep the row, using the raw accession as identifier and name
    Keep,
}

/// The protein a peptide belongs to
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ProteinAccession {
    /// The accession, eg `P12345`
    pub id: String,
    /// The entry name without species, eg `ABC1` for `ABC1_HUMAN`
    pub name: String,
    /// The description from a FASTA style header, if it could be found
    pub description: Option<String>,
    /// If the accession could be recognised, otherwise `id` and `name` contain the raw accession
    pub parsed: bool,
}

/// Resolves protein accession strings, keeping track of all accessions that could not be parsed
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccessionResolver {
    unparsed: BTreeMap<String, usize>,
}

impl AccessionResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an accession, eg `sp|P12345|ABC1_HUMAN`. A bare UniProt accession is also
    /// recognised, in that case the name is the full accession string. The description is taken
    /// from the protein name (or if that is not given from the accession itself) when it is a
    /// FASTA style header with an `OS=` species tag.
    pub fn resolve(&mut self, accession: &str, protein_name: Option<&str>) -> ProteinAccession {
        let accession = accession.trim();
        let description = extract_description(protein_name.unwrap_or(accession));
        if let Some(captures) = ACCESSION.captures(accession) {
            ProteinAccession {
                id: captures[1].to_string(),
                name: captures[2].to_string(),
                description,
                parsed: true,
            }
        } else if let Some(found) = UNIPROT_ACCESSION.find(accession) {
            ProteinAccession {
                id: found.as_str().to_string(),
                name: accession.to_string(),
                description,
                parsed: true,
            }
        } else {
            *self.unparsed.entry(accession.to_string()).or_default() += 1;
            ProteinAccession {
                id: accession.to_string(),
                name: accession.to_string(),
                description,
                parsed: false,
            }
        }
    }

    /// All accessions that could not be parsed, with the number of times they were seen
    pub fn unparsed(&self) -> &BTreeMap<String, usize> {
        &self.unparsed
    }

    /// Get the unparsed accessions, see [`Self::unparsed`]
    pub fn into_unparsed(self) -> BTreeMap<String, usize> {
        self.unparsed
    }
}

/// Get the description from a FASTA style header, the text between the identifier and the `OS=` tag
pub fn extract_description(text: &str) -> Option<String> {
    DESCRIPTION
        .captures(text.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::{AccessionResolver, extract_description};

    #[test]
    fn fasta_header() {
        let mut resolver = AccessionResolver::new();
        let accession = resolver.resolve(
            "sp|P12345|ABC1_HUMAN Some Description OS=Homo sapiens",
            None,
        );
        assert_eq!(accession.id, "P12345");
        assert_eq!(accession.name, "ABC1");
        assert_eq!(accession.description.as_deref(), Some("Some Description"));
        assert!(accession.parsed);
        assert!(resolver.unparsed().is_empty());
    }

    #[test]
    fn protein_name_description() {
        let mut resolver = AccessionResolver::new();
        let accession = resolver.resolve(
            "tr|A0A024R161|A0A024R161_HUMAN",
            Some("Guanine nucleotide-binding protein subunit gamma OS=Homo sapiens OX=9606 GN=DNAJC25-GNG10 PE=3 SV=1"),
        );
        assert_eq!(accession.id, "A0A024R161");
        assert_eq!(accession.name, "A0A024R161");
        assert_eq!(
            accession.description.as_deref(),
            Some("Guanine nucleotide-binding protein subunit gamma")
        );
        let accession = resolver.resolve("sp|P12345|ABC1_HUMAN", Some("No species here"));
        assert_eq!(accession.description, None);
    }

    #[test]
    fn uniprot_fallback() {
        let mut resolver = AccessionResolver::new();
        let accession = resolver.resolve("Q9ABC1 (+2)", None);
        assert_eq!(accession.id, "Q9ABC1");
        assert_eq!(accession.name, "Q9ABC1 (+2)");
        assert!(accession.parsed);
        assert!(resolver.unparsed().is_empty());
    }

    #[test]
    fn unparsed() {
        let mut resolver = AccessionResolver::new();
        for _ in 0..3 {
            let accession = resolver.resolve("Reverse_contaminant", None);
            assert!(!accession.parsed);
            assert_eq!(accession.id, "Reverse_contaminant");
            assert_eq!(accession.name, "Reverse_contaminant");
        }
        resolver.resolve("decoy", None);
        assert_eq!(resolver.unparsed().get("Reverse_contaminant"), Some(&3));
        assert_eq!(resolver.into_unparsed().len(), 2);
    }

    #[test]
    fn descriptions() {
        assert_eq!(
            extract_description("Keratin, type I cytoskeletal 10 OS=Homo sapiens").as_deref(),
            Some("Keratin, type I cytoskeletal 10")
        );
        assert_eq!(extract_description("Keratin"), None);
        assert_eq!(extract_description(""), None);
    }
}
