use serde::{Deserialize, Serialize};

/// The mode of mass to use
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum MassMode {
    /// Monoisotopic mass, use the base isotope to calculate the mass (eg always 12C)
    #[default]
    Monoisotopic,
    /// The average weight, the average between all occurring isotopes (eg something in between 12C and 13C depending on the number of C)
    Average,
}

impl std::fmt::Display for MassMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Monoisotopic => "monoisotopic",
                Self::Average => "average",
            }
        )
    }
}

impl std::str::FromStr for MassMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monoisotopic" | "mono" => Ok(Self::Monoisotopic),
            "average" | "avg" => Ok(Self::Average),
            _ => Err(format!(
                "'{s}' is not a mass mode, use 'monoisotopic' or 'average'"
            )),
        }
    }
}
