use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

/// The elements that can occur in peptides and modifications.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[allow(missing_docs)]
pub enum Element {
    H,
    C,
    N,
    O,
    F,
    Na,
    P,
    S,
    Cl,
    K,
    Fe,
    Se,
    Br,
    I,
}

impl Element {
    /// All elements
    pub const ALL: &'static [Self] = &[
        Self::H,
        Self::C,
        Self::N,
        Self::O,
        Self::F,
        Self::Na,
        Self::P,
        Self::S,
        Self::Cl,
        Self::K,
        Self::Fe,
        Self::Se,
        Self::Br,
        Self::I,
    ];

    /// The element symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Na => "Na",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::Fe => "Fe",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
        }
    }

    /// The (monoisotopic, average) mass of this element, or of the given isotope of it.
    /// Returns `None` for species without mass data.
    fn masses(self, isotope: Option<NonZeroU16>) -> Option<(f64, f64)> {
        match (self, isotope.map(NonZeroU16::get)) {
            (Self::C, None) => Some((12.0, 12.011)),
            (Self::C, Some(13)) => Some((13.00335, 13.00335)),
            (Self::H, None) => Some((1.00783, 1.008)),
            (Self::H, Some(2)) => Some((2.0141, 2.0141)),
            (Self::N, None) => Some((14.00307, 14.007)),
            (Self::N, Some(15)) => Some((15.00011, 15.00011)),
            (Self::O, None) => Some((15.99491, 15.999)),
            (Self::O, Some(18)) => Some((17.99916, 17.99916)),
            (Self::S, None) => Some((31.97207, 32.06)),
            (Self::P, None) => Some((30.97376, 30.97376)),
            (Self::Se, None) => Some((79.91652, 78.96)),
            (Self::Cl, None) => Some((34.96885, 35.45)),
            (Self::Br, None) => Some((78.91834, 79.904)),
            _ => None,
        }
    }

    /// The monoisotopic mass of the specified isotope of this element (if that isotope has mass data)
    pub fn mass(self, isotope: Option<NonZeroU16>) -> Option<f64> {
        self.masses(isotope).map(|m| m.0)
    }

    /// The average weight of the specified isotope of this element (if that isotope has mass data)
    pub fn average_weight(self, isotope: Option<NonZeroU16>) -> Option<f64> {
        self.masses(isotope).map(|m| m.1)
    }

    /// Render a species, deuterium is written as `D`, other isotopes as `(13)C`
    pub fn species_symbol(self, isotope: Option<NonZeroU16>) -> String {
        match isotope {
            None => self.symbol().to_string(),
            Some(i) if self == Self::H && i.get() == 2 => "D".to_string(),
            Some(i) => format!("({i}){}", self.symbol()),
        }
    }

    /// Parse a species as written by [`Self::species_symbol`], so `C`, `(13)C`, or `D`.
    pub fn parse_species(text: &str) -> Option<(Self, Option<NonZeroU16>)> {
        let text = text.trim();
        if text == "D" {
            return Some((Self::H, NonZeroU16::new(2)));
        }
        if let Some(rest) = text.strip_prefix('(') {
            let (number, symbol) = rest.split_once(')')?;
            let isotope = number.trim().parse::<NonZeroU16>().ok()?;
            symbol
                .trim()
                .parse::<Self>()
                .ok()
                .map(|element| (element, Some(isotope)))
        } else {
            text.parse::<Self>().ok().map(|element| (element, None))
        }
    }
}

impl std::str::FromStr for Element {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.symbol() == s)
            .copied()
            .ok_or(())
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
