use std::{
    num::NonZeroU16,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::chemistry::Element;

/// A molecular formula, a selection of elements of specified isotopes together forming a structure.
///
/// The counts are signed, a formula can be used as a delta that removes atoms. Entries are kept in
/// first seen order, an entry that drops to zero keeps its place but is otherwise ignored. Equality
/// only looks at the counts.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MolecularFormula {
    /// Save all constituent parts as the element in question, the isotope (or None for natural distribution), and the number of that part
    elements: Vec<(Element, Option<NonZeroU16>, i32)>,
    /// The peptide sequence this formula was seeded from, if any
    sequence: String,
}

/// Easily define molecular formulas using the following syntax: `<element> <num>` or `[<isotope> <element> <num>]`
/// ```
/// # use pepcore::*;
/// molecular_formula!(C 12 [13 C 1] H 24);
/// ```
#[macro_export]
macro_rules! molecular_formula {
    ($($tail:tt)*) => {
        $crate::__formula_internal__!([$($tail)*] -> [])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __formula_internal__ {
    ([$e:ident $n:literal $($tail:tt)*] -> [$($output:tt)*]) => {
        $crate::__formula_internal__!([$($tail)*] -> [$($output)*($crate::chemistry::Element::$e, None, $n),])
    };
    ([[$i:literal $e:ident $n:literal] $($tail:tt)*] -> [$($output:tt)*]) => {
        $crate::__formula_internal__!([$($tail)*] -> [$($output)*($crate::chemistry::Element::$e, std::num::NonZeroU16::new($i), $n),])
    };
    ([] -> [$($output:tt)*]) => {
        $crate::chemistry::MolecularFormula::new(&[$($output)*])
    };
}

impl MolecularFormula {
    /// Create a new molecular formula, entries for the same species are merged and zero counts ignored
    pub fn new(elements: &[(Element, Option<NonZeroU16>, i32)]) -> Self {
        let mut formula = Self::default();
        for (element, isotope, count) in elements {
            formula.add_species(*element, *isotope, *count);
        }
        formula
    }

    /// Set the sequence this formula is seeded from
    #[must_use]
    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    /// The sequence this formula was seeded from, empty if it was not created from a sequence
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Get all constituent parts with a non zero count in first seen order
    pub fn elements(&self) -> impl Iterator<Item = &(Element, Option<NonZeroU16>, i32)> {
        self.elements.iter().filter(|(_, _, n)| *n != 0)
    }

    /// The number of the given species in this formula
    pub fn count(&self, element: Element, isotope: Option<NonZeroU16>) -> i32 {
        self.elements
            .iter()
            .find(|(e, i, _)| *e == element && *i == isotope)
            .map_or(0, |(_, _, n)| *n)
    }

    /// Check if this formula has no atoms
    pub fn is_empty(&self) -> bool {
        self.elements().next().is_none()
    }

    /// Add the given number of the species to this formula, an entry at zero stays in place
    fn add_species(&mut self, element: Element, isotope: Option<NonZeroU16>, count: i32) {
        if count == 0 {
            return;
        }
        if let Some(index) = self
            .elements
            .iter()
            .position(|(e, i, _)| *e == element && *i == isotope)
        {
            self.elements[index].2 += count;
        } else {
            self.elements.push((element, isotope, count));
        }
    }
}

impl PartialEq for MolecularFormula {
    fn eq(&self, other: &Self) -> bool {
        self.elements().count() == other.elements().count()
            && self
                .elements()
                .all(|(e, i, n)| other.count(*e, *i) == *n)
    }
}

impl Eq for MolecularFormula {}

impl Add<&MolecularFormula> for &MolecularFormula {
    type Output = MolecularFormula;
    fn add(self, rhs: &MolecularFormula) -> Self::Output {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl Sub<&MolecularFormula> for &MolecularFormula {
    type Output = MolecularFormula;
    fn sub(self, rhs: &MolecularFormula) -> Self::Output {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl Neg for &MolecularFormula {
    type Output = MolecularFormula;
    fn neg(self) -> Self::Output {
        MolecularFormula {
            elements: self.elements.iter().map(|(e, i, n)| (*e, *i, -n)).collect(),
            sequence: self.sequence.clone(),
        }
    }
}

impl Neg for MolecularFormula {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl AddAssign<&Self> for MolecularFormula {
    fn add_assign(&mut self, rhs: &Self) {
        for (e, i, n) in &rhs.elements {
            self.add_species(*e, *i, *n);
        }
        if self.sequence.is_empty() {
            self.sequence.clone_from(&rhs.sequence);
        }
    }
}

impl AddAssign for MolecularFormula {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl SubAssign<&Self> for MolecularFormula {
    fn sub_assign(&mut self, rhs: &Self) {
        for (e, i, n) in &rhs.elements {
            self.add_species(*e, *i, -n);
        }
        if self.sequence.is_empty() {
            self.sequence.clone_from(&rhs.sequence);
        }
    }
}

impl SubAssign for MolecularFormula {
    fn sub_assign(&mut self, rhs: Self) {
        *self -= &rhs;
    }
}

impl_binop_ref_cases!(impl Add, add for MolecularFormula, MolecularFormula, MolecularFormula);
impl_binop_ref_cases!(impl Sub, sub for MolecularFormula, MolecularFormula, MolecularFormula);

impl std::iter::Sum<Self> for MolecularFormula {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut res = Self::default();
        iter.for_each(|v| res += v);
        res
    }
}

impl<'a> std::iter::Sum<&'a Self> for MolecularFormula {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        let mut res = Self::default();
        iter.for_each(|v| res += v);
        res
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::chemistry::MolecularFormula;

    #[test]
    fn sorted() {
        assert_eq!(molecular_formula!(H 2 O 2), molecular_formula!(O 2 H 2));
        assert_eq!(
            molecular_formula!(H 6 C 2 O 1),
            molecular_formula!(O 1 H 6 C 2)
        );
    }

    #[test]
    fn simplified() {
        assert_eq!(molecular_formula!(H 2 O 1 O 1), molecular_formula!(O 2 H 2));
        assert_eq!(
            molecular_formula!(H 2 O 1 O 1 H 1 H -2 H 0 H -1 H 2),
            molecular_formula!(O 2 H 2)
        );
        assert_eq!(
            molecular_formula!(H 2 Se 0 O 1 O 1 N 0 P 0 Na 0),
            molecular_formula!(O 2 H 2)
        );
        assert!(molecular_formula!(H 1 H -1).is_empty());
    }

    #[test]
    fn cancelled_species_keep_their_place() {
        let mut formula = molecular_formula!(Fe 1 Na 1);
        formula -= molecular_formula!(Fe 1);
        assert_eq!(formula, molecular_formula!(Na 1));
        assert_eq!(formula.elements().count(), 1);
        formula += molecular_formula!(Fe 1);
        assert_eq!(formula.to_string(), "FeNa");
        assert_eq!(formula, molecular_formula!(Na 1 Fe 1));
    }

    #[test]
    fn add() {
        assert_eq!(
            molecular_formula!(H 2 O 2),
            molecular_formula!(H 1 O 1) + molecular_formula!(H 1 O 1)
        );
        assert_eq!(
            molecular_formula!(H 2 O 2),
            molecular_formula!(H 1 O -1) + molecular_formula!(O 3 H 1)
        );
        assert_eq!(
            molecular_formula!(C 1 N -1),
            molecular_formula!(C 1) + molecular_formula!(N -1)
        );
    }

    #[test]
    fn commutative_associative() {
        let a = molecular_formula!(C 3 H 5 N 1 O 1);
        let b = molecular_formula!(H -1 O 1 N -1 [15 N 1]);
        let c = molecular_formula!(Se 1 Fe 2);
        assert_eq!(&a + &b, &b + &a);
        assert_eq!((&a + &b) + &c, &a + (&b + &c));
        assert_eq!(
            [a.clone(), b.clone(), c.clone()]
                .iter()
                .sum::<MolecularFormula>(),
            a + b + c
        );
    }

    #[test]
    fn subtract_negate() {
        let a = molecular_formula!(C 2 H 3 N 1 O 1);
        assert_eq!(&a - &a, MolecularFormula::default());
        assert_eq!(-a.clone(), molecular_formula!(C -2 H -3 N -1 O -1));
        assert_eq!(&a + -a.clone(), MolecularFormula::default());
    }

    #[test]
    fn sequence_seed() {
        let seeded = molecular_formula!(H 2).with_sequence("PEP");
        assert_eq!(seeded.sequence(), "PEP");
        let combined = molecular_formula!(O 1) + &seeded;
        assert_eq!(combined.sequence(), "PEP");
        assert_eq!(combined, molecular_formula!(H 2 O 1));
        assert_eq!(seeded, molecular_formula!(H 2));
    }

    #[test]
    fn isotopes() {
        let formula = molecular_formula!([13 C 2] C 1 [2 H 3]);
        assert_eq!(formula.count(crate::chemistry::Element::C, None), 1);
        assert_eq!(
            formula.count(
                crate::chemistry::Element::C,
                std::num::NonZeroU16::new(13)
            ),
            2
        );
        assert_eq!(formula.count(crate::chemistry::Element::H, None), 0);
    }
}
