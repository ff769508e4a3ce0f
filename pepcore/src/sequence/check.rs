use std::collections::{BTreeMap, BTreeSet};

use context_error::*;
use itertools::Itertools;

use crate::{
    NormalizeError,
    error::NormalizeErrorKind,
    helper_functions::split_with_offsets,
    ontology::ModificationTable,
    sequence::{ModificationTarget, ModificationToken},
};

/// The result of looking up a modification in the table
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ModificationStatus {
    /// Present for this target
    Known,
    /// The name is not in the table at all
    UnknownModification,
    /// The name is in the table, but not for this target
    UnknownForTarget,
}

/// Collect all unique modifications of a report to check them against the table before any
/// formula is calculated.
#[derive(Clone, Debug)]
pub struct ModificationCheck<'a> {
    table: &'a ModificationTable,
    seen: BTreeMap<(String, ModificationTarget), ModificationStatus>,
    unparsable: BTreeSet<String>,
}

impl<'a> ModificationCheck<'a> {
    /// Create a new empty check
    pub const fn new(table: &'a ModificationTable) -> Self {
        Self {
            table,
            seen: BTreeMap::new(),
            unparsable: BTreeSet::new(),
        }
    }

    /// Add all modifications in a comma separated description
    pub fn add_description(&mut self, description: Option<&str>) {
        let Some(description) = description else {
            return;
        };
        for (_, text) in split_with_offsets(description, ',') {
            if let Some(token) = ModificationToken::parse(text) {
                self.add_modification(&token.name, token.site.target());
            } else {
                self.unparsable.insert(text.to_string());
            }
        }
    }

    /// Add a single modification by name and target
    pub fn add_modification(&mut self, name: &str, target: ModificationTarget) {
        let table = self.table;
        self.seen
            .entry((name.trim().to_lowercase(), target))
            .or_insert_with_key(|(name, target)| {
                if table.get(name, *target).is_some() {
                    ModificationStatus::Known
                } else if table.contains_name(name) {
                    ModificationStatus::UnknownForTarget
                } else {
                    ModificationStatus::UnknownModification
                }
            });
    }

    /// Add all given descriptions
    #[must_use]
    pub fn add_descriptions<'s>(
        mut self,
        descriptions: impl IntoIterator<Item = Option<&'s str>>,
    ) -> Self {
        for description in descriptions {
            self.add_description(description);
        }
        self
    }

    /// All unique (lowercase name, target) pairs seen with their status
    pub fn statuses(&self) -> impl Iterator<Item = (&str, ModificationTarget, ModificationStatus)> {
        self.seen
            .iter()
            .map(|((name, target), status)| (name.as_str(), *target, *status))
    }

    /// All pairs that could not be found
    pub fn unknown(&self) -> impl Iterator<Item = (&str, ModificationTarget, ModificationStatus)> {
        self.statuses()
            .filter(|(_, _, status)| *status != ModificationStatus::Known)
    }

    /// All tokens that could not be parsed
    pub fn unparsable(&self) -> impl Iterator<Item = &str> {
        self.unparsable.iter().map(String::as_str)
    }

    /// Check if all seen modifications are known. Any unparsable token also fails the check.
    pub fn all_known(&self) -> bool {
        self.unparsable.is_empty() && self.unknown().next().is_none()
    }

    /// Log all problems at warning level
    pub fn log(&self) {
        for (name, target, status) in self.unknown() {
            match status {
                ModificationStatus::UnknownForTarget => {
                    log::warn!("Modification '{name}' is not known for residue {target}");
                }
                _ => log::warn!("Unknown modification '{name}' on {target}"),
            }
        }
        for text in self.unparsable() {
            log::warn!("Could not parse modification '{text}'");
        }
    }

    /// Get an error summarising all problems, or `None` if all modifications are known
    pub fn to_error(&self) -> Option<NormalizeError> {
        if self.all_known() {
            return None;
        }
        let unknown = self
            .unknown()
            .map(|(name, target, _)| format!("{name} ({target})"))
            .chain(self.unparsable().map(|text| format!("'{text}' (unparsable)")))
            .join(", ");
        Some(BoxedError::new(
            NormalizeErrorKind::UnknownModification,
            "Unknown modifications",
            "Not all modifications used in this report are present in the modification table, add these to the table or do not calculate formulas",
            Context::show(unknown),
        ))
    }
}
