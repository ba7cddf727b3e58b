use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::pipeline::processing::normalize::NormalizedRecord;

/// The set of campaign/provider values picked in the filter.
///
/// An empty selection means "no filtering", not "select nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection(BTreeSet<String>);

impl CategorySelection {
    /// No filtering
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a record passes this selection
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        record.category().map_or(false, |c| self.contains(c))
    }
}

impl<S: Into<String>> FromIterator<S> for CategorySelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Distinct present categories in first-seen order.
///
/// Records without a category contribute nothing to the list.
pub fn available_categories(records: &[NormalizedRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(NormalizedRecord::category)
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Keep the records matching `selection`; identity when it is empty
pub fn apply<'a>(
    records: &'a [NormalizedRecord],
    selection: &CategorySelection,
) -> Vec<&'a NormalizedRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}
