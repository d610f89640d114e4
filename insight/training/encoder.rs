use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One-hot category encoder fit once at training time. Unseen categories
/// encode to all zeros, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: IndexMap<String, usize>,
}

impl OneHotEncoder {
    /// Fits the encoder on the sorted unique values of the training fold.
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = values.into_iter().collect();
        let categories = unique
            .into_iter()
            .enumerate()
            .map(|(index, value)| (value.to_string(), index))
            .collect();
        Self { categories }
    }

    /// Width of the one-hot block.
    #[must_use]
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Index of a known category, or `None` for unseen values.
    #[must_use]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories.get(value).copied()
    }

    /// Fitted categories in encoding order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }
}
