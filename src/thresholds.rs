//! Named threshold sets: minimum acceptable scores per audit category.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ThresholdMode;

/// The fixed set of Lighthouse audit categories.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
    /// Binary "present or absent" category; its score is null in the result.
    Pwa,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Performance,
        Category::Accessibility,
        Category::BestPractices,
        Category::Seo,
        Category::Pwa,
    ];

    /// Stable string form, matching the category keys in the audit result.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Accessibility => "accessibility",
            Category::BestPractices => "best-practices",
            Category::Seo => "seo",
            Category::Pwa => "pwa",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "performance" => Ok(Category::Performance),
            "accessibility" => Ok(Category::Accessibility),
            "best-practices" => Ok(Category::BestPractices),
            "seo" => Ok(Category::Seo),
            "pwa" => Ok(Category::Pwa),
            other => Err(format!("unknown audit category `{other}`")),
        }
    }
}

/// A total mapping from category to minimum passing score in `[0, 1]`.
///
/// The mapping is total by construction, so every category that can be
/// asserted has an entry in the active set.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdSet {
    minimums: BTreeMap<Category, f64>,
}

impl ThresholdSet {
    /// Baseline thresholds applied to any page visited during a run.
    pub fn default_set() -> Self {
        Self::from_pairs([
            (Category::Performance, 0.60),
            (Category::Accessibility, 0.90),
            (Category::Seo, 0.70),
            (Category::BestPractices, 0.90),
            (Category::Pwa, 0.0),
        ])
    }

    /// Stricter thresholds for the critical checkout journey.
    pub fn custom_set() -> Self {
        Self::from_pairs([
            (Category::Performance, 0.70),
            (Category::Accessibility, 0.95),
            (Category::Seo, 0.75),
            (Category::BestPractices, 0.90),
            (Category::Pwa, 0.0),
        ])
    }

    pub fn for_mode(mode: ThresholdMode) -> Self {
        match mode {
            ThresholdMode::Default => Self::default_set(),
            ThresholdMode::Custom => Self::custom_set(),
        }
    }

    pub fn minimum(&self, category: Category) -> f64 {
        // Both named sets are total over Category::ALL.
        self.minimums[&category]
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (Category, f64)>) -> Self {
        Self {
            minimums: pairs.into_iter().collect(),
        }
    }
}
