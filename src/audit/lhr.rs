//! Structured audit result (LHR). Read-only to the harness core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::thresholds::Category;

/// The engine's structured result for one audit invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Engine-reported capture timestamp; doubles as the report filename.
    pub fetch_time: String,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryResult>,
    #[serde(default)]
    pub audits: BTreeMap<String, AuditRecord>,
}

/// One category's aggregate score plus its weighted sub-audit references.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    /// In `[0, 1]`, or null for a binary present/absent category.
    pub score: Option<f64>,
    #[serde(default)]
    pub audit_refs: Vec<AuditRef>,
}

/// A (audit id, weight) pairing linking a category to a scored sub-audit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRef {
    pub id: String,
    #[serde(default)]
    pub weight: f64,
}

/// A scored sub-audit record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LighthouseResult {
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.categories.get(category.as_str())
    }

    pub fn audit(&self, id: &str) -> Option<&AuditRecord> {
        self.audits.get(id)
    }
}
