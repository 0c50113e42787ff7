//! Score assertions with a weighted-audit diagnostic.
//!
//! A threshold miss is not an error; it is a normal outcome whose message
//! shows which weighted sub-audits drag the aggregate down, not just the
//! aggregate number.

use std::cmp::Ordering;
use std::fmt;

use crate::audit::lhr::{CategoryResult, LighthouseResult};
use crate::thresholds::Category;

const PASS_GLYPH: char = '○';
const FAIL_GLYPH: char = '✕';

/// Outcome of asserting one category against a threshold.
#[derive(Clone, Debug)]
pub struct AssertionOutcome {
    pub category: Category,
    pub threshold: f64,
    /// The category's aggregate score; null for binary categories.
    pub score: Option<f64>,
    pub pass: bool,
    /// Weighted sub-audit breakdown, computed on pass and fail alike so
    /// callers can log it uniformly.
    pub diagnostic: String,
}

impl AssertionOutcome {
    pub fn message(&self) -> String {
        let comparator = if self.pass { "<" } else { ">=" };
        let score = match self.score {
            Some(value) => value.to_string(),
            None => "null".to_string(),
        };
        format!(
            "expected category {} to be {} {}, but got {}\n{}",
            self.category, comparator, self.threshold, score, self.diagnostic
        )
    }
}

impl fmt::Display for AssertionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Evaluates `result.categories[category].score >= threshold` (inclusive:
/// a score exactly equal to the threshold passes; a null score compares
/// as 0).
///
/// # Panics
///
/// Panics when `category` is absent from the result, or when a referenced
/// sub-audit record is missing. Both are caller-contract violations and a
/// misconfigured test must fail loudly.
pub fn assert_score(
    result: &LighthouseResult,
    category: Category,
    threshold: f64,
) -> AssertionOutcome {
    let summary = result
        .category(category)
        .unwrap_or_else(|| panic!("category `{category}` is missing from the audit result"));
    let score = summary.score;
    let pass = score.unwrap_or(0.0) >= threshold;
    let diagnostic = render_diagnostic(result, summary);
    AssertionOutcome {
        category,
        threshold,
        score,
        pass,
        diagnostic,
    }
}

/// One line per weighted audit reference: glyph, weight, score, id, and the
/// audit's error message when present. References with weight 0 are
/// excluded; the rest are sorted by weight descending, ties keeping the
/// engine's order.
fn render_diagnostic(result: &LighthouseResult, summary: &CategoryResult) -> String {
    let mut refs: Vec<_> = summary
        .audit_refs
        .iter()
        .filter(|audit_ref| audit_ref.weight > 0.0)
        .collect();
    // sort_by is stable, so equal weights keep the engine-provided order.
    refs.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    refs.iter()
        .map(|audit_ref| {
            let audit = result.audit(&audit_ref.id).unwrap_or_else(|| {
                panic!(
                    "audit `{}` referenced by the category is missing from the result",
                    audit_ref.id
                )
            });
            let glyph = if audit.score == Some(1.0) {
                PASS_GLYPH
            } else {
                FAIL_GLYPH
            };
            let score = match audit.score {
                Some(value) => value.to_string(),
                None => "null".to_string(),
            };
            let error = audit
                .error_message
                .as_deref()
                .map(|message| format!(" {message}"))
                .unwrap_or_default();
            format!(
                "\t{glyph} [weight: {}, score: {}] {}{}",
                audit_ref.weight, score, audit_ref.id, error
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::lhr::{AuditRecord, AuditRef};
    use std::collections::BTreeMap;

    fn result_with(
        category: Category,
        score: Option<f64>,
        refs: Vec<(&str, f64)>,
        audits: Vec<(&str, Option<f64>, Option<&str>)>,
    ) -> LighthouseResult {
        let mut categories = BTreeMap::new();
        categories.insert(
            category.as_str().to_string(),
            CategoryResult {
                score,
                audit_refs: refs
                    .into_iter()
                    .map(|(id, weight)| AuditRef {
                        id: id.to_string(),
                        weight,
                    })
                    .collect(),
            },
        );
        let audits = audits
            .into_iter()
            .map(|(id, score, error)| {
                (
                    id.to_string(),
                    AuditRecord {
                        score,
                        error_message: error.map(str::to_string),
                    },
                )
            })
            .collect();
        LighthouseResult {
            requested_url: None,
            final_url: None,
            fetch_time: "2021-09-07T20:14:45.408Z".into(),
            categories,
            audits,
        }
    }

    #[test]
    fn score_equal_to_threshold_passes() {
        let result = result_with(Category::Seo, Some(0.70), vec![], vec![]);
        assert!(assert_score(&result, Category::Seo, 0.70).pass);
        assert!(!assert_score(&result, Category::Seo, 0.7000001).pass);
    }

    #[test]
    fn null_score_compares_as_zero() {
        let result = result_with(Category::Pwa, None, vec![], vec![]);
        assert!(assert_score(&result, Category::Pwa, 0.0).pass);
        assert!(!assert_score(&result, Category::Pwa, 0.1).pass);
    }

    #[test]
    fn diagnostic_marks_passed_only_on_exact_one() {
        let result = result_with(
            Category::Performance,
            Some(0.5),
            vec![("fast", 3.0), ("almost", 2.0)],
            vec![("fast", Some(1.0), None), ("almost", Some(0.99), None)],
        );
        let outcome = assert_score(&result, Category::Performance, 0.6);
        let lines: Vec<_> = outcome.diagnostic.lines().collect();
        assert!(lines[0].starts_with(&format!("\t{PASS_GLYPH}")));
        assert!(lines[1].starts_with(&format!("\t{FAIL_GLYPH}")));
        assert!(lines[1].contains("score: 0.99"));
    }

    #[test]
    fn failure_message_carries_breakdown_and_error_text() {
        let result = result_with(
            Category::Accessibility,
            Some(0.4),
            vec![("contrast", 7.0)],
            vec![("contrast", Some(0.0), Some("Unable to compute contrast"))],
        );
        let outcome = assert_score(&result, Category::Accessibility, 0.9);
        assert!(!outcome.pass);
        let message = outcome.message();
        assert!(message.starts_with("expected category accessibility to be >= 0.9, but got 0.4"));
        assert!(message.contains("[weight: 7, score: 0] contrast Unable to compute contrast"));
    }

    #[test]
    #[should_panic(expected = "category `performance` is missing")]
    fn missing_category_is_a_caller_error() {
        let result = result_with(Category::Seo, Some(1.0), vec![], vec![]);
        assert_score(&result, Category::Performance, 0.5);
    }
}
