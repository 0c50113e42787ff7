//! Contract tests for the score assertion engine against fake audit results.

use std::collections::BTreeMap;

use lightkeeper::{assert_score, AuditRecord, AuditRef, Category, CategoryResult, LighthouseResult, ThresholdSet};

fn empty_result() -> LighthouseResult {
    LighthouseResult {
        requested_url: None,
        final_url: None,
        fetch_time: "2021-09-07T20:14:45.408Z".into(),
        categories: BTreeMap::new(),
        audits: BTreeMap::new(),
    }
}

fn with_category(
    mut result: LighthouseResult,
    category: Category,
    score: Option<f64>,
    refs: &[(&str, f64)],
) -> LighthouseResult {
    result.categories.insert(
        category.as_str().to_string(),
        CategoryResult {
            score,
            audit_refs: refs
                .iter()
                .map(|(id, weight)| AuditRef {
                    id: id.to_string(),
                    weight: *weight,
                })
                .collect(),
        },
    );
    result
}

fn with_audit(
    mut result: LighthouseResult,
    id: &str,
    score: Option<f64>,
    error_message: Option<&str>,
) -> LighthouseResult {
    result.audits.insert(
        id.to_string(),
        AuditRecord {
            score,
            error_message: error_message.map(str::to_string),
        },
    );
    result
}

#[test]
fn passes_iff_score_at_least_threshold_across_the_range() {
    for threshold in [0.0, 0.25, 0.6, 0.9, 1.0] {
        let result = with_category(empty_result(), Category::Seo, Some(0.6), &[]);
        let outcome = assert_score(&result, Category::Seo, threshold);
        assert_eq!(outcome.pass, 0.6 >= threshold, "threshold {threshold}");
    }
}

#[test]
fn boundary_score_equal_to_threshold_passes() {
    let result = with_category(empty_result(), Category::Accessibility, Some(0.9), &[]);
    assert!(assert_score(&result, Category::Accessibility, 0.9).pass);
}

#[test]
fn diagnostic_excludes_zero_weight_references() {
    let result = with_category(
        empty_result(),
        Category::Seo,
        Some(0.8),
        &[("document-title", 1.0), ("structured-data", 0.0)],
    );
    let result = with_audit(result, "document-title", Some(1.0), None);
    let result = with_audit(result, "structured-data", None, None);

    let diagnostic = assert_score(&result, Category::Seo, 0.7).diagnostic;
    assert!(diagnostic.contains("document-title"));
    assert!(!diagnostic.contains("structured-data"));
}

#[test]
fn diagnostic_sorts_by_weight_descending_with_stable_ties() {
    let result = with_category(
        empty_result(),
        Category::Performance,
        Some(0.5),
        &[
            ("tie-first", 2.0),
            ("heavy", 5.0),
            ("tie-second", 2.0),
            ("light", 1.0),
        ],
    );
    let result = ["tie-first", "heavy", "tie-second", "light"]
        .iter()
        .fold(result, |acc, id| with_audit(acc, id, Some(0.0), None));

    let diagnostic = assert_score(&result, Category::Performance, 0.6).diagnostic;
    let order: Vec<&str> = diagnostic
        .lines()
        .map(|line| line.rsplit(' ').next().unwrap())
        .collect();
    assert_eq!(order, vec!["heavy", "tie-first", "tie-second", "light"]);
}

#[test]
fn only_an_exact_score_of_one_renders_as_passed() {
    let result = with_category(
        empty_result(),
        Category::BestPractices,
        Some(0.95),
        &[("perfect", 1.0), ("close", 1.0)],
    );
    let result = with_audit(result, "perfect", Some(1.0), None);
    let result = with_audit(result, "close", Some(0.99), None);

    let diagnostic = assert_score(&result, Category::BestPractices, 0.9).diagnostic;
    let lines: Vec<&str> = diagnostic.lines().collect();
    assert!(lines[0].contains('○') && lines[0].contains("perfect"));
    assert!(lines[1].contains('✕') && lines[1].contains("close"));
}

#[test]
fn audit_error_messages_surface_in_the_diagnostic() {
    let result = with_category(empty_result(), Category::Performance, Some(0.2), &[("lcp", 25.0)]);
    let result = with_audit(result, "lcp", None, Some("The page did not paint any content"));

    let diagnostic = assert_score(&result, Category::Performance, 0.6).diagnostic;
    assert!(diagnostic.contains("lcp The page did not paint any content"));
}

#[test]
fn full_category_sweep_under_default_thresholds() {
    // Scores sit exactly on the default thresholds; every assertion passes.
    let thresholds = ThresholdSet::default_set();
    let mut result = empty_result();
    for (category, score) in [
        (Category::Seo, Some(0.70)),
        (Category::Accessibility, Some(0.90)),
        (Category::Performance, Some(0.60)),
        (Category::BestPractices, Some(0.90)),
        (Category::Pwa, None),
    ] {
        result = with_category(result, category, score, &[]);
    }

    for category in Category::ALL {
        let outcome = assert_score(&result, category, thresholds.minimum(category));
        assert!(outcome.pass, "category {category} should pass");
    }
}

#[test]
fn one_low_category_fails_only_its_own_assertion() {
    let thresholds = ThresholdSet::default_set();
    let mut result = empty_result();
    for (category, score) in [
        (Category::Seo, Some(0.70)),
        (Category::Accessibility, Some(0.89)), // just below 0.90
        (Category::Performance, Some(0.60)),
        (Category::BestPractices, Some(0.90)),
        (Category::Pwa, None),
    ] {
        result = with_category(result, category, score, &[]);
    }

    let outcomes: Vec<_> = Category::ALL
        .iter()
        .map(|&category| assert_score(&result, category, thresholds.minimum(category)))
        .collect();
    let failed: Vec<_> = outcomes.iter().filter(|o| !o.pass).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].category, Category::Accessibility);
}

#[test]
#[should_panic(expected = "missing from the audit result")]
fn asserting_an_absent_category_panics() {
    assert_score(&empty_result(), Category::Seo, 0.5);
}
