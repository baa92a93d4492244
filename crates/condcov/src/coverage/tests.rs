//! Coverage model tests
//!
//! Each group checks one property of the ledger or the report arithmetic.

#![allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::float_cmp,
    clippy::needless_range_loop
)]

use super::*;
use proptest::prelude::*;

fn site(line: usize, conditions: &[&str]) -> ConditionalSite {
    ConditionalSite::new(
        SiteId::new("sample_code.py", line),
        conditions.iter().map(|c| (*c).to_string()).collect(),
    )
}

fn site_map(sites: Vec<ConditionalSite>) -> SiteMap {
    sites.into_iter().map(|s| (s.id.clone(), s)).collect()
}

// ============================================================================
// Site identity
// ============================================================================

mod site_id_tests {
    use super::*;

    #[test]
    fn test_site_ids_order_by_file_then_line() {
        let a = SiteId::new("a.py", 10);
        let b = SiteId::new("a.py", 2);
        let c = SiteId::new("b.py", 1);
        let mut ids = vec![c.clone(), a.clone(), b.clone()];
        ids.sort();
        assert_eq!(ids, vec![b, a, c]);
    }

    #[test]
    fn test_site_id_display() {
        assert_eq!(SiteId::new("sample_code.py", 2).to_string(), "sample_code.py:2");
    }

    #[test]
    fn test_site_map_iterates_in_source_order() {
        let map = site_map(vec![site(9, &["x"]), site(2, &["a", "b"]), site(5, &["c"])]);
        let lines: Vec<usize> = map.keys().map(|id| id.line).collect();
        assert_eq!(lines, vec![2, 5, 9]);
    }
}

// ============================================================================
// Report arithmetic
// ============================================================================

mod report_tests {
    use super::*;

    #[test]
    fn test_two_condition_scenario_scores_fifty_percent() {
        let s = site(2, &["age > 65", "first_order"]);
        let mut ledger = CoverageLedger::new();
        ledger.record(s.id.clone(), vec![true, true]);
        ledger.record(s.id.clone(), vec![false, false]);
        let report = CoverageReport::build(&site_map(vec![s]), &ledger);

        let entry = report.site("sample_code.py", 2).unwrap();
        assert_eq!(entry.required, 4);
        assert_eq!(entry.observed, 2);
        assert_eq!(entry.score, 50.0);
        let missing: Vec<Vec<bool>> = entry.missing().collect();
        assert_eq!(missing, vec![vec![true, false], vec![false, true]]);
    }

    #[test]
    fn test_unreached_site_is_fully_missing() {
        let s = site(4, &["a"]);
        let report = CoverageReport::build(&site_map(vec![s]), &CoverageLedger::new());
        let entry = &report.sites[0];
        assert_eq!(entry.observed, 0);
        assert_eq!(entry.score, 0.0);
        assert_eq!(entry.missing_count, 2);
        assert_eq!(
            entry.missing_preview,
            vec!["True for a".to_string(), "False for a".to_string()]
        );
    }

    #[test]
    fn test_no_sites_scores_one_hundred() {
        let report = CoverageReport::build(&SiteMap::new(), &CoverageLedger::new());
        assert_eq!(report.score, 100.0);
        assert_eq!(report.total_required, 0);
        assert!(report.is_complete());
    }

    #[test]
    fn test_aggregate_sums_over_sites() {
        let a = site(2, &["a", "b"]);
        let b = site(4, &["c"]);
        let mut ledger = CoverageLedger::new();
        ledger.record(a.id.clone(), vec![true, true]);
        ledger.record(b.id.clone(), vec![true]);
        ledger.record(b.id.clone(), vec![false]);
        let report = CoverageReport::build(&site_map(vec![a, b]), &ledger);
        assert_eq!(report.total_required, 6);
        assert_eq!(report.total_observed, 3);
        assert_eq!(report.score, 50.0);
        assert!(report.sites[1].is_complete());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_sites_the_report_does_not_know_are_ignored() {
        let a = site(2, &["a"]);
        let mut ledger = CoverageLedger::new();
        ledger.record(SiteId::new("other.py", 2), vec![true]);
        let report = CoverageReport::build(&site_map(vec![a]), &ledger);
        assert_eq!(report.total_observed, 0);
    }

    #[test]
    fn test_required_combinations_saturates() {
        assert_eq!(required_combinations(1), 2);
        assert_eq!(required_combinations(3), 8);
        assert_eq!(required_combinations(63), 1 << 63);
        assert_eq!(required_combinations(64), u64::MAX);
    }

    #[test]
    fn test_json_contains_site_fields() {
        let s = site(2, &["age > 65"]);
        let report = CoverageReport::build(&site_map(vec![s]), &CoverageLedger::new());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["sites"][0]["file"], "sample_code.py");
        assert_eq!(json["sites"][0]["line"], 2);
        assert_eq!(json["sites"][0]["required"], 2);
        assert_eq!(json["score"], 0.0);
        assert!(json["sites"][0].get("seen").is_none());
    }
}

// ============================================================================
// Previews
// ============================================================================

mod preview_tests {
    use super::*;

    #[test]
    fn test_short_condition_list_is_not_truncated() {
        let s = site(2, &["a", "b"]);
        let entry = SiteCoverage::new(&s, &CoverageLedger::new());
        assert_eq!(entry.conditions_preview(), "a, b");
    }

    #[test]
    fn test_long_condition_list_is_truncated() {
        let s = site(2, &["a", "b", "c", "d", "e", "f"]);
        let entry = SiteCoverage::new(&s, &CoverageLedger::new());
        assert_eq!(entry.conditions_preview(), "a, b, c, d, e ...");
    }

    #[test]
    fn test_missing_preview_caps_at_five_with_marker() {
        let s = site(2, &["a", "b", "c"]);
        let entry = SiteCoverage::new(&s, &CoverageLedger::new());
        assert_eq!(entry.missing_preview.len(), PREVIEW_LIMIT + 1);
        assert_eq!(entry.missing_preview[0], "True for a, True for b, True for c");
        assert_eq!(entry.missing_preview[PREVIEW_LIMIT], ELLIPSIS);
    }

    #[test]
    fn test_describe_combination_truncates_wide_tuples() {
        let conditions: Vec<String> = (0..7).map(|i| format!("c{i}")).collect();
        let line = describe_combination(&conditions, &[false; 7]);
        assert_eq!(
            line,
            "False for c0, False for c1, False for c2, False for c3, False for c4 ..."
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;

    fn tuples(width: usize) -> impl Strategy<Value = Vec<Vec<bool>>> {
        prop::collection::vec(prop::collection::vec(any::<bool>(), width), 0..40)
    }

    proptest! {
        #[test]
        fn prop_observed_bounded_by_required(
            (width, recorded) in (1usize..6).prop_flat_map(|w| (Just(w), tuples(w)))
        ) {
            let names: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
            let s = ConditionalSite::new(SiteId::new("t.py", 1), names);
            let mut ledger = CoverageLedger::new();
            for t in recorded {
                ledger.record(s.id.clone(), t);
            }
            let entry = SiteCoverage::new(&s, &ledger);
            prop_assert!(entry.observed <= entry.required);
            prop_assert_eq!(entry.required, 1u64 << width);
            prop_assert_eq!(entry.missing().count() as u64, entry.missing_count);
        }

        #[test]
        fn prop_observed_never_decreases(recorded in tuples(3)) {
            let s = site(1, &["a", "b", "c"]);
            let mut ledger = CoverageLedger::new();
            let mut last = 0;
            for t in recorded {
                ledger.record(s.id.clone(), t);
                let now = SiteCoverage::new(&s, &ledger).observed;
                prop_assert!(now >= last);
                last = now;
            }
        }

        #[test]
        fn prop_missing_and_seen_partition_the_space(recorded in tuples(4)) {
            let s = site(1, &["a", "b", "c", "d"]);
            let mut ledger = CoverageLedger::new();
            for t in recorded {
                ledger.record(s.id.clone(), t);
            }
            let entry = SiteCoverage::new(&s, &ledger);
            let missing: Vec<Vec<bool>> = entry.missing().collect();
            for t in &missing {
                prop_assert!(!entry.seen().contains(t));
            }
            prop_assert_eq!(missing.len() + entry.seen().len(), 16);
        }
    }
}
