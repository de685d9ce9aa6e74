use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::json;

use super::common::*;
use crate::advisory::engine::{evaluate, ScoreDimension, Scorecard};
use crate::advisory::rules::{Priority, WhenClause};

fn delta(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries
        .iter()
        .map(|(name, amount)| (name.to_string(), *amount))
        .collect()
}

#[test]
fn deltas_saturate_at_both_bounds() {
    let baseline = Scorecard::new(95, 5, 50, 50, 50);
    let rules = vec![with_delta(
        rule("CLAMP", Priority::P1, 0.5, WhenClause::default()),
        &[("cost", 20), ("security", -20)],
    )];

    let evaluation = evaluate(&dev_descriptor(), &rules, &baseline).expect("evaluates");

    assert_eq!(evaluation.scores.cost(), 100);
    assert_eq!(evaluation.scores.security(), 0);
    assert_eq!(evaluation.scores.reliability(), 50);
    assert_eq!(evaluation.trace.score_changes[0].before, baseline);
}

#[test]
fn clamping_is_applied_after_each_rule() {
    let baseline = Scorecard::new(95, 5, 50, 50, 50);
    let rules = vec![
        with_delta(
            rule("R1", Priority::P2, 0.5, WhenClause::default()),
            &[("cost", 10), ("security", 200)],
        ),
        with_delta(
            rule("R2", Priority::P0, 0.5, WhenClause::default()),
            &[("security", -999), ("cost", -999)],
        ),
    ];

    let evaluation = evaluate(&dev_descriptor(), &rules, &baseline).expect("evaluates");

    assert_eq!(evaluation.scores.security(), 0);
    assert_eq!(evaluation.scores.cost(), 0);
    let changes = &evaluation.trace.score_changes;
    assert_eq!(changes[0].after.cost(), 100);
    assert_eq!(changes[0].after.security(), 100);
    assert_eq!(changes[1].rule_id, "R2");
}

#[test]
fn saturated_no_op_deltas_are_still_traced() {
    let baseline = Scorecard::new(100, 70, 70, 70, 70);
    let rules = vec![with_delta(
        rule("ALREADY-MAX", Priority::P2, 0.5, WhenClause::default()),
        &[("cost", 5)],
    )];

    let evaluation = evaluate(&dev_descriptor(), &rules, &baseline).expect("evaluates");

    let changes = &evaluation.trace.score_changes;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].before, changes[0].after);
}

#[test]
fn unknown_dimensions_are_ignored() {
    let (after, before, _) =
        Scorecard::uniform(60).apply_delta(&delta(&[("latency", 30), ("performance", 5)]));

    assert_eq!(before, Scorecard::uniform(60));
    assert_eq!(after.performance(), 65);
    for dimension in [
        ScoreDimension::Cost,
        ScoreDimension::Security,
        ScoreDimension::Reliability,
        ScoreDimension::Operations,
    ] {
        assert_eq!(after.get(dimension), 60);
    }
}

#[test]
fn extreme_deltas_saturate_instead_of_overflowing() {
    let (after, _, _) = Scorecard::uniform(50)
        .apply_delta(&delta(&[("cost", i64::MAX), ("security", i64::MIN)]));

    assert_eq!(after.cost(), 100);
    assert_eq!(after.security(), 0);
}

#[test]
fn constructor_clamps_out_of_range_inputs() {
    let scores = Scorecard::new(-15, 250, 0, 100, 42);
    assert_eq!(scores.cost(), 0);
    assert_eq!(scores.security(), 100);
    assert_eq!(scores.operations(), 42);
}

#[test]
fn deserialization_rejects_out_of_range_scores() {
    let err = serde_json::from_value::<Scorecard>(json!({
        "cost": 70,
        "security": 101,
        "reliability": 70,
        "performance": 70,
        "operations": 70,
    }))
    .expect_err("security above 100");
    assert!(err.to_string().contains("security"));

    let scores: Scorecard = serde_json::from_value(json!({
        "cost": 0,
        "security": 100,
        "reliability": 70,
        "performance": 70,
        "operations": 70,
    }))
    .expect("in-range scorecard");
    assert_eq!(scores.security(), 100);
}

#[test]
fn scorecard_serializes_dimension_names() {
    let value = serde_json::to_value(Scorecard::uniform(70)).expect("serialize");
    assert_eq!(
        value,
        json!({
            "cost": 70,
            "security": 70,
            "reliability": 70,
            "performance": 70,
            "operations": 70,
        })
    );
}

proptest! {
    #[test]
    fn scores_stay_in_range(
        start in 0u8..=100,
        amounts in proptest::collection::vec(-500i64..=500, 0..12),
    ) {
        let mut scores = Scorecard::uniform(start);
        for (step, amount) in amounts.iter().enumerate() {
            let dimension = ScoreDimension::ALL[step % ScoreDimension::ALL.len()];
            let (next, _, _) = scores.apply_delta(&delta(&[(dimension.label(), *amount)]));
            scores = next;
        }
        for dimension in ScoreDimension::ALL {
            prop_assert!(scores.get(dimension) <= 100);
        }
    }

    #[test]
    fn single_adjustment_matches_clamped_sum(start in 0u8..=100, amount in -300i64..=300) {
        let mut scores = Scorecard::uniform(start);
        scores.adjust(ScoreDimension::Reliability, amount);
        let expected = (i64::from(start) + amount).clamp(0, 100);
        prop_assert_eq!(i64::from(scores.reliability()), expected);
    }
}
