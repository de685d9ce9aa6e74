use super::super::descriptor::WorkloadDescriptor;
use super::super::rules::{Operator, Rule, WhenClause};
use super::condition::{evaluate_condition, UnsupportedOperator};

/// Decide whether `rule` applies to the descriptor.
pub fn rule_matches(
    descriptor: &WorkloadDescriptor,
    rule: &Rule,
) -> Result<bool, UnsupportedOperator> {
    clause_matches(descriptor, &rule.when)
}

pub(crate) fn clause_matches(
    descriptor: &WorkloadDescriptor,
    when: &WhenClause,
) -> Result<bool, UnsupportedOperator> {
    // Short-circuiting must not hide a malformed operator behind an earlier false condition.
    if let Some(raw) = when.conditions().find_map(|condition| match &condition.operator {
        Operator::Unsupported(raw) => Some(raw),
        _ => None,
    }) {
        return Err(UnsupportedOperator(raw.clone()));
    }

    for condition in &when.all {
        if !evaluate_condition(descriptor, condition)? {
            return Ok(false);
        }
    }

    if when.any.is_empty() {
        return Ok(true);
    }

    for condition in &when.any {
        if evaluate_condition(descriptor, condition)? {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::descriptor::{Environment, TrafficProfile, WorkloadType};
    use crate::advisory::rules::Condition;
    use serde_json::json;

    fn staging_api() -> WorkloadDescriptor {
        WorkloadDescriptor::new(WorkloadType::WebApi, Environment::Staging, TrafficProfile::High)
    }

    fn when(all: Vec<Condition>, any: Vec<Condition>) -> WhenClause {
        WhenClause { all, any }
    }

    #[test]
    fn empty_clause_matches_everything() {
        assert!(clause_matches(&staging_api(), &WhenClause::default()).expect("valid"));
    }

    #[test]
    fn all_group_requires_every_condition() {
        let clause = when(
            vec![
                Condition::new("workload_type", "eq", json!("web_api")),
                Condition::new("environment", "eq", json!("prod")),
            ],
            Vec::new(),
        );
        assert!(!clause_matches(&staging_api(), &clause).expect("valid"));
    }

    #[test]
    fn any_group_requires_one_condition() {
        let clause = when(
            Vec::new(),
            vec![
                Condition::new("environment", "eq", json!("prod")),
                Condition::new("traffic_profile", "in", json!(["high", "spiky"])),
            ],
        );
        assert!(clause_matches(&staging_api(), &clause).expect("valid"));
    }

    #[test]
    fn both_groups_must_hold_together() {
        let clause = when(
            vec![Condition::new("workload_type", "eq", json!("web_api"))],
            vec![Condition::new("environment", "eq", json!("prod"))],
        );
        assert!(!clause_matches(&staging_api(), &clause).expect("valid"));

        let clause = when(
            vec![Condition::new("workload_type", "eq", json!("web_api"))],
            vec![Condition::new("environment", "in", json!(["staging", "prod"]))],
        );
        assert!(clause_matches(&staging_api(), &clause).expect("valid"));
    }

    #[test]
    fn unsupported_operator_surfaces_even_after_a_false_condition() {
        let clause = when(
            vec![
                Condition::new("environment", "eq", json!("prod")),
                Condition::new("environment", "regex", json!("^pro")),
            ],
            Vec::new(),
        );
        let err = clause_matches(&staging_api(), &clause).expect_err("unsupported operator");
        assert_eq!(err.0, "regex");
    }
}
