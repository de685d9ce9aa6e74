use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::advisory::descriptor::{
    AvailabilityTarget, BudgetPriority, DataSensitivity, Environment, TeamExperience,
    TrafficProfile, WorkloadDescriptor, WorkloadType,
};
use crate::advisory::engine::Scorecard;
use crate::advisory::rules::{Condition, Priority, Rule, RuleSet, WhenClause};
use crate::advisory::{advisory_router, AdvisoryService};

/// Production web API carrying confidential data, as used by the scoring scenarios.
pub(super) fn prod_descriptor() -> WorkloadDescriptor {
    WorkloadDescriptor {
        workload_type: WorkloadType::WebApi,
        environment: Environment::Prod,
        traffic_profile: TrafficProfile::Spiky,
        availability_target: AvailabilityTarget::High,
        rto_minutes: 15,
        rpo_minutes: 5,
        data_sensitivity: DataSensitivity::Confidential,
        budget_priority: BudgetPriority::Balanced,
        team_experience: TeamExperience::Mixed,
        constraints: vec!["no k8s".to_string()],
        notes: Some("test".to_string()),
        provider_hints: BTreeMap::from([("trace".to_string(), json!(true))]),
    }
}

pub(super) fn dev_descriptor() -> WorkloadDescriptor {
    WorkloadDescriptor::new(WorkloadType::Batch, Environment::Dev, TrafficProfile::Low)
}

pub(super) fn rule(id: &str, priority: Priority, confidence: f64, when: WhenClause) -> Rule {
    Rule {
        id: id.to_string(),
        title: format!("{id} title"),
        category: "security".to_string(),
        priority,
        confidence,
        when,
        recommendation: format!("{id} recommendation"),
        rationale: "Because".to_string(),
        tradeoffs: Vec::new(),
        tags: Default::default(),
        score_delta: BTreeMap::new(),
    }
}

pub(super) fn with_delta(mut rule: Rule, delta: &[(&str, i64)]) -> Rule {
    rule.score_delta = delta
        .iter()
        .map(|(dimension, amount)| (dimension.to_string(), *amount))
        .collect();
    rule
}

pub(super) fn any_of(conditions: Vec<Condition>) -> WhenClause {
    WhenClause {
        all: Vec::new(),
        any: conditions,
    }
}

pub(super) fn all_of(conditions: Vec<Condition>) -> WhenClause {
    WhenClause {
        all: conditions,
        any: Vec::new(),
    }
}

pub(super) fn is_prod() -> Condition {
    Condition::new("environment", "eq", json!("prod"))
}

/// The two rules from the baseline-70 scoring scenario.
pub(super) fn security_and_reliability_rules() -> Vec<Rule> {
    vec![
        with_delta(
            rule(
                "SEC-TEST",
                Priority::P0,
                0.9,
                any_of(vec![Condition::new(
                    "data_sensitivity",
                    "in",
                    json!(["confidential"]),
                )]),
            ),
            &[("security", 10), ("operations", -2)],
        ),
        with_delta(
            rule(
                "REL-TEST",
                Priority::P0,
                0.8,
                all_of(vec![
                    is_prod(),
                    Condition::new(
                        "availability_target",
                        "in",
                        json!(["high", "mission_critical"]),
                    ),
                ]),
            ),
            &[("reliability", 15), ("cost", -5)],
        ),
    ]
}

pub(super) fn service_with(rules: Vec<Rule>) -> Arc<AdvisoryService> {
    Arc::new(
        AdvisoryService::new(RuleSet::new(rules), Scorecard::uniform(70))
            .expect("bundled report template compiles"),
    )
}

pub(super) fn router_with(rules: Vec<Rule>) -> axum::Router {
    advisory_router(service_with(rules))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
