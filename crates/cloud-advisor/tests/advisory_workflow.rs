//! Integration specifications for the advisory workflow.
//!
//! Scenarios run the bundled rule catalogue through the public service facade and HTTP router,
//! so catalogue edits that break strict loading or shift the headline scenario surface here.

mod common {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use serde_json::json;

    use cloud_advisor::advisory::{
        AvailabilityTarget, DataSensitivity, Environment, RuleStore, TrafficProfile,
        ValidationMode, WorkloadDescriptor, WorkloadType,
    };

    pub(super) fn bundled_rules_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../rules")
    }

    pub(super) fn strict_store() -> RuleStore {
        RuleStore::new(bundled_rules_dir(), ValidationMode::Strict)
    }

    pub(super) fn prod_web_api() -> WorkloadDescriptor {
        let mut descriptor =
            WorkloadDescriptor::new(WorkloadType::WebApi, Environment::Prod, TrafficProfile::Spiky);
        descriptor.availability_target = AvailabilityTarget::High;
        descriptor.rto_minutes = 15;
        descriptor.rpo_minutes = 5;
        descriptor.data_sensitivity = DataSensitivity::Confidential;
        descriptor.constraints = vec!["no k8s".to_string()];
        descriptor.notes = Some("test".to_string());
        descriptor.provider_hints = BTreeMap::from([("trace".to_string(), json!(true))]);
        descriptor
    }

    pub(super) fn dev_batch() -> WorkloadDescriptor {
        WorkloadDescriptor::new(WorkloadType::Batch, Environment::Dev, TrafficProfile::Low)
    }
}

mod catalogue {
    use super::common::*;
    use cloud_advisor::advisory::{Priority, ScoreDimension};

    #[test]
    fn bundled_rules_pass_strict_validation() {
        let rules = strict_store().load().expect("bundled rules are strictly valid");

        assert!(!rules.is_empty());
        for rule in &rules {
            assert!(
                !matches!(rule.priority, Priority::Other(_)),
                "{} uses a non-standard priority",
                rule.id
            );
            assert!(!rule.recommendation.trim().is_empty(), "{} lacks advice", rule.id);
            for dimension in rule.score_delta.keys() {
                assert!(ScoreDimension::parse(dimension).is_some());
            }
        }
    }

    #[test]
    fn bundled_rules_load_in_file_order() {
        let rules = strict_store().load().expect("rules load");
        let first_ids: Vec<&str> = rules.iter().take(2).map(|rule| rule.id.as_str()).collect();
        assert_eq!(first_ids, ["SEC-001", "SEC-002"]);
    }
}

mod assessment {
    use super::common::*;
    use cloud_advisor::advisory::{AdvisoryService, Priority, Scorecard};

    fn service() -> AdvisoryService {
        AdvisoryService::from_store(strict_store(), Scorecard::uniform(70)).expect("service")
    }

    #[test]
    fn production_web_api_gets_ranked_advice() {
        let response = service().assess(prod_web_api()).expect("assessment");

        let priorities: Vec<u8> = response
            .recommendations
            .iter()
            .map(|rec| rec.priority.rank())
            .collect();
        assert!(priorities.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(response.recommendations[0].priority, Priority::P0);

        let ids: Vec<&str> = response
            .recommendations
            .iter()
            .map(|rec| rec.id.as_str())
            .collect();
        for expected in ["SEC-001", "REL-001", "REL-002", "PERF-001", "OPS-001", "OPS-002"] {
            assert!(ids.contains(&expected), "missing {expected}");
        }
        assert!(!ids.contains(&"COST-001"));

        let trace = response.trace.expect("trace requested");
        assert_eq!(trace.matched_rules.len(), response.recommendations.len());
        assert_eq!(trace.score_changes.last().map(|c| c.after), Some(response.scores));
        assert!(response.meta.trace_enabled);
        assert!(response.meta.rules_loaded >= ids.len());
    }

    #[test]
    fn report_lists_every_recommendation() {
        let service = service();
        let evaluation = service.evaluate(&dev_batch()).expect("evaluation");
        let report = service.report(&dev_batch()).expect("report");

        assert_eq!(report.format, "markdown");
        for recommendation in &evaluation.recommendations {
            assert!(report.report.contains(&recommendation.title));
        }
    }
}

mod routing {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use cloud_advisor::advisory::{advisory_router, AdvisoryService, Scorecard};
    use tower::ServiceExt;

    use super::common::*;

    #[tokio::test]
    async fn reload_route_counts_bundled_rules() {
        let service = Arc::new(
            AdvisoryService::from_store(strict_store(), Scorecard::uniform(70)).expect("service"),
        );
        let expected = service.snapshot().len();

        let response = advisory_router(service)
            .oneshot(
                Request::post("/rules/reload")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["count"], expected);
    }
}
