//! Workload advisory: rule definitions, the evaluation and scoring engine, and the service and
//! HTTP surface built on top of them.
//!
//! The engine is pure. It reads an immutable [`RuleSet`] and baseline [`Scorecard`] and returns a
//! fresh [`Evaluation`] per call, so snapshots can be shared across concurrent requests and
//! swapped wholesale on reload.

pub mod descriptor;
pub mod engine;
pub mod report;
pub mod router;
pub mod rules;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use descriptor::{
    AvailabilityTarget, BudgetPriority, DataSensitivity, DescriptorField, Environment, FieldRef,
    TeamExperience, TrafficProfile, WorkloadDescriptor, WorkloadType,
};
pub use engine::{
    evaluate, AdvisoryEngine, Evaluation, EvaluationError, EvaluationTrace, MatchedRule,
    Recommendation, ScoreChange, ScoreDimension, Scorecard,
};
pub use report::{ReportError, ReportRenderer};
pub use router::advisory_router;
pub use rules::{
    Condition, MalformedRule, Operator, Priority, Rule, RuleSet, ValidationMode, WhenClause,
};
pub use service::{
    AdvisoryService, AdvisoryServiceError, AssessmentMeta, AssessmentResponse, ReportResponse,
    RuleListing, RuleSummary, ENGINE_VERSION,
};
pub use store::{RuleLoadError, RuleStore};
