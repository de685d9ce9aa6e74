mod condition;
mod matcher;
mod ranking;
mod scoring;
mod trace;

pub use condition::{evaluate_condition, UnsupportedOperator};
pub use matcher::rule_matches;
pub use ranking::{rank, Recommendation};
pub use scoring::{ScoreDimension, ScoreOutOfRange, Scorecard, SCORE_MAX, SCORE_MIN};
pub use trace::{EvaluationTrace, MatchedRule, ScoreChange};

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::descriptor::WorkloadDescriptor;
use super::rules::{Rule, RuleSet};

/// Failure that aborts an evaluation. No partial result accompanies it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("rule {rule_id} uses unsupported operator `{operator}`")]
    UnsupportedOperator { rule_id: String, operator: String },
}

/// Result of running a rule set against one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub recommendations: Vec<Recommendation>,
    pub scores: Scorecard,
    pub trace: EvaluationTrace,
}

/// Run `rules` in order against the descriptor, starting from a copy of `baseline`.
pub fn evaluate(
    descriptor: &WorkloadDescriptor,
    rules: &[Rule],
    baseline: &Scorecard,
) -> Result<Evaluation, EvaluationError> {
    let mut scores = *baseline;
    let mut recommendations = Vec::new();
    let mut trace = EvaluationTrace::default();

    for rule in rules {
        let matched =
            rule_matches(descriptor, rule).map_err(|UnsupportedOperator(operator)| {
                EvaluationError::UnsupportedOperator {
                    rule_id: rule.id.clone(),
                    operator,
                }
            })?;
        if !matched {
            continue;
        }

        recommendations.push(Recommendation::from(rule));
        trace.matched_rules.push(MatchedRule::from(rule));

        if !rule.score_delta.is_empty() {
            let (next, before, after) = scores.apply_delta(&rule.score_delta);
            trace.score_changes.push(ScoreChange {
                rule_id: rule.id.clone(),
                before,
                after,
            });
            scores = next;
        }
    }

    debug!(
        rules = rules.len(),
        matched = trace.matched_rules.len(),
        score_changes = trace.score_changes.len(),
        %scores,
        "evaluated workload"
    );

    Ok(Evaluation {
        recommendations: rank(recommendations),
        scores,
        trace,
    })
}

/// Stateless evaluator bound to one rule snapshot and baseline.
#[derive(Debug, Clone)]
pub struct AdvisoryEngine {
    rules: Arc<RuleSet>,
    baseline: Scorecard,
}

impl AdvisoryEngine {
    pub fn new(rules: Arc<RuleSet>, baseline: Scorecard) -> Self {
        Self { rules, baseline }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn assess(&self, descriptor: &WorkloadDescriptor) -> Result<Evaluation, EvaluationError> {
        evaluate(descriptor, self.rules.rules(), &self.baseline)
    }
}
