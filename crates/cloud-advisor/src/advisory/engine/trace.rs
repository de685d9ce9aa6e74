use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::rules::{Priority, Rule, WhenClause};
use super::scoring::Scorecard;

/// Explain-log of one evaluation: which rules matched and how each moved the scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTrace {
    pub matched_rules: Vec<MatchedRule>,
    pub score_changes: Vec<ScoreChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub confidence: f64,
    pub when: WhenClause,
    pub score_delta: BTreeMap<String, i64>,
}

impl From<&Rule> for MatchedRule {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            category: rule.category.clone(),
            priority: rule.priority.clone(),
            confidence: rule.confidence,
            when: rule.when.clone(),
            score_delta: rule.score_delta.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub rule_id: String,
    pub before: Scorecard,
    pub after: Scorecard,
}
