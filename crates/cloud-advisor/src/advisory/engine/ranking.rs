use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::super::rules::{Priority, Rule};

/// Advisory fields of a matched rule, projected for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub confidence: f64,
    pub recommendation: String,
    pub rationale: String,
    pub tradeoffs: Vec<String>,
}

impl From<&Rule> for Recommendation {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            category: rule.category.clone(),
            priority: rule.priority.clone(),
            confidence: rule.confidence,
            recommendation: rule.recommendation.clone(),
            rationale: rule.rationale.clone(),
            tradeoffs: rule.tradeoffs.clone(),
        }
    }
}

/// Order by priority (P0 first, unknown labels last), then confidence descending.
///
/// The sort is stable: equal keys keep their match order.
pub fn rank(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| {
                // Validated confidences are never NaN; `-0.0` and `0.0` must tie.
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            })
    });
    recommendations
}
