use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::descriptor::WorkloadDescriptor;
use super::engine::{
    AdvisoryEngine, Evaluation, EvaluationError, EvaluationTrace, Recommendation, Scorecard,
};
use super::report::{ReportError, ReportRenderer};
use super::rules::{Priority, Rule, RuleSet};
use super::store::{RuleLoadError, RuleStore};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Facade over the current rule snapshot, the baseline, and report rendering.
pub struct AdvisoryService {
    rules: RwLock<Arc<RuleSet>>,
    store: Option<RuleStore>,
    baseline: Scorecard,
    renderer: ReportRenderer,
}

impl AdvisoryService {
    /// Service over a fixed, in-memory snapshot. `reload` is unavailable.
    pub fn new(rules: RuleSet, baseline: Scorecard) -> Result<Self, AdvisoryServiceError> {
        Ok(Self {
            rules: RwLock::new(Arc::new(rules)),
            store: None,
            baseline,
            renderer: ReportRenderer::new()?,
        })
    }

    /// Service backed by a rule directory, loading the first snapshot eagerly.
    pub fn from_store(store: RuleStore, baseline: Scorecard) -> Result<Self, AdvisoryServiceError> {
        let rules = store.load()?;
        Ok(Self {
            rules: RwLock::new(Arc::new(rules)),
            store: Some(store),
            baseline,
            renderer: ReportRenderer::new()?,
        })
    }

    /// Current snapshot. Callers keep evaluating against it even if a reload swaps it out.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn engine(&self) -> AdvisoryEngine {
        AdvisoryEngine::new(self.snapshot(), self.baseline)
    }

    pub fn rules(&self) -> RuleListing {
        let snapshot = self.snapshot();
        RuleListing {
            count: snapshot.len(),
            rules: snapshot.iter().map(RuleSummary::from).collect(),
        }
    }

    pub fn evaluate(
        &self,
        descriptor: &WorkloadDescriptor,
    ) -> Result<Evaluation, AdvisoryServiceError> {
        Ok(self.engine().assess(descriptor)?)
    }

    /// Evaluate and shape the API response; the trace is attached only on request.
    pub fn assess(
        &self,
        descriptor: WorkloadDescriptor,
    ) -> Result<AssessmentResponse, AdvisoryServiceError> {
        let engine = self.engine();
        let Evaluation {
            recommendations,
            scores,
            trace,
        } = engine.assess(&descriptor)?;
        let trace_enabled = descriptor.trace_requested();

        Ok(AssessmentResponse {
            meta: AssessmentMeta {
                engine_version: ENGINE_VERSION,
                cloud_agnostic: true,
                rules_loaded: engine.rules().len(),
                trace_enabled,
                evaluated_at: Utc::now(),
            },
            normalized_input: descriptor,
            scores,
            recommendations,
            trace: trace_enabled.then_some(trace),
        })
    }

    pub fn report(
        &self,
        descriptor: &WorkloadDescriptor,
    ) -> Result<ReportResponse, AdvisoryServiceError> {
        let evaluation = self.evaluate(descriptor)?;
        let report = self.renderer.render(
            descriptor,
            &evaluation.scores,
            &evaluation.recommendations,
        )?;
        Ok(ReportResponse {
            format: "markdown",
            report,
        })
    }

    /// Re-read the rule store and swap the snapshot. A failed load leaves the old one active.
    pub fn reload(&self) -> Result<usize, AdvisoryServiceError> {
        let store = self
            .store
            .as_ref()
            .ok_or(AdvisoryServiceError::ReloadUnavailable)?;
        let fresh = Arc::new(store.load()?);
        let count = fresh.len();

        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        info!(rules = count, dir = %store.dir().display(), "rule snapshot swapped");
        Ok(count)
    }
}

/// Public projection of a rule for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub confidence: f64,
}

impl From<&Rule> for RuleSummary {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            category: rule.category.clone(),
            priority: rule.priority.clone(),
            confidence: rule.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleListing {
    pub count: usize,
    pub rules: Vec<RuleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentMeta {
    pub engine_version: &'static str,
    pub cloud_agnostic: bool,
    pub rules_loaded: usize,
    pub trace_enabled: bool,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub normalized_input: WorkloadDescriptor,
    pub scores: Scorecard,
    pub recommendations: Vec<Recommendation>,
    pub meta: AssessmentMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<EvaluationTrace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub format: &'static str,
    pub report: String,
}

/// Error raised by the advisory service.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    RuleStore(#[from] RuleLoadError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("rule reload requires a rule directory")]
    ReloadUnavailable,
}
