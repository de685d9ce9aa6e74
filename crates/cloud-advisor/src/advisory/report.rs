use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;

use super::descriptor::WorkloadDescriptor;
use super::engine::{Recommendation, Scorecard};

const REPORT_TEMPLATE_NAME: &str = "advisory_report";
const REPORT_TEMPLATE: &str = include_str!("../../templates/advisory_report.md.hbs");

handlebars_helper!(inc: |index: u64| index + 1);
handlebars_helper!(percent: |value: f64| format!("{:.0}%", value * 100.0));

/// Renders evaluation results into a Markdown advisory report.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    registry: Handlebars<'static>,
}

#[derive(Serialize)]
struct ReportContext<'a> {
    input: &'a WorkloadDescriptor,
    scores: &'a Scorecard,
    recommendations: &'a [Recommendation],
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ReportError> {
        Self::with_template(REPORT_TEMPLATE)
    }

    /// Build a renderer around a caller-supplied template.
    pub fn with_template(template: &str) -> Result<Self, ReportError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.register_helper("inc", Box::new(inc));
        registry.register_helper("percent", Box::new(percent));
        registry
            .register_template_string(REPORT_TEMPLATE_NAME, template)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    pub fn render(
        &self,
        input: &WorkloadDescriptor,
        scores: &Scorecard,
        recommendations: &[Recommendation],
    ) -> Result<String, ReportError> {
        let context = ReportContext {
            input,
            scores,
            recommendations,
        };
        Ok(self.registry.render(REPORT_TEMPLATE_NAME, &context)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid report template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("failed to render report: {0}")]
    Render(#[from] handlebars::RenderError),
}
