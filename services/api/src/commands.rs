use crate::infra::{read_descriptor, require_rule_dir, rule_store, OutputFormat};
use clap::Args;
use cloud_advisor::advisory::{AdvisoryService, RuleSet, WorkloadDescriptor};
use cloud_advisor::config::AppConfig;
use cloud_advisor::error::AppError;
use cloud_advisor::telemetry;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct RulesListArgs {
    /// Rule directory to read (defaults to ADVISOR_RULES_DIR)
    #[arg(long)]
    pub(crate) rules_dir: Option<PathBuf>,
    /// Reject rule authoring mistakes instead of logging them
    #[arg(long)]
    pub(crate) strict: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesCheckArgs {
    /// Rule directory to validate (defaults to ADVISOR_RULES_DIR)
    #[arg(long)]
    pub(crate) rules_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding the workload descriptor
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Rule directory to evaluate against (defaults to ADVISOR_RULES_DIR)
    #[arg(long)]
    pub(crate) rules_dir: Option<PathBuf>,
    /// Reject rule authoring mistakes instead of logging them
    #[arg(long)]
    pub(crate) strict: bool,
    /// Output format for the assessment
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn run_rules_list(args: RulesListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = rule_store(&config.advisor, args.rules_dir, args.strict);
    let rules = store.load()?;
    print!("{}", render_rule_listing(store.dir(), &rules));
    Ok(())
}

pub(crate) fn run_rules_check(args: RulesCheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = rule_store(&config.advisor, args.rules_dir, true);
    require_rule_dir(&store)?;
    let rules = store.load()?;
    println!(
        "{} rules in {} passed strict validation",
        rules.len(),
        store.dir().display()
    );
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        input,
        rules_dir,
        strict,
        format,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let descriptor = read_descriptor(&input)?;
    let service = AdvisoryService::from_store(
        rule_store(&config.advisor, rules_dir, strict),
        config.advisor.baseline,
    )?;
    println!("{}", render_assessment(&service, descriptor, format)?);
    Ok(())
}

pub(crate) fn render_rule_listing(dir: &Path, rules: &RuleSet) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} rules loaded from {} ({:?} validation)",
        rules.len(),
        dir.display(),
        rules.mode()
    );
    for rule in rules {
        let _ = writeln!(
            output,
            "- {:<10} {} {:>4.2} [{}] {}",
            rule.id, rule.priority, rule.confidence, rule.category, rule.title
        );
        if !rule.score_delta.is_empty() {
            let deltas = rule
                .score_delta
                .iter()
                .map(|(dimension, amount)| format!("{dimension} {amount:+}"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(output, "  score: {deltas}");
        }
    }
    output
}

pub(crate) fn render_assessment(
    service: &AdvisoryService,
    descriptor: WorkloadDescriptor,
    format: OutputFormat,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => {
            let response = service.assess(descriptor)?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Markdown => Ok(service.report(&descriptor)?.report),
    }
}
