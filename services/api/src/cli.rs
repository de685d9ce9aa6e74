use crate::commands::{
    run_assess, run_rules_check, run_rules_list, AssessArgs, RulesCheckArgs, RulesListArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cloud_advisor::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Cloud Advisor",
    about = "Turn workload requirements into prioritized, cloud-agnostic recommendations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect and validate the rule catalogue
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Assess a workload descriptor from a JSON file without starting the server
    Assess(AssessArgs),
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Print every loaded rule in evaluation order
    List(RulesListArgs),
    /// Load the catalogue in strict mode and report the first defect
    Check(RulesCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured rule directory
    #[arg(long)]
    pub(crate) rules_dir: Option<PathBuf>,
    /// Reject rule authoring mistakes instead of logging them
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rules {
            command: RulesCommand::List(args),
        } => run_rules_list(args),
        Command::Rules {
            command: RulesCommand::Check(args),
        } => run_rules_check(args),
        Command::Assess(args) => run_assess(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["cloud-advisor-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_rules_list_flags() {
        let cli = Cli::try_parse_from([
            "cloud-advisor-api",
            "rules",
            "list",
            "--rules-dir",
            "catalogue",
            "--strict",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Rules {
                command: RulesCommand::List(args),
            }) => {
                assert_eq!(args.rules_dir, Some(PathBuf::from("catalogue")));
                assert!(args.strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn assess_requires_an_input_file() {
        let err = Cli::try_parse_from(["cloud-advisor-api", "assess"]).expect_err("missing input");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
