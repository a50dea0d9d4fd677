use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hopscope_analysis::EvaluationCheck;

use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PathArgs {
    #[arg(long, help = "Analysis unit whose call edges are queried")]
    pub unit: String,

    #[arg(long, help = "Source identifier fragment, e.g. Parser.parse")]
    pub src: String,

    #[arg(long, help = "Destination identifier fragment")]
    pub dst: String,

    #[arg(
        long,
        help = "Compile dot-free fragments as regular expressions (requires [query].allow_raw_patterns)"
    )]
    pub raw: bool,

    #[arg(long, help = "Follow calls caller -> callee only")]
    pub directed: bool,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ExistsArgs {
    #[arg(long, help = "Analysis unit whose call edges are queried")]
    pub unit: String,

    #[arg(
        long = "class",
        value_delimiter = ',',
        value_name = "CLASS",
        required = true,
        help = "Comma-separated class names"
    )]
    pub classes: Vec<String>,

    #[arg(
        long = "method",
        value_delimiter = ',',
        value_name = "METHOD",
        required = true,
        help = "Comma-separated method names"
    )]
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SummaryArgs {
    #[arg(long, help = "Analysis unit to summarize")]
    pub unit: String,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct EvaluateArgs {
    #[arg(long, help = "JSON file holding an array of evaluation cases")]
    pub cases: PathBuf,

    #[arg(
        long = "check",
        value_delimiter = ',',
        value_name = "CHECK",
        value_parser = parse_evaluation_check,
        help = "Checks to run (default: all): prediction_hops, entry_hops, entry_prediction_hops, patch_in_call_tree, prediction_consistency"
    )]
    pub checks: Vec<EvaluationCheck>,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Shortest hop distance between two identifier fragments
    Path(PathArgs),
    /// Check whether any class.method combination appears in a call tree
    Exists(ExistsArgs),
    /// Count records, edges, methods and classes of a call tree
    Summary(SummaryArgs),
    /// Run evaluation checks over a file of experiment cases
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Call-tree hop distance queries")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Workspace root holding .hopscope/"
    )]
    pub workspace: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = parse_log_format,
        help = "Log format: human or json"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_cli() -> Cli {
    let mut args: Vec<_> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == OsStr::new("--")) {
        args.remove(1);
    }

    Cli::parse_from(args)
}

fn parse_output_format(value: &str) -> Result<OutputFormat, String> {
    value.parse()
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse()
}

fn parse_evaluation_check(value: &str) -> Result<EvaluationCheck, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use hopscope_analysis::EvaluationCheck;

    use super::{Cli, Commands, LogFormat};
    use crate::output::OutputFormat;

    #[test]
    fn path_subcommand_parses_with_defaults() {
        let cli = Cli::try_parse_from([
            "hopscoped",
            "path",
            "--unit",
            "run-1",
            "--src",
            "ParserTest.testParse",
            "--dst",
            "Lexer.next",
        ])
        .expect("path should parse");

        assert_eq!(cli.workspace, PathBuf::from("."));
        assert_eq!(cli.log_format, LogFormat::Human);
        match cli.command {
            Commands::Path(args) => {
                assert_eq!(args.unit, "run-1");
                assert_eq!(args.src, "ParserTest.testParse");
                assert_eq!(args.dst, "Lexer.next");
                assert!(!args.raw);
                assert!(!args.directed);
                assert_eq!(args.output, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hopscoped",
            "path",
            "--unit",
            "run-1",
            "--src",
            "Lex.*",
            "--dst",
            "Ast",
            "--raw",
            "--directed",
            "--output",
            "json",
            "--workspace",
            "/tmp/ws",
            "--log-format",
            "json",
        ])
        .expect("path with flags should parse");

        assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
        assert_eq!(cli.log_format.as_str(), "json");
        match cli.command {
            Commands::Path(args) => {
                assert!(args.raw);
                assert!(args.directed);
                assert_eq!(args.output.as_str(), "json");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn exists_subcommand_splits_comma_lists() {
        let cli = Cli::try_parse_from([
            "hopscoped",
            "exists",
            "--unit",
            "run-1",
            "--class",
            "Parser,Lexer",
            "--method",
            "parse",
        ])
        .expect("exists should parse");

        match cli.command {
            Commands::Exists(args) => {
                assert_eq!(args.classes, vec!["Parser".to_owned(), "Lexer".to_owned()]);
                assert_eq!(args.methods, vec!["parse".to_owned()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn exists_requires_class_and_method() {
        let err = Cli::try_parse_from(["hopscoped", "exists", "--unit", "run-1"])
            .expect_err("missing lists should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn evaluate_subcommand_parses_checks() {
        let cli = Cli::try_parse_from([
            "hopscoped",
            "evaluate",
            "--cases",
            "cases.json",
            "--check",
            "entry_hops,patch_in_call_tree",
        ])
        .expect("evaluate should parse");

        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.cases, PathBuf::from("cases.json"));
                assert_eq!(
                    args.checks,
                    vec![EvaluationCheck::EntryHops, EvaluationCheck::PatchInCallTree]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_check_and_output_are_rejected() {
        assert!(
            Cli::try_parse_from(["hopscoped", "evaluate", "--cases", "c.json", "--check", "all"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["hopscoped", "summary", "--unit", "u", "--output", "csv"])
                .is_err()
        );
    }
}
