use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "testcrew",
    version,
    about = "TestCrew - generate, validate and run pytest suites for Python code",
    long_about = "TestCrew analyzes Python source, asks a language model for pytest tests, checks the result, runs it and writes a scored review."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (defaults to ./testcrew.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline on one or more source files
    #[command(about = "Generate, validate, execute and review tests for source files")]
    Run(RunArgs),

    /// Print the structural analysis of a source file
    #[command(about = "Extract functions and classes from a source file")]
    Analyze(AnalyzeArgs),

    /// Lint a test file the way generated candidates are checked
    #[command(about = "Check that a test file parses and defines tests")]
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Python source files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Number of files processed concurrently
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Generation attempts per file
    #[arg(long)]
    pub generation_attempts: Option<u32>,

    /// Test executions per file
    #[arg(long)]
    pub execution_attempts: Option<u32>,

    /// Seconds allowed for each test execution
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Output path prefix for test and review files
    #[arg(short, long)]
    pub out: Option<String>,

    /// Model name passed to the completion endpoint
    #[arg(short, long)]
    pub model: Option<String>,

    /// Skip the model-written review of executed tests
    #[arg(long)]
    pub no_narrative: bool,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Python source file
    pub file: PathBuf,

    /// Ask the model for a narrative summary instead of the structural one
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Test file to lint
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "testcrew", "-vv", "run", "a.py", "b.py", "--jobs", "4", "--no-narrative",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.jobs, 4);
                assert!(args.no_narrative);
                assert!(args.timeout.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_files() {
        assert!(Cli::try_parse_from(["testcrew", "run"]).is_err());
    }
}
