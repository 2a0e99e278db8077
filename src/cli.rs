//! Command-line interface for voxfix
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Post-ASR transcript correction
#[derive(Parser, Debug)]
#[command(name = "voxfix", version, about = "Post-ASR transcript correction")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug incl. candidate scores)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options shared by commands that load the lexicon and the model.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Name lexicon, one name per line (default: lexicon.path from config)
    #[arg(long, value_name = "FILE")]
    pub names: Option<PathBuf>,

    /// Masked LM: HuggingFace repo id or local directory
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correct a JSONL file of {"id", "text"} records
    Run {
        /// Input JSONL file
        #[arg(long, short = 'i', value_name = "FILE")]
        input: PathBuf,

        /// Output JSONL file (parent directories are created)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Number of worker threads (default: batch.workers from config)
        #[arg(long, short = 'j', value_name = "N")]
        workers: Option<usize>,

        /// Drop records whose scoring fails instead of aborting
        #[arg(long)]
        skip_errors: bool,
    },

    /// Score predictions against gold references
    Eval {
        /// Predicted JSONL file
        #[arg(long, value_name = "FILE")]
        pred: PathBuf,

        /// Gold JSONL file (same length and order)
        #[arg(long, value_name = "FILE")]
        gold: PathBuf,

        /// Name lexicon (default: lexicon.path from config)
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,
    },

    /// Measure per-utterance latency (p50/p95)
    Latency {
        /// Input JSONL file; the first 50 texts are used
        #[arg(long, short = 'i', value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Number of timed runs
        #[arg(long, value_name = "N", default_value_t = crate::defaults::LATENCY_RUNS)]
        runs: usize,

        /// Number of untimed warmup runs
        #[arg(long, value_name = "N", default_value_t = crate::defaults::LATENCY_WARMUP)]
        warmup: usize,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "voxfix",
            "run",
            "--input",
            "in.jsonl",
            "--output",
            "out/corrected.jsonl",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                input,
                output,
                model,
                workers,
                skip_errors,
            } => {
                assert_eq!(input, PathBuf::from("in.jsonl"));
                assert_eq!(output, PathBuf::from("out/corrected.jsonl"));
                assert!(model.names.is_none());
                assert!(model.model.is_none());
                assert!(workers.is_none());
                assert!(!skip_errors);
            }
            _ => panic!("Expected Run command"),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_run_with_options() {
        let cli = Cli::try_parse_from([
            "voxfix",
            "run",
            "-i",
            "in.jsonl",
            "-o",
            "out.jsonl",
            "--names",
            "names.txt",
            "--model",
            "./models/bert",
            "-j",
            "4",
            "--skip-errors",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                model,
                workers,
                skip_errors,
                ..
            } => {
                assert_eq!(model.names, Some(PathBuf::from("names.txt")));
                assert_eq!(model.model.as_deref(), Some("./models/bert"));
                assert_eq!(workers, Some(4));
                assert!(skip_errors);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_requires_input_and_output() {
        assert!(Cli::try_parse_from(["voxfix", "run", "--input", "in.jsonl"]).is_err());
    }

    #[test]
    fn test_parse_eval_command() {
        let cli = Cli::try_parse_from([
            "voxfix", "eval", "--pred", "p.jsonl", "--gold", "g.jsonl",
        ])
        .unwrap();
        match cli.command {
            Commands::Eval { pred, gold, names } => {
                assert_eq!(pred, PathBuf::from("p.jsonl"));
                assert_eq!(gold, PathBuf::from("g.jsonl"));
                assert!(names.is_none());
            }
            _ => panic!("Expected Eval command"),
        }
    }

    #[test]
    fn test_parse_latency_defaults() {
        let cli = Cli::try_parse_from(["voxfix", "latency", "--input", "in.jsonl"]).unwrap();
        match cli.command {
            Commands::Latency { runs, warmup, .. } => {
                assert_eq!(runs, 100);
                assert_eq!(warmup, 10);
            }
            _ => panic!("Expected Latency command"),
        }
    }

    #[test]
    fn test_parse_verbose_and_quiet_are_global() {
        let cli = Cli::try_parse_from(["voxfix", "config", "show", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["voxfix", "-q", "config", "path"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_config_with_custom_path() {
        let cli =
            Cli::try_parse_from(["voxfix", "--config", "/tmp/voxfix.toml", "config", "show"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/voxfix.toml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["voxfix", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["voxfix"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
