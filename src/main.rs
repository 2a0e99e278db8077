use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use voxfix::app::{
    apply_overrides, load_backend, load_config, run_batch, run_eval, run_latency,
};
use voxfix::cli::{Cli, Commands, ConfigAction};
use voxfix::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);
    tracing::debug!(version = %voxfix::version_string(), "starting");

    match cli.command {
        Commands::Run {
            input,
            output,
            model,
            workers,
            skip_errors,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let config = apply_overrides(config, model.names, model.model, workers, skip_errors)?;
            let backend = load_backend(&config.reranker.model)?;
            let report = run_batch(&config, backend, &input, &output)?;
            if !cli.quiet {
                eprintln!(
                    "{} {} records to {} ({} malformed, {} failed)",
                    "Corrected".green(),
                    report.processed,
                    output.display(),
                    report.malformed,
                    report.failed
                );
            }
        }
        Commands::Eval { pred, gold, names } => {
            let config = load_config(cli.config.as_deref())?;
            let config = apply_overrides(config, names, None, None, false)?;
            let metrics = run_eval(&config, &pred, &gold)?;
            for (label, value) in metrics.entries() {
                println!("{label}: {value:.4}");
            }
        }
        Commands::Latency {
            input,
            model,
            runs,
            warmup,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let config = apply_overrides(config, model.names, model.model, None, false)?;
            let backend = load_backend(&config.reranker.model)?;
            let stats = run_latency(&config, backend, &input, runs, warmup)?;
            println!("{}", stats.summary_line());
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = load_config(cli.config.as_deref())?;
                print!("{}", config.to_toml()?);
            }
            ConfigAction::Path => {
                let path = cli.config.unwrap_or_else(Config::default_path);
                let status = if path.exists() {
                    "exists".green().to_string()
                } else {
                    "not found, using defaults".yellow().to_string()
                };
                println!("{} ({status})", path.display());
            }
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "voxfix", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-q`/`-v`.
fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
