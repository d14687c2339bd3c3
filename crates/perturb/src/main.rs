use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use perturb::models::{self, MODELS};
use perturb::report::summarize;
use perturb::util::io::atomic_write;
use perturb::{StudyFile, init_logging};
use perturb_core::RunModel;

#[derive(Parser, Debug)]
#[command(name = "perturb")]
#[command(about = "Run a model under sampled parameter perturbations")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a YAML study and write the aggregated data as JSON
    Run {
        /// Path to the study file
        study: PathBuf,

        /// Output file (default: <study>.data.json)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Worker pool size, overrides the study file
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// List the built-in models
    Models,
}

fn run_study(
    study_path: PathBuf,
    out: Option<PathBuf>,
    workers: Option<usize>,
) -> color_eyre::Result<()> {
    let mut study = StudyFile::load(&study_path)?;
    if workers.is_some() {
        study.run.workers = workers;
    }

    let builtin = models::builtin(&study.model)
        .ok_or_else(|| eyre!("unknown model {}, see `perturb models`", study.model))?;

    let mut parameters = builtin.parameters;
    study.apply_values(&mut parameters)?;
    let uncertain = study.uncertain_names()?;
    let nodes = study.sample_nodes(&uncertain)?;

    tracing::info!(
        model = %study.model,
        samples = study.samples,
        uncertain = ?uncertain,
        "Starting study"
    );

    let runner = RunModel::from_shared(builtin.model, parameters)
        .with_features(builtin.features)
        .with_config(study.run.clone());
    let data = runner.run(&nodes, uncertain)?;

    let out = out.unwrap_or_else(|| study_path.with_extension("data.json"));
    atomic_write(&out, &data.to_json()?)
        .wrap_err_with(|| format!("failed to write {}", out.display()))?;

    tracing::info!(path = %out.display(), "Wrote data");
    print!("{}", summarize(&data));
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    match args.command {
        Command::Run {
            study,
            out,
            workers,
        } => run_study(study, out, workers)?,
        Command::Models => {
            for (name, description) in MODELS {
                println!("{name:<24} {description}");
            }
        }
    }

    Ok(())
}
