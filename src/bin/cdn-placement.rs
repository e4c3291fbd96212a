//! cdn-placement CLI
//!
//! # Commands
//!
//! - `plan <DATASET>...`: allocate each dataset, write `<stem>.out`, print the score
//! - `score <DATASET> <SUBMISSION>`: validate and score an existing submission
//!
//! ```bash
//! cdn-placement plan data/me_at_the_zoo.in data/kittens.in --out-dir output
//! cdn-placement score data/me_at_the_zoo.in output/me_at_the_zoo.out
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cdn_placement::{
    load_dataset, load_submission, save_submission, score, AffinityOrder, Planner, PlannerConfig,
};

#[derive(Parser)]
#[command(name = "cdn-placement")]
#[command(version, about = "Static placement of videos onto edge caches")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate one or more datasets and write their submissions
    Plan(PlanArgs),
    /// Score an existing submission against its dataset
    Score {
        /// Dataset the submission was produced for
        dataset: PathBuf,
        /// Submission file
        submission: PathBuf,
    },
}

#[derive(Args)]
struct PlanArgs {
    /// Dataset files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving `<stem>.out` files
    #[arg(short, long, default_value = "output")]
    out_dir: PathBuf,

    /// TOML planner configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scan each endpoint's caches fastest first instead of slowest first
    #[arg(long)]
    fastest_first: bool,

    /// Override the dataset's uniform cache capacity
    #[arg(long)]
    capacity: Option<u64>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cdn_placement=info")),
        1 => EnvFilter::new("cdn_placement=debug"),
        _ => EnvFilter::new("cdn_placement=trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan(args) => run_plan(args),
        Commands::Score {
            dataset,
            submission,
        } => run_score(&dataset, &submission),
    }
}

fn planner_config(args: &PlanArgs) -> anyhow::Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };

    if args.fastest_first {
        config.affinity_order = AffinityOrder::FastestFirst;
    }
    if args.capacity.is_some() {
        config.capacity_override = args.capacity;
    }
    Ok(config)
}

fn output_path(out_dir: &Path, input: &Path) -> anyhow::Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("no file name in {}", input.display()))?;
    Ok(out_dir.join(format!("{}.out", stem.to_string_lossy())))
}

fn run_plan(args: PlanArgs) -> anyhow::Result<()> {
    let config = planner_config(&args)?;
    if config.affinity_order == AffinityOrder::FastestFirst {
        info!("scanning caches fastest first instead of the default slowest first");
    }
    let planner = Planner::new(config);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for input in &args.inputs {
        info!(path = %input.display(), "processing dataset");

        let mut catalog =
            load_dataset(input).with_context(|| format!("loading {}", input.display()))?;
        let plan = planner.run(&mut catalog);

        let out = output_path(&args.out_dir, input)?;
        save_submission(&plan.outcome.allocation, &out)
            .with_context(|| format!("writing {}", out.display()))?;

        println!(
            "{}: {} [{} caches, {} placements, {} unservable, {:.3}s]",
            input.display(),
            plan.report,
            plan.outcome.allocation.len(),
            plan.outcome.allocation.placement_count(),
            plan.outcome.unservable,
            plan.elapsed.as_secs_f64(),
        );
    }

    Ok(())
}

fn run_score(dataset: &Path, submission: &Path) -> anyhow::Result<()> {
    let catalog =
        load_dataset(dataset).with_context(|| format!("loading {}", dataset.display()))?;
    let allocation = load_submission(submission, &catalog)
        .with_context(|| format!("reading submission {}", submission.display()))?;

    let report = score(&catalog, &allocation);
    println!("{}: {}", submission.display(), report);

    Ok(())
}
