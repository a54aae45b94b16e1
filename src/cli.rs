use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use techlogistics::config::CleaningRules;
use techlogistics::pipeline::{
    ExecutiveSummary, SegmentFilter, SourcePaths, export_run, filter_segment, run_pipeline,
};
use techlogistics::processing::health_score;
use techlogistics::table::load_table;

#[derive(Parser)]
#[command(
    name = "techlogistics",
    about = "Clean and consolidate inventory, feedback and transaction extracts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the three extracts, consolidate them and print the executive summary
    Run {
        /// Directory holding the extracts under their default names
        #[arg(short, long, default_value = "data", env = "TECHLOGISTICS_DATA_DIR")]
        data_dir: PathBuf,

        /// Inventory extract. Overrides the file in the data directory.
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Feedback extract. Overrides the file in the data directory.
        #[arg(long)]
        feedback: Option<PathBuf>,

        /// Transaction extract. Overrides the file in the data directory.
        #[arg(long)]
        transactions: Option<PathBuf>,

        /// Path to a JSON rules file. Defaults to the built-in rules.
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Directory to export the cleaned tables, metrics and summary into
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        segment: SegmentArgs,
    },
    /// Print the health score of a single CSV file
    Score {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Print the built-in cleaning rules as JSON
    Rules {
        /// Write the rules to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Repeatable segment filters; an omitted dimension is not filtered.
#[derive(Args, Default)]
pub struct SegmentArgs {
    /// Keep only these warehouses
    #[arg(long = "warehouse")]
    pub warehouses: Vec<String>,

    /// Keep only these categories
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Keep only these destination cities
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// Keep only these sales channels
    #[arg(long = "channel")]
    pub channels: Vec<String>,
}

impl From<SegmentArgs> for SegmentFilter {
    fn from(args: SegmentArgs) -> Self {
        Self {
            warehouses: args.warehouses,
            categories: args.categories,
            cities: args.cities,
            channels: args.channels,
        }
    }
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            data_dir,
            inventory,
            feedback,
            transactions,
            rules,
            output,
            segment,
        } => {
            let mut paths = SourcePaths::in_dir(&data_dir);
            if let Some(path) = inventory {
                paths.inventory = path;
            }
            if let Some(path) = feedback {
                paths.feedback = path;
            }
            if let Some(path) = transactions {
                paths.transactions = path;
            }
            handle_run(
                &paths,
                rules.as_deref(),
                output.as_deref(),
                &segment.into(),
            )
        }
        Commands::Score { file } => handle_score(&file),
        Commands::Rules { output } => handle_rules(output.as_deref()),
    }
}

fn load_rules(path: Option<&Path>) -> Result<CleaningRules> {
    match path {
        Some(path) => {
            println!("Loading rules from {}...", path.display());
            CleaningRules::from_file(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))
        }
        None => Ok(CleaningRules::default()),
    }
}

fn handle_run(
    paths: &SourcePaths,
    rules: Option<&Path>,
    output: Option<&Path>,
    segment: &SegmentFilter,
) -> Result<()> {
    let rules = load_rules(rules)?;
    let mut result = run_pipeline(paths, &rules).context("Pipeline run failed")?;
    println!("{}", result.summary());

    let view = if segment.is_empty() {
        result.consolidated.clone()
    } else {
        let view = filter_segment(&result.consolidated, segment, &rules)?;
        println!(
            "Segment keeps {} of {} transactions",
            view.height(),
            result.consolidated.height()
        );
        view
    };
    println!();
    print!("{}", ExecutiveSummary::from_table(&view, &rules)?);

    if let Some(dir) = output {
        let files = export_run(&mut result, dir, &rules)?;
        println!();
        println!("Consolidated table written to {}", files.consolidated.display());
        println!("Quality metrics written to {}", files.metrics.display());
    }
    Ok(())
}

fn handle_score(file: &Path) -> Result<()> {
    let df = load_table(file)?;
    let score = health_score(&df);
    println!(
        "{}: health {:.2} (nulls {:.2}%, duplicates {:.2}%)",
        file.display(),
        score.score,
        score.null_pct,
        score.dup_pct
    );
    Ok(())
}

fn handle_rules(output: Option<&Path>) -> Result<()> {
    let json = CleaningRules::default().to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Rules written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
