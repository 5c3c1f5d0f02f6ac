use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crowding_core::types::{SortMode, TimeWindow};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_TIDY: &str = "data/subway_crowding_tidy.parquet";

#[derive(Parser, Debug)]
#[command(author, version, about = "Subway crowding pipeline and query CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch pipeline: parse a raw export, validate it, write tidy artifacts
    Pipeline {
        /// Raw wide-format CSV export
        #[arg(long)]
        input: PathBuf,
        /// Directory the tidy CSV, parquet, and quality report land in
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Recompute and print the quality report for a tidy artifact
    Report {
        #[arg(long, default_value = DEFAULT_TIDY)]
        tidy: PathBuf,
    },
    /// Station-by-time heatmap pivot for one day type, line, and direction
    Heatmap {
        #[arg(long, default_value = DEFAULT_TIDY)]
        tidy: PathBuf,
        #[arg(long)]
        day_type: String,
        #[arg(long)]
        line: String,
        #[arg(long)]
        direction: String,
        /// avg_desc, name_asc, or code_asc
        #[arg(long, default_value = "avg_desc")]
        sort: SortMode,
    },
    /// Most crowded stations over a rush-hour window
    Rank {
        #[arg(long, default_value = DEFAULT_TIDY)]
        tidy: PathBuf,
        #[arg(long)]
        day_type: String,
        #[arg(long)]
        line: Option<String>,
        #[arg(long)]
        direction: Option<String>,
        /// morning, evening, or all_day
        #[arg(long, default_value = "morning")]
        window: TimeWindow,
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(5..=20))]
        top_n: u32,
    },
    /// Scalar summary figures for one day type, line, and direction
    Kpi {
        #[arg(long, default_value = DEFAULT_TIDY)]
        tidy: PathBuf,
        #[arg(long)]
        day_type: String,
        #[arg(long)]
        line: String,
        #[arg(long)]
        direction: String,
    },
    /// Chronological crowding profile for a single station
    Detail {
        #[arg(long, default_value = DEFAULT_TIDY)]
        tidy: PathBuf,
        #[arg(long)]
        day_type: String,
        #[arg(long)]
        line: String,
        #[arg(long)]
        station: String,
        #[arg(long)]
        direction: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pipeline { input, out_dir } => commands::pipeline::run(&input, &out_dir),
        Command::Report { tidy } => commands::query::report(&tidy),
        Command::Heatmap {
            tidy,
            day_type,
            line,
            direction,
            sort,
        } => commands::query::heatmap(&tidy, &day_type, &line, &direction, sort),
        Command::Rank {
            tidy,
            day_type,
            line,
            direction,
            window,
            top_n,
        } => commands::query::rank(
            &tidy,
            &day_type,
            line.as_deref(),
            direction.as_deref(),
            window,
            top_n as usize,
        ),
        Command::Kpi {
            tidy,
            day_type,
            line,
            direction,
        } => commands::query::kpi(&tidy, &day_type, &line, &direction),
        Command::Detail {
            tidy,
            day_type,
            line,
            station,
            direction,
        } => commands::query::detail(&tidy, &day_type, &line, &station, &direction),
    }
}
