use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buoy-pipeline")]
#[command(about = "Quality-controlled buoy observation ingestion and forecasting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest raw feed files through the QC pipeline
    Ingest {
        #[arg(short, long, help = "Directory of <station>.txt feed files")]
        input_dir: PathBuf,

        #[arg(short, long, help = "CSV station directory for coordinates")]
        stations_file: Option<PathBuf>,

        #[arg(long, default_value = "ndbc", help = "Job source label")]
        source: String,

        #[arg(
            short,
            long,
            help = "Export validated observations to this Parquet file"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Validate a single feed file without storing anything
    Validate {
        #[arg(short, long, help = "Feed file (<station>.txt)")]
        input: PathBuf,

        #[arg(short, long, help = "Station ID override")]
        station_id: Option<String>,

        #[arg(long, help = "Station latitude for range/plausibility checks")]
        latitude: Option<f64>,

        #[arg(long, help = "Emit per-observation reports as JSON lines")]
        json: bool,
    },

    /// Forecast sea-surface temperature from a historical feed file
    Forecast {
        #[arg(short, long, help = "Historical feed file (<station>.txt)")]
        input: PathBuf,

        #[arg(short, long, help = "Station ID override")]
        station_id: Option<String>,

        #[arg(long, default_value = "24", help = "Forecast horizon in hours (1-336)")]
        horizon: u32,

        #[arg(short, long, help = "Model ID (default: selected by horizon)")]
        model: Option<String>,

        #[arg(long, help = "Base time (RFC 3339, default: last observation)")]
        base_time: Option<String>,

        #[arg(long, help = "Omit uncertainty bounds")]
        no_uncertainty: bool,
    },

    /// List a CSV station directory
    Stations {
        #[arg(short, long)]
        file: PathBuf,
    },
}
