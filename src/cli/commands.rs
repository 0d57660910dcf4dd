use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::error::{PipelineError, Result};
use crate::qc::QcContext;
use crate::readers::{FeedReader, StationReader};
use crate::services::{
    DirectoryCoordinates, ForecastRequest, IngestionService, NoContext, PredictionService,
    StationFeed,
};
use crate::storage::{MemoryJobSink, MemoryStore, ObservationStore};
use crate::utils::progress::ProgressReporter;
use crate::validation::Validator;
use crate::writers::ParquetWriter;

pub async fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ingest {
            input_dir,
            stations_file,
            source,
            output_file,
            compression,
            max_workers,
        } => {
            println!("Ingesting feeds from {}", input_dir.display());

            let coordinates: Arc<dyn crate::services::CoordinateLookup> = match &stations_file {
                Some(path) => {
                    let stations = StationReader::new().read_stations_map(path)?;
                    let map: HashMap<String, (f64, f64)> = stations
                        .into_iter()
                        .map(|(id, s)| (id, (s.latitude, s.longitude)))
                        .collect();
                    Arc::new(DirectoryCoordinates(map))
                }
                None => Arc::new(NoContext),
            };

            let feed_paths: Vec<PathBuf> = std::fs::read_dir(&input_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("txt"))
                .collect();

            if feed_paths.is_empty() {
                println!("No feed files found");
                return Ok(());
            }

            let loading = ProgressReporter::bar(feed_paths.len() as u64, "Reading feed files...");
            let mut feeds = Vec::with_capacity(feed_paths.len());
            for path in &feed_paths {
                let station_id = FeedReader::extract_station_id_from_path(path)?;
                let text = std::fs::read_to_string(path)?;
                feeds.push(StationFeed { station_id, text });
                loading.inc(1);
            }
            loading.finish_with_message(&format!("Read {} feeds", feeds.len()));

            let progress =
                ProgressReporter::spinner(&format!("Processing {} stations...", feeds.len()));

            let store = Arc::new(MemoryStore::new());
            let jobs = Arc::new(MemoryJobSink::new());
            let service = IngestionService::new(
                store.clone(),
                jobs.clone(),
                coordinates,
                Arc::new(NoContext),
            )
            .with_max_workers(max_workers);

            let report = service.run_job(&source, &feeds, Utc::now())?;
            progress.finish_with_message(&format!(
                "Job {} finished: {:?}",
                report.job_id, report.status
            ));

            println!("\n=== Ingestion Report ===");
            println!("Stations processed: {}", report.stations_processed);
            println!("Rows ingested:      {}", report.rows_ingested);
            println!("Rows rejected:      {}", report.rows_failed);

            if let Some(output_file) = output_file {
                let epoch = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
                let mut all = Vec::new();
                for feed in &feeds {
                    let series = store.query(&feed.station_id, epoch, Utc::now())?;
                    all.extend(series);
                }

                println!("Writing {} observations to Parquet...", all.len());
                let writer = ParquetWriter::new().with_compression(&compression)?;
                if let Some(parent) = output_file.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                writer.write_observations(&all, &output_file)?;
                println!("Wrote {}", output_file.display());
            }
        }

        Commands::Validate {
            input,
            station_id,
            latitude,
            json,
        } => {
            let station_id = match station_id {
                Some(id) => id,
                None => FeedReader::extract_station_id_from_path(&input)?,
            };

            let reader = FeedReader::new().with_latitude(latitude);
            let observations = reader.read_feed_with_station_id(&input, &station_id)?;
            println!(
                "Parsed {} observations from {}",
                observations.len(),
                input.display()
            );

            let validator = Validator::new();
            let now = Utc::now();
            let mut valid = 0usize;
            let mut warned = 0usize;
            let mut rejected = 0usize;

            for (index, observation) in observations.iter().enumerate() {
                let context = QcContext {
                    latitude,
                    previous: (index > 0).then(|| observations[index - 1].clone()),
                    next: observations.get(index + 1).cloned(),
                    ..Default::default()
                };
                let report = validator.validate_observation(observation, &context, now);

                if json {
                    println!("{}", serde_json::to_string(&report)?);
                }

                if !report.is_valid {
                    rejected += 1;
                    if !json {
                        for error in &report.errors {
                            println!("  {} {}: {}", observation.time, error.field, error.message);
                        }
                    }
                } else if !report.warnings.is_empty() {
                    warned += 1;
                } else {
                    valid += 1;
                }
            }

            println!("\n=== Validation Report ===");
            println!("Valid:    {}", valid);
            println!("Warned:   {}", warned);
            println!("Rejected: {}", rejected);

            if rejected == 0 {
                println!("All observations passed validation");
            }
        }

        Commands::Forecast {
            input,
            station_id,
            horizon,
            model,
            base_time,
            no_uncertainty,
        } => {
            let station_id = match station_id {
                Some(id) => id,
                None => FeedReader::extract_station_id_from_path(&input)?,
            };

            let reader = FeedReader::new();
            let mut observations = reader.read_feed_with_station_id(&input, &station_id)?;
            observations.sort_by_key(|o| o.time);
            observations.retain(|o| !o.flag.is_rejected());

            let base_time: DateTime<Utc> = match base_time {
                Some(raw) => raw
                    .parse::<DateTime<Utc>>()
                    .map_err(|e| PipelineError::InvalidRequest(format!("bad base time: {}", e)))?,
                None => observations
                    .last()
                    .map(|o| o.time)
                    .ok_or_else(|| PipelineError::InsufficientHistory {
                        needed: 1,
                        available: 0,
                    })?,
            };

            let store = Arc::new(MemoryStore::new());
            store.insert_observations(observations)?;

            let registry = crate::forecast::ModelRegistry::with_default_models()?;
            let service = PredictionService::new(registry, store);

            let request = ForecastRequest {
                station_id: station_id.clone(),
                base_time,
                horizon_hours: horizon,
                model_type: model,
                include_uncertainty: !no_uncertainty,
            };
            let predictions = service.predict(&request)?;

            println!(
                "\nForecast for station {} from {} ({} hours, model {}):",
                station_id, base_time, horizon, predictions[0].model_id
            );
            println!("{:>5} {:>24} {:>8} {:>16} {:>6}", "hour", "target time", "sst", "95% interval", "skill");
            for prediction in &predictions {
                let interval = prediction
                    .uncertainty
                    .map(|u| format!("[{:6.2}, {:6.2}]", u.lower_95, u.upper_95))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>5} {:>24} {:>8.2} {:>16} {:>6.2}",
                    prediction.horizon_hours,
                    prediction.target_time.to_rfc3339(),
                    prediction.value,
                    interval,
                    prediction.skill
                );
            }
        }

        Commands::Stations { file } => {
            let stations = StationReader::new().read_stations(&file)?;
            println!("{} stations in {}", stations.len(), file.display());
            for station in &stations {
                println!(
                    "  {:>8}  {:<28} {:>8.3} {:>9.3}  {}",
                    station.id,
                    station.name,
                    station.latitude,
                    station.longitude,
                    station.provider.as_str()
                );
            }
        }
    }

    Ok(())
}
