use crate::error::{PipelineError, Result};
use crate::models::Observation;
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Writes validated observations to a Parquet file.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(PipelineError::InvalidRequest(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write observations to a Parquet file.
    pub fn write_observations(&self, observations: &[Observation], path: &Path) -> Result<()> {
        if observations.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in observations.chunks(self.row_group_size) {
            let batch = self.observations_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Arrow schema for the observation export.
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new("station_id", DataType::Utf8, false),
            Field::new(
                "time",
                DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
                false,
            ),
            Field::new("sea_surface_temperature", DataType::Float64, true),
            Field::new("air_temperature", DataType::Float64, true),
            Field::new("pressure", DataType::Float64, true),
            Field::new("wind_speed", DataType::Float64, true),
            Field::new("wind_direction", DataType::Float64, true),
            Field::new("wave_height", DataType::Float64, true),
            Field::new("wave_period", DataType::Float64, true),
            Field::new("salinity", DataType::Float64, true),
            Field::new("quality_flag", DataType::UInt8, false),
            Field::new("source", DataType::Utf8, true),
            Field::new("anomaly", DataType::Float64, true),
        ];

        Arc::new(Schema::new(fields))
    }

    fn observations_to_batch(
        &self,
        observations: &[Observation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let station_ids: Vec<&str> = observations.iter().map(|o| o.station_id.as_str()).collect();
        let times: Vec<i64> = observations.iter().map(|o| o.time.timestamp()).collect();
        let flags: Vec<u8> = observations.iter().map(|o| o.flag.as_u8()).collect();
        let sources: Vec<Option<&str>> =
            observations.iter().map(|o| o.source.as_deref()).collect();

        let optional = |extract: fn(&Observation) -> Option<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(
                observations.iter().map(extract).collect::<Vec<_>>(),
            ))
        };

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(station_ids)),
                Arc::new(TimestampSecondArray::from(times).with_timezone("UTC")),
                optional(|o| o.sea_surface_temperature),
                optional(|o| o.air_temperature),
                optional(|o| o.pressure),
                optional(|o| o.wind_speed),
                optional(|o| o.wind_direction),
                optional(|o| o.wave_height),
                optional(|o| o.wave_period),
                optional(|o| o.salinity),
                Arc::new(UInt8Array::from(flags)),
                Arc::new(StringArray::from(sources)),
                optional(|o| o.anomaly),
            ],
        )?;

        Ok(batch)
    }

    /// Row count of a written file, for post-export reporting.
    pub fn count_rows(&self, path: &Path) -> Result<usize> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut rows = 0;
        for batch in reader {
            rows += batch?.num_rows();
        }
        Ok(rows)
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualityFlag;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn observation(hour: u32, sst: Option<f64>) -> Observation {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        let mut obs = Observation::new("41001".to_string(), time);
        obs.sea_surface_temperature = sst;
        obs.flag = QualityFlag::Good;
        obs.source = Some("NDBC".to_string());
        obs
    }

    #[test]
    fn test_write_and_count() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("observations.parquet");

        let observations = vec![
            observation(0, Some(18.5)),
            observation(1, Some(18.7)),
            observation(2, None),
        ];

        let writer = ParquetWriter::new();
        writer.write_observations(&observations, &path)?;

        assert_eq!(writer.count_rows(&path)?, 3);

        Ok(())
    }

    #[test]
    fn test_empty_write_is_noop() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.parquet");

        ParquetWriter::new().write_observations(&[], &path)?;
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_unsupported_compression() {
        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        assert!(ParquetWriter::new().with_compression("zstd").is_ok());
    }
}
