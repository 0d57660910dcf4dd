use buoy_pipeline::features::{FeatureConfig, FeatureSet};
use buoy_pipeline::forecast::{AutoregressiveModel, Forecaster};
use buoy_pipeline::models::Observation;
use buoy_pipeline::qc::{run_suite, QcContext};
use buoy_pipeline::readers::FeedReader;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const HEADER: &str = "#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE\n#yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft\n";

fn synthetic_feed(days: u32) -> String {
    let mut text = HEADER.to_string();
    for day in 1..=days {
        for hour in 0..24 {
            let sst = 18.0 + ((hour as f64 - 6.0) / 24.0 * std::f64::consts::TAU).sin() * 0.6;
            text.push_str(&format!(
                "2024 05 {:02} {:02} 00 230  7.2  9.1   1.2     8   6.4 240 1015.2  19.1  {:.1}  15.0 99.0 -1.1 99.00\n",
                day, hour, sst
            ));
        }
    }
    text
}

fn bench_feed_parsing(c: &mut Criterion) {
    let reader = FeedReader::new();
    let text = synthetic_feed(28);

    c.bench_function("parse_feed_28_days", |b| {
        b.iter(|| reader.parse_feed(black_box("41001"), black_box(&text)))
    });
}

fn bench_qc_suite(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let observations: Vec<Observation> = (0..24)
        .map(|i| {
            let mut obs = Observation::new("41001".to_string(), start + Duration::hours(i));
            obs.sea_surface_temperature = Some(18.0 + (i as f64 * 0.3).sin());
            obs.air_temperature = Some(19.0);
            obs.pressure = Some(1015.0);
            obs
        })
        .collect();

    c.bench_function("qc_suite_24_observations", |b| {
        b.iter(|| {
            for index in 0..observations.len() {
                let context = QcContext {
                    latitude: Some(34.7),
                    previous: (index > 0).then(|| observations[index - 1].clone()),
                    next: observations.get(index + 1).cloned(),
                    ..Default::default()
                };
                black_box(run_suite(&observations[index], &context));
            }
        })
    });
}

fn bench_feature_extraction(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let series: Vec<(chrono::DateTime<Utc>, f64)> = (0..336)
        .map(|i| (start + Duration::hours(i), 18.0 + (i as f64 * 0.1).sin()))
        .collect();
    let as_of = series.last().unwrap().0;
    let config = FeatureConfig::default();

    c.bench_function("feature_extraction_336h", |b| {
        b.iter(|| FeatureSet::extract(black_box(&series), as_of, &config))
    });
}

fn bench_forecast(c: &mut Criterion) {
    let series: Vec<f64> = (0..336).map(|i| 18.0 + (i as f64 * 0.1).sin()).collect();
    let model = AutoregressiveModel::new(3, 1, 1);

    c.bench_function("ar_forecast_168h", |b| {
        b.iter(|| model.forecast(black_box(&series), 168).unwrap())
    });
}

criterion_group!(
    benches,
    bench_feed_parsing,
    bench_qc_suite,
    bench_feature_extraction,
    bench_forecast
);
criterion_main!(benches);
