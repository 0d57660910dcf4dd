pub mod checks;
pub mod limits;

pub use checks::{
    climatology_test, range_test, rate_of_change_test, spatial_consistency_test, spike_test,
};
pub use limits::{limits_for, range_bounds, QcLimits};

use crate::models::{Observation, Parameter, QcResult, QualityFlag};

/// Long-term mean and variability of a parameter at a location/season.
#[derive(Debug, Clone, Copy)]
pub struct Climatology {
    pub mean: f64,
    pub std_dev: f64,
}

/// Context the quality suite draws on. Every field is optional: tests whose
/// context is absent are skipped, not failed.
#[derive(Debug, Clone, Default)]
pub struct QcContext {
    pub latitude: Option<f64>,
    pub previous: Option<Observation>,
    pub next: Option<Observation>,
    /// Nearby-station values for the same time, keyed by parameter.
    pub neighbor_values: Vec<(Parameter, Vec<f64>)>,
    pub climatology: Option<Climatology>,
}

impl QcContext {
    fn neighbors_for(&self, parameter: Parameter) -> &[f64] {
        self.neighbor_values
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }
}

/// Outcome of running the full quality suite over one observation.
#[derive(Debug, Clone)]
pub struct QcOutcome {
    pub flag: QualityFlag,
    pub results: Vec<QcResult>,
}

/// Run every applicable quality test against each parameter present on the
/// observation. The overall flag is the numeric maximum across executed
/// tests; skipped tests stay in the detail list but never win the max.
pub fn run_suite(observation: &Observation, context: &QcContext) -> QcOutcome {
    let mut results = Vec::new();

    for parameter in observation.present_parameters() {
        let Some(value) = observation.value(parameter) else {
            continue;
        };

        results.push(range_test(parameter, Some(value), context.latitude));

        results.push(spike_test(
            parameter,
            value,
            context.previous.as_ref().and_then(|o| o.value(parameter)),
            context.next.as_ref().and_then(|o| o.value(parameter)),
        ));

        results.push(rate_of_change_test(
            parameter,
            value,
            observation.time,
            context
                .previous
                .as_ref()
                .and_then(|o| o.value(parameter).map(|v| (v, o.time))),
        ));

        // Climatology applies to the primary temperature series only.
        if parameter == Parameter::SeaSurfaceTemperature {
            if let Some(clim) = context.climatology {
                results.push(climatology_test(parameter, value, clim.mean, clim.std_dev));
            }
        }

        let neighbors = context.neighbors_for(parameter);
        if !neighbors.is_empty() {
            results.push(spatial_consistency_test(parameter, value, neighbors));
        }
    }

    let flag = results
        .iter()
        .filter(|r| r.executed())
        .fold(QualityFlag::NotEvaluated, |acc, r| acc.max(r.flag));

    QcOutcome { flag, results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn obs_with_sst(hour: u32, sst: f64) -> Observation {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        let mut obs = Observation::new("41001".to_string(), time);
        obs.sea_surface_temperature = Some(sst);
        obs
    }

    #[test]
    fn test_suite_without_context_runs_range_only() {
        let obs = obs_with_sst(12, 18.0);
        let outcome = run_suite(&obs, &QcContext::default());

        assert_eq!(outcome.flag, QualityFlag::Good);
        let executed: Vec<_> = outcome.results.iter().filter(|r| r.executed()).collect();
        assert_eq!(executed.len(), 1);
    }

    #[test]
    fn test_suite_takes_worst_flag() {
        let obs = obs_with_sst(12, 22.0);
        let context = QcContext {
            previous: Some(obs_with_sst(11, 10.0)),
            next: Some(obs_with_sst(13, 10.0)),
            ..Default::default()
        };

        // Range passes but the 12° spike escalates to Bad
        let outcome = run_suite(&obs, &context);
        assert_eq!(outcome.flag, QualityFlag::Bad);
    }

    #[test]
    fn test_suite_is_deterministic() {
        let obs = obs_with_sst(12, 22.0);
        let context = QcContext {
            latitude: Some(40.0),
            previous: Some(obs_with_sst(11, 18.0)),
            next: Some(obs_with_sst(13, 19.0)),
            climatology: Some(Climatology {
                mean: 17.0,
                std_dev: 2.0,
            }),
            ..Default::default()
        };

        let first = run_suite(&obs, &context);
        let second = run_suite(&obs, &context);

        assert_eq!(first.flag, second.flag);
        assert_eq!(first.results.len(), second.results.len());
        for (a, b) in first.results.iter().zip(second.results.iter()) {
            assert_eq!(a.flag, b.flag);
            assert_eq!(a.message, b.message);
        }
    }
}
