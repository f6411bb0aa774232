// Per-place series selection, linear trend forecast and congestion check.
use crate::config::TimestampOrder;
use crate::types::{ForecastResult, Observation};
use crate::util::{average, parse_datetime_safe};
use std::cmp::Ordering;

/// Observations of `place` (exact, case-sensitive match) in ascending time order.
///
/// An unknown place gives an empty series. The sort is stable, so equal
/// timestamps keep their input order.
pub fn select_series(data: &[Observation], place: &str, order: TimestampOrder) -> Vec<Observation> {
    let mut series: Vec<Observation> = data.iter().filter(|o| o.place == place).cloned().collect();
    match order {
        TimestampOrder::Lexical => series.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        TimestampOrder::Parsed => {
            // Parse once per point; unparseable timestamps go last.
            let mut keyed: Vec<_> = series
                .into_iter()
                .map(|o| (parse_datetime_safe(&o.timestamp), o))
                .collect();
            keyed.sort_by(|(ka, a), (kb, b)| match (ka, kb) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.timestamp.cmp(&b.timestamp),
            });
            series = keyed.into_iter().map(|(_, o)| o).collect();
        }
    }
    series
}

/// The last `window` points of a series (all of them if it is shorter).
pub fn recent_window(series: &[Observation], window: usize) -> &[Observation] {
    &series[series.len().saturating_sub(window)..]
}

/// Ordinary least squares over `(index, value)` pairs, extrapolated `count`
/// steps past the last sample.
///
/// Fewer than two samples give no predictions rather than a flat line.
pub fn linear_forecast(samples: &[f64], count: usize) -> Vec<f64> {
    if samples.len() < 2 {
        return Vec::new();
    }
    let n = samples.len();
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = average(samples);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in samples.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    let slope = if denominator == 0.0 { 0.0 } else { numerator / denominator };
    let intercept = y_mean - slope * x_mean;

    (n..n + count).map(|i| slope * i as f64 + intercept).collect()
}

/// True when any prediction is strictly above `threshold`. Empty input is never congested.
pub fn is_congested(predictions: &[f64], threshold: f64) -> bool {
    predictions.iter().any(|p| *p > threshold)
}

/// Forecast `horizon` intervals from the last `window` points of an ordered series.
pub fn forecast_series(series: &[Observation], window: usize, horizon: usize, threshold: f64) -> ForecastResult {
    let samples: Vec<f64> = recent_window(series, window).iter().map(|o| o.crowd_count).collect();
    let predictions = linear_forecast(&samples, horizon);
    let congested = is_congested(&predictions, threshold);
    ForecastResult { predictions, congested }
}
