use crate::models::HistoricalSeries;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("cannot average an empty price series")]
    EmptySeries,
}

/// Arithmetic mean of every price in the series.
/// An empty series is an error rather than a NaN average.
/// Computed as a running mean (a plain sum of large prices overflows) and
/// clamped to the observed [min, max].
pub fn compute_average(series: &HistoricalSeries) -> Result<f64, SignalError> {
    if series.is_empty() {
        return Err(SignalError::EmptySeries);
    }

    let mut avg = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (i, price) in series.prices().enumerate() {
        avg += (price - avg) / (i + 1) as f64;
        min = min.min(price);
        max = max.max(price);
    }

    Ok(avg.max(min).min(max))
}
