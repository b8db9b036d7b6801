//! Latency extraction from check records.

use crate::core::CheckRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static LATENCY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9]+\.?[0-9]*)ms\]").expect("Valid latency marker pattern"));

/// Latency of a record in milliseconds, or `0.0` when unknown.
///
/// The structured `latency_ms` field wins when it is positive. Otherwise
/// the first `[<number>ms]` marker in the message is used. A result of
/// `0.0` means "no data" and must be left out of averages.
#[inline]
pub fn resolve_latency(record: &CheckRecord) -> f64 {
    if let Some(latency) = record.latency_ms {
        if latency > 0.0 {
            return latency;
        }
    }

    LATENCY_MARKER
        .captures(&record.message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Mean of the usable latencies of `records`, if any.
pub fn mean_latency<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a CheckRecord>,
{
    let (sum, count) = records
        .into_iter()
        .map(resolve_latency)
        .filter(|latency| *latency > 0.0)
        .fold((0.0, 0usize), |(sum, count), latency| (sum + latency, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Format an optional latency with `decimals` places, `--` when absent.
///
/// Ties round away from zero, so `10.25` prints as `10.3ms`.
pub fn format_latency(latency: Option<f64>, decimals: usize) -> String {
    match latency {
        Some(ms) => {
            let scale = 10f64.powi(decimals as i32);
            format!("{:.*}ms", decimals, (ms * scale).round() / scale)
        },
        None => "--".to_string(),
    }
}
