use crate::storage::Sample;
use thiserror::Error;

/// Why no rate could be derived for an interval.
///
/// Callers skip the interval; neither case is rendered as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum UndefinedRate {
    #[error("no time elapsed between samples")]
    NoElapsedTime,
    #[error("counter went backwards (interface reset?)")]
    CounterRegressed,
}

/// Per-second rates of both counters of a sample pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rates {
    pub a: f64,
    pub b: f64,
}

/// Rates of change from `older` to `newer`.
pub fn rate(newer: &Sample, older: &Sample) -> Result<Rates, UndefinedRate> {
    if newer.timestamp <= older.timestamp {
        return Err(UndefinedRate::NoElapsedTime);
    }
    let elapsed = newer.timestamp.duration_since(older.timestamp).as_secs_f64();
    let a = counter_rate(newer.counter_a, older.counter_a, elapsed)?;
    let b = counter_rate(newer.counter_b, older.counter_b, elapsed)?;
    Ok(Rates { a, b })
}

fn counter_rate(newer: u64, older: u64, elapsed_secs: f64) -> Result<f64, UndefinedRate> {
    let delta = newer
        .checked_sub(older)
        .ok_or(UndefinedRate::CounterRegressed)?;
    Ok(delta as f64 / elapsed_secs)
}
