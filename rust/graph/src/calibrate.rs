//! Search-parameter calibration: binary search a primary knob (search
//! window size / probe count) to the smallest value meeting a recall
//! target, timing candidates over several runs and keeping the fastest.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use vsearch_concurrency::ThreadPool;

use crate::error::GraphError;

const TIMED_RUNS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationContext {
    /// Full sweep over secondary knobs plus a binary search of the
    /// primary knob for each, done once up front against a training set.
    InitialTraining,
    /// A later re-tune against a held-out test set, restricted to
    /// accuracy-preserving adjustments of the current configuration.
    TestSetTuneUp,
}

#[derive(Clone, Copy, Debug)]
pub struct CalibrationTarget {
    pub k: usize,
    pub min_recall: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationOutcome {
    pub secondary_knob: usize,
    pub primary_knob: usize,
    pub recall: f64,
    pub latency: Duration,
}

/// Runs `trial` `TIMED_RUNS` times for a fixed knob setting and returns
/// its recall (assumed stable across runs for a fixed setting) alongside
/// the minimum observed latency.
fn measure(trial: &(impl Fn(usize, usize) -> f64 + Sync), secondary_knob: usize, primary_knob: usize) -> (f64, Duration) {
    let mut min_latency: Option<Duration> = None;
    let mut recall = 0.0;
    for _ in 0..TIMED_RUNS {
        let start = Instant::now();
        recall = trial(secondary_knob, primary_knob);
        let elapsed = start.elapsed();
        min_latency = Some(match min_latency {
            Some(prev) if prev <= elapsed => prev,
            _ => elapsed,
        });
    }
    (recall, min_latency.unwrap_or_default())
}

/// Smallest `primary_knob` in `[lo, hi]` whose measured recall is at
/// least `target`; returns `hi` if nothing in range reaches it.
fn binary_search_primary_knob(
    trial: &(impl Fn(usize, usize) -> f64 + Sync),
    secondary_knob: usize,
    lo: usize,
    hi: usize,
    target: f64,
) -> usize {
    let mut lo = lo;
    let mut hi = hi;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if trial(secondary_knob, mid) >= target {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Full calibration sweep over `0..secondary_knob_count` secondary-knob
/// settings, binary-searching the primary knob for each and keeping the
/// candidate with the lowest minimum latency across [`TIMED_RUNS`] timed
/// runs. Secondary-knob settings are independent of each other, so the
/// sweep runs them across `pool` rather than sequentially. Only valid in
/// [`CalibrationContext::InitialTraining`]; use [`tune_up`] for a
/// restricted re-tune against a test set.
pub fn calibrate(
    context: CalibrationContext,
    secondary_knob_count: usize,
    primary_lo: usize,
    primary_hi: usize,
    target: CalibrationTarget,
    trial: impl Fn(usize, usize) -> f64 + Sync,
    pool: &dyn ThreadPool,
) -> Result<CalibrationOutcome, GraphError> {
    if context != CalibrationContext::InitialTraining {
        return Err(GraphError::CalibrationContext(
            "full calibration sweep requires the initial-training context".to_string(),
        ));
    }
    if secondary_knob_count == 0 {
        return Err(GraphError::CalibrationContext(
            "calibration requires at least one secondary knob setting".to_string(),
        ));
    }

    let best: Mutex<Option<CalibrationOutcome>> = Mutex::new(None);
    pool.run(secondary_knob_count, &|partition| {
        for secondary_knob in partition.start..partition.end {
            let primary_knob =
                binary_search_primary_knob(&trial, secondary_knob, primary_lo, primary_hi, target.min_recall);
            let (recall, latency) = measure(&trial, secondary_knob, primary_knob);
            let candidate = CalibrationOutcome {
                secondary_knob,
                primary_knob,
                recall,
                latency,
            };
            let mut best = best.lock().expect("calibration best-result mutex is never poisoned");
            *best = Some(match best.take() {
                Some(current) if current.latency <= candidate.latency => current,
                _ => candidate,
            });
        }
    });

    Ok(best
        .into_inner()
        .expect("calibration best-result mutex is never poisoned")
        .expect("at least one secondary knob was evaluated"))
}

/// Restricted re-tune: binary searches only the primary knob for a fixed
/// secondary-knob setting, never widening the secondary-knob grid. The
/// only calibration path permitted in [`CalibrationContext::TestSetTuneUp`].
pub fn tune_up(
    primary_lo: usize,
    primary_hi: usize,
    secondary_knob: usize,
    target: CalibrationTarget,
    trial: impl Fn(usize, usize) -> f64 + Sync,
) -> CalibrationOutcome {
    let primary_knob = binary_search_primary_knob(&trial, secondary_knob, primary_lo, primary_hi, target.min_recall);
    let (recall, latency) = measure(&trial, secondary_knob, primary_knob);
    CalibrationOutcome {
        secondary_knob,
        primary_knob,
        recall,
        latency,
    }
}
