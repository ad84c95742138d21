use std::sync::Arc;

use parking_lot::RwLock;

use crate::bucketer::{BucketRange, Bucketer};

/// A single bucket and its observed count in a [`Snapshot`] breakdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketCount {
    /// The bucket these observations landed in.
    pub range: BucketRange,
    /// The number of observations in the bucket.
    pub count: u64,
}

/// An atomically captured summary of a [`Distribution`].
///
/// An empty distribution snapshots with every field zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The smallest observed value.
    pub min: f64,
    /// The largest observed value.
    pub max: f64,
    /// The mean of the observed values.
    pub average: f64,
    /// The interpolated median of the observed values.
    pub median: f64,
    /// The total number of observations.
    pub count: u64,
    /// Per-bucket observation counts, in bucket order.
    pub breakdown: Vec<BucketCount>,
}

#[derive(Debug)]
struct State {
    counts: Vec<u64>,
    sum: f64,
    min: f64,
    max: f64,
    count: u64,
}

/// A concurrent, bucketed accumulator of floating-point observations.
///
/// A distribution counts observations into the buckets described by its
/// [`Bucketer`] and tracks the running sum, minimum, and maximum. [`add`] may
/// be called freely from many threads; [`snapshot`] captures a consistent
/// view of everything recorded so far.
///
/// [`add`]: Distribution::add
/// [`snapshot`]: Distribution::snapshot
#[derive(Debug)]
pub struct Distribution {
    ranges: Arc<[BucketRange]>,
    state: RwLock<State>,
}

impl Distribution {
    /// Creates a distribution that buckets observations with `bucketer`.
    pub fn new(bucketer: &Bucketer) -> Distribution {
        let ranges = bucketer.shared_ranges();
        let counts = vec![0; ranges.len()];
        Distribution {
            ranges,
            state: RwLock::new(State { counts, sum: 0.0, min: 0.0, max: 0.0, count: 0 }),
        }
    }

    /// Records a single observation.
    pub fn add(&self, value: f64) {
        // The bucket lookup only touches the immutable ranges, so it stays
        // outside the lock.
        let idx = self.bucket_index(value);
        let mut state = self.state.write();
        state.counts[idx] += 1;
        state.sum += value;
        if state.count == 0 {
            state.min = value;
            state.max = value;
        } else if value < state.min {
            state.min = value;
        } else if value > state.max {
            state.max = value;
        }
        state.count += 1;
    }

    /// Captures the current aggregates and per-bucket counts.
    pub fn snapshot(&self) -> Snapshot {
        let mut breakdown: Vec<BucketCount> =
            self.ranges.iter().map(|range| BucketCount { range: *range, count: 0 }).collect();
        let state = self.state.read();
        for (piece, count) in breakdown.iter_mut().zip(&state.counts) {
            piece.count = *count;
        }
        if state.count == 0 {
            return Snapshot { min: 0.0, max: 0.0, average: 0.0, median: 0.0, count: 0, breakdown };
        }
        Snapshot {
            min: state.min,
            max: state.max,
            average: state.sum / state.count as f64,
            median: self.median(&state),
            count: state.count,
            breakdown,
        }
    }

    /// The first bucket whose upper endpoint exceeds `value`, or the last
    /// bucket when none does.
    fn bucket_index(&self, value: f64) -> usize {
        let cuts = self.ranges.len() - 1;
        self.ranges[..cuts].partition_point(|range| range.end() <= value)
    }

    fn median(&self, state: &State) -> f64 {
        if state.count == 1 {
            return state.min;
        }
        let middle = (state.count - 1) as f64 / 2.0;
        let (idx, frac) = locate_rank(&state.counts, middle);
        let last = self.ranges.len() - 1;
        // Clamp the bucket endpoints against the observed extremes so the
        // median stays inside [min, max] even when every observation fell
        // into an unbounded edge bucket.
        let (low, high) = if idx == 0 {
            (state.min, self.ranges[0].end().min(state.max))
        } else if idx == last {
            (self.ranges[last].start().max(state.min), state.max)
        } else {
            (self.ranges[idx].start().max(state.min), self.ranges[idx].end().min(state.max))
        };
        interpolate(low, high, frac)
    }
}

/// Finds the bucket holding the fractional rank `rank` and the rank's
/// position within it.
///
/// The first sample of a bucket sits half a step past the bucket's
/// cumulative start, so ranks are measured against cumulative counts shifted
/// by -0.5.
fn locate_rank(counts: &[u64], rank: f64) -> (usize, f64) {
    let mut idx = 0;
    let mut start = -0.5;
    while rank - start >= counts[idx] as f64 {
        start += counts[idx] as f64;
        idx += 1;
    }
    (idx, (rank - start) / counts[idx] as f64)
}

fn interpolate(low: f64, high: f64, frac: f64) -> f64 {
    (1.0 - frac) * low + frac * high
}
