use std::sync::Arc;

use once_cell::sync::Lazy;

/// Bucket boundaries at the powers of two: 20 buckets starting at 1.0.
pub static POWERS_OF_TWO: Lazy<Bucketer> = Lazy::new(|| Bucketer::exponential(20, 1.0, 2.0));

/// Bucket boundaries at the powers of four: 11 buckets starting at 1.0.
pub static POWERS_OF_FOUR: Lazy<Bucketer> = Lazy::new(|| Bucketer::exponential(11, 1.0, 4.0));

/// Bucket boundaries at the powers of ten: 7 buckets starting at 1.0.
pub static POWERS_OF_TEN: Lazy<Bucketer> = Lazy::new(|| Bucketer::exponential(7, 1.0, 10.0));

/// A single bucket in a [`Bucketer`]'s boundary set.
///
/// Interior buckets cover `[start, end)`. The first bucket is open below
/// (`< end`) and the last is open above (`>= start`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketRange {
    start: f64,
    end: f64,
    first: bool,
    last: bool,
}

impl BucketRange {
    /// The inclusive lower bound, absent exactly on the first bucket.
    pub fn lower(&self) -> Option<f64> {
        if self.first {
            None
        } else {
            Some(self.start)
        }
    }

    /// The exclusive upper bound, absent exactly on the last bucket.
    pub fn upper(&self) -> Option<f64> {
        if self.last {
            None
        } else {
            Some(self.end)
        }
    }

    /// Whether this is the open-below first bucket.
    pub fn is_first(&self) -> bool {
        self.first
    }

    /// Whether this is the open-above last bucket.
    pub fn is_last(&self) -> bool {
        self.last
    }

    pub(crate) fn start(&self) -> f64 {
        self.start
    }

    pub(crate) fn end(&self) -> f64 {
        self.end
    }
}

/// An immutable description of histogram bucket boundaries.
///
/// `k` ascending cut points produce `k + 1` buckets: everything below the
/// first cut point, one bucket per adjacent pair, and everything at or above
/// the last. Bucketers never change once built, so a single instance can
/// back any number of distributions without synchronization; cloning one
/// shares the underlying boundary set.
#[derive(Clone, Debug)]
pub struct Bucketer {
    ranges: Arc<[BucketRange]>,
}

impl Bucketer {
    /// Creates a bucketer on a geometric scale.
    ///
    /// `Bucketer::exponential(6, 10.0, 2.5)` means 6 buckets: `< 10`,
    /// `10 - 25`, `25 - 62.5`, `62.5 - 156.25`, `156.25 - 390.625`, and
    /// `>= 390.625`.
    ///
    /// # Panics
    ///
    /// Panics if `count < 2`, `start <= 0.0`, or `scale <= 1.0`.
    pub fn exponential(count: usize, start: f64, scale: f64) -> Bucketer {
        assert!(
            count >= 2 && start > 0.0 && scale > 1.0,
            "count >= 2 && start > 0.0 && scale > 1.0"
        );
        let mut endpoints = Vec::with_capacity(count - 1);
        let mut current = start;
        for _ in 0..count - 1 {
            endpoints.push(current);
            current *= scale;
        }
        Bucketer::from_endpoints(&endpoints)
    }

    /// Creates a bucketer on a linear scale.
    ///
    /// `Bucketer::linear(5, 0.0, 10.0)` means 5 buckets: `< 0`, `0 - 10`,
    /// `10 - 20`, `20 - 30`, and `>= 30`.
    ///
    /// # Panics
    ///
    /// Panics if `count < 2` or `increment <= 0.0`.
    pub fn linear(count: usize, start: f64, increment: f64) -> Bucketer {
        assert!(count >= 2 && increment > 0.0, "count >= 2 && increment > 0.0");
        let mut endpoints = Vec::with_capacity(count - 1);
        let mut current = start;
        for _ in 0..count - 1 {
            endpoints.push(current);
            current += increment;
        }
        Bucketer::from_endpoints(&endpoints)
    }

    /// Creates a bucketer from explicit endpoints.
    ///
    /// `Bucketer::arbitrary(&[10.0, 20.0, 30.0])` means 4 buckets: `< 10`,
    /// `10 - 20`, `20 - 30`, and `>= 30`. It is the caller's responsibility
    /// to supply the endpoints in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `endpoints` is empty.
    pub fn arbitrary(endpoints: &[f64]) -> Bucketer {
        assert!(!endpoints.is_empty(), "endpoints must have at least one element");
        Bucketer::from_endpoints(endpoints)
    }

    fn from_endpoints(endpoints: &[f64]) -> Bucketer {
        let mut ranges = Vec::with_capacity(endpoints.len() + 1);
        ranges.push(BucketRange { start: 0.0, end: endpoints[0], first: true, last: false });
        for pair in endpoints.windows(2) {
            ranges.push(BucketRange { start: pair[0], end: pair[1], first: false, last: false });
        }
        ranges.push(BucketRange {
            start: endpoints[endpoints.len() - 1],
            end: 0.0,
            first: false,
            last: true,
        });
        Bucketer { ranges: ranges.into() }
    }

    /// The bucket ranges, in ascending order.
    pub fn ranges(&self) -> &[BucketRange] {
        &self.ranges
    }

    pub(crate) fn shared_ranges(&self) -> Arc<[BucketRange]> {
        Arc::clone(&self.ranges)
    }
}
