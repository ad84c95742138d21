//! The message shapes handed to RPC consumers.
//!
//! The transport itself lives outside this crate; these types only define
//! the data it carries, and serialize to the wire-facing form directly.

use serde::Serialize;

use crate::distribution::Snapshot;
use crate::value::Kind;

/// A reading of a single metric, discriminated by [`Kind`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcValue {
    /// A boolean reading.
    Bool(bool),
    /// A signed integer reading.
    Int(i64),
    /// An unsigned integer reading.
    Uint(u64),
    /// A floating-point reading.
    Float(f64),
    /// A text reading.
    String(String),
    /// A timestamp reading, carried in its `<seconds>.<nanoseconds>` text
    /// form.
    Time(String),
    /// A distribution summary.
    Dist(RpcDistribution),
}

impl RpcValue {
    /// The kind of the carried reading.
    pub fn kind(&self) -> Kind {
        match self {
            RpcValue::Bool(_) => Kind::Bool,
            RpcValue::Int(_) => Kind::Int,
            RpcValue::Uint(_) => Kind::Uint,
            RpcValue::Float(_) => Kind::Float,
            RpcValue::String(_) => Kind::String,
            RpcValue::Time(_) => Kind::Time,
            RpcValue::Dist(_) => Kind::Dist,
        }
    }
}

/// The summary of a distribution at the moment it was read.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpcDistribution {
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
    /// Per-bucket bounds and counts, in bucket order.
    pub ranges: Vec<RpcRange>,
}

impl RpcDistribution {
    /// Builds the RPC summary from a distribution snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> RpcDistribution {
        RpcDistribution {
            min: snapshot.min,
            max: snapshot.max,
            average: snapshot.average,
            median: snapshot.median,
            count: snapshot.count,
            ranges: snapshot
                .breakdown
                .iter()
                .map(|piece| RpcRange {
                    lower: piece.range.lower(),
                    upper: piece.range.upper(),
                    count: piece.count,
                })
                .collect(),
        }
    }
}

/// A single bucket: its bounds and observation count.
///
/// `lower` is absent exactly on the first bucket and `upper` absent exactly
/// on the last; every bucket carries its count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RpcRange {
    /// The inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// The exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    /// The number of observations in this bucket.
    pub count: u64,
}
