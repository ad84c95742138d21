//! In-process telemetry registry with a hierarchical metrics namespace.
//!
//! `vitals` lets a long-running application publish named, typed
//! measurements ("metrics") and lets consumers -- an RPC handler, a status
//! page -- enumerate and read them. Metrics live in a `/`-separated tree of
//! directories rooted at a single process-wide root; registering a metric
//! creates the missing intermediate directories on the way, and a path keeps
//! whatever role it was first given for the lifetime of the process.
//!
//! # Publishing measurements
//!
//! A metric is backed by one of four supply modes, all erased behind
//! [`Value`]:
//!
//! - a shared scalar container ([`Value::from_shared`]) that the application
//!   writes through a lock and the registry reads on demand;
//! - an optional timestamp handle ([`Value::from_optional_time`]) where an
//!   absent value reads as the zero time;
//! - a zero-argument producer ([`Value::from_fn`]) invoked on every read;
//! - a [`Distribution`] ([`Value::from_distribution`]): a concurrent,
//!   bucketed accumulator that snapshots into min/max/average/median and
//!   per-bucket counts.
//!
//! The scalar categories are closed: booleans, signed and unsigned integers
//! (read as 64 bits), floats (read as `f64`), strings, and UTC timestamps.
//! A value's [`Kind`] is fixed when it is constructed, and reading it
//! through the wrong accessor is a programmer error that panics.
//!
//! ```
//! use std::sync::Arc;
//!
//! use parking_lot::RwLock;
//! use vitals::{Bucketer, Distribution, Unit, Value};
//!
//! // A variable the application updates in place. The registry reads the
//! // current contents on demand; no call is needed to publish updates.
//! let temperature = Arc::new(RwLock::new(0.0f64));
//! vitals::register_metric(
//!     "/proc/temperature",
//!     Value::from_shared(&temperature),
//!     Unit::Celsius,
//!     "Temperature",
//! )
//! .expect("path is free");
//!
//! // A producer is invoked on every read.
//! vitals::register_metric(
//!     "/proc/rpc-count",
//!     Value::from_fn(|| 500u64),
//!     Unit::None,
//!     "RPC count",
//! )
//! .expect("path is free");
//!
//! // A distribution accumulates observations from any number of threads.
//! let latency = Arc::new(Distribution::new(&Bucketer::exponential(6, 10.0, 2.5)));
//! vitals::register_metric(
//!     "/proc/rpc-latency",
//!     Value::from_distribution(&latency),
//!     Unit::Millisecond,
//!     "RPC latency",
//! )
//! .expect("path is free");
//! latency.add(12.0);
//!
//! *temperature.write() = 22.5;
//! let metric = vitals::root().get_metric("/proc/temperature").expect("registered above");
//! assert_eq!(metric.value().as_float(), 22.5);
//! assert_eq!(metric.value().as_text_string(), "22.5");
//! ```
//!
//! # Consuming measurements
//!
//! Consumers look entries up by path ([`Directory::get_metric`],
//! [`Directory::get_directory`]) or walk a whole subtree:
//! [`Directory::get_all_metrics`] drives a depth-first, name-ordered
//! traversal that feeds every metric to a caller-supplied [`Collector`].
//! A collector aborts the traversal by returning an error, which is handed
//! back unchanged.
//!
//! ```
//! use vitals::{Collector, Metric, Unit, Value};
//!
//! struct Paths(Vec<String>);
//!
//! impl Collector for Paths {
//!     type Error = std::convert::Infallible;
//!
//!     fn collect(&mut self, metric: &Metric) -> Result<(), Self::Error> {
//!         self.0.push(metric.abs_path());
//!         Ok(())
//!     }
//! }
//!
//! vitals::register_metric("/proc/a", Value::from_fn(|| 1u64), Unit::None, "a").unwrap();
//! vitals::register_metric("/proc/b", Value::from_fn(|| 2u64), Unit::None, "b").unwrap();
//!
//! let mut paths = Paths(Vec::new());
//! vitals::root().get_all_metrics_by_path("/proc", &mut paths).unwrap();
//! assert_eq!(paths.0, ["/proc/a", "/proc/b"]);
//! ```
//!
//! Readings can also be rendered: [`Value::as_rpc_value`] produces the
//! discriminated record the RPC layer serializes (see [`messages`]), and
//! [`Value::as_text_string`] / [`Value::as_html_string`] produce the text
//! forms the status page embeds.
//!
//! # Concurrency
//!
//! Every operation is synchronous. [`Distribution::add`] is the only hot
//! concurrent path and takes a single readers-writer lock exclusively;
//! snapshots take it shared. Registration and traversal may race freely:
//! each directory guards its children with its own lock, taken in
//! parent-to-child order, and a traversal sees each directory's membership
//! as of the moment it enters that directory.
#![deny(missing_docs)]

mod bucketer;
mod distribution;
pub mod messages;
mod path;
mod registry;
mod unit;
mod value;

pub use self::bucketer::{BucketRange, Bucketer, POWERS_OF_FOUR, POWERS_OF_TEN, POWERS_OF_TWO};
pub use self::distribution::{BucketCount, Distribution, Snapshot};
pub use self::registry::{Collector, Directory, Entry, Metric, RegisterError};
pub use self::unit::Unit;
pub use self::value::{Kind, Scalar, Value};

use once_cell::sync::Lazy;

static ROOT: Lazy<Directory> = Lazy::new(Directory::new_root);

/// The process-wide root directory.
///
/// Created lazily on first use and alive for the rest of the program.
pub fn root() -> &'static Directory {
    &ROOT
}

/// Registers a metric at an absolute path under the process-wide root.
///
/// Missing intermediate directories are created on the way. Fails with
/// [`RegisterError::PathInUse`] if the path is empty, if any ancestor is
/// already a metric, or if the final segment is already bound.
pub fn register_metric(
    path: &str,
    value: Value,
    unit: Unit,
    description: &str,
) -> Result<(), RegisterError> {
    root().register_metric(path, value, unit, description)
}

/// Returns the directory at an absolute path under the process-wide root,
/// creating missing directories along the way.
///
/// Registering a path that is already a directory returns that same
/// directory. Fails with [`RegisterError::PathInUse`] if any segment along
/// the way is already a metric.
pub fn register_directory(path: &str) -> Result<Directory, RegisterError> {
    root().register_directory(path)
}
