use std::fmt;
use std::sync::Arc;

use crate::registry::{MetricData, Node, Role};
use crate::unit::Unit;
use crate::value::Value;

/// A registered metric: a named, typed, read-only observable.
///
/// Handles are cheap to clone; two handles compare equal exactly when they
/// name the same metric. A metric has no mutation operations of its own --
/// its reading is taken through [`value`](Metric::value).
#[derive(Clone)]
pub struct Metric {
    node: Arc<Node>,
}

impl Metric {
    pub(crate) fn new(node: Arc<Node>) -> Metric {
        Metric { node }
    }

    fn data(&self) -> &MetricData {
        match &self.node.role {
            Role::Metric(data) => data,
            Role::Directory(_) => unreachable!("metric handle bound to a directory node"),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.node.name
    }

    /// The description given at registration.
    pub fn description(&self) -> &str {
        &self.data().description
    }

    /// The unit of measurement given at registration.
    pub fn unit(&self) -> Unit {
        self.data().unit
    }

    /// The read handle for this metric's current value.
    pub fn value(&self) -> &Value {
        &self.data().value
    }

    /// The absolute path of this metric.
    pub fn abs_path(&self) -> String {
        self.node.abs_path()
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Metric) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Metric {}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("path", &self.abs_path())
            .field("kind", &self.value().kind())
            .finish()
    }
}
