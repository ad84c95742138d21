//! The hierarchical metrics namespace.
//!
//! The namespace is a tree of named nodes, each with exactly one role:
//! either a directory (which names children by path segment) or a metric
//! leaf. Entries are inserted but never removed; directories own their
//! children, while parent links are weak back-references used only to
//! compute absolute paths.

mod metric;

pub use metric::Metric;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::path::Path;
use crate::unit::Unit;
use crate::value::Value;

/// Errors surfaced by metric and directory registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RegisterError {
    /// The path, or one of its ancestors, is already bound to a conflicting
    /// role.
    #[error("path already in use")]
    PathInUse,
}

pub(crate) struct MetricData {
    pub(crate) description: String,
    pub(crate) unit: Unit,
    pub(crate) value: Value,
}

pub(crate) enum Role {
    Directory(RwLock<BTreeMap<String, Arc<Node>>>),
    Metric(MetricData),
}

pub(crate) struct Node {
    pub(crate) name: String,
    parent: Weak<Node>,
    pub(crate) role: Role,
}

impl Node {
    fn is_directory(&self) -> bool {
        matches!(self.role, Role::Directory(_))
    }

    fn child(&self, name: &str) -> Option<Arc<Node>> {
        match &self.role {
            Role::Directory(children) => children.read().get(name).cloned(),
            Role::Metric(_) => None,
        }
    }

    /// The absolute path from the root: `/` for the root itself, `/a/b`
    /// below it. The root is the one node with no parent.
    pub(crate) fn abs_path(&self) -> String {
        let mut names = Vec::new();
        let mut parent = self.parent.upgrade();
        if parent.is_some() {
            names.push(self.name.clone());
        }
        while let Some(node) = parent {
            parent = node.parent.upgrade();
            if parent.is_some() {
                names.push(node.name.clone());
            }
        }
        names.reverse();
        let mut path = String::from("/");
        path.push_str(&names.join("/"));
        path
    }
}

/// A named child of a [`Directory`].
#[derive(Clone)]
pub enum Entry {
    /// A nested directory.
    Directory(Directory),
    /// A metric leaf.
    Metric(Metric),
}

impl Entry {
    /// The entry's name within its parent directory.
    pub fn name(&self) -> &str {
        match self {
            Entry::Directory(dir) => &dir.node.name,
            Entry::Metric(metric) => metric.name(),
        }
    }

    fn from_node(node: &Arc<Node>) -> Entry {
        match &node.role {
            Role::Directory(_) => Entry::Directory(Directory { node: Arc::clone(node) }),
            Role::Metric(_) => Entry::Metric(Metric::new(Arc::clone(node))),
        }
    }
}

/// A sink that receives metrics during a traversal.
///
/// Returning an error aborts the traversal immediately; the error is handed
/// back to the caller unchanged.
pub trait Collector {
    /// The error a collector aborts a traversal with.
    type Error;

    /// Consumes a single metric.
    fn collect(&mut self, metric: &Metric) -> Result<(), Self::Error>;
}

/// A directory in the metrics namespace.
///
/// Handles are cheap to clone; two handles compare equal exactly when they
/// name the same directory.
#[derive(Clone)]
pub struct Directory {
    node: Arc<Node>,
}

impl Directory {
    /// Creates a detached root directory with an empty name and no parent.
    pub(crate) fn new_root() -> Directory {
        Directory {
            node: Arc::new(Node {
                name: String::new(),
                parent: Weak::new(),
                role: Role::Directory(RwLock::new(BTreeMap::new())),
            }),
        }
    }

    fn children(&self) -> &RwLock<BTreeMap<String, Arc<Node>>> {
        match &self.node.role {
            Role::Directory(children) => children,
            Role::Metric(_) => unreachable!("directory handle bound to a metric node"),
        }
    }

    /// The absolute path of this directory; `/` for the root.
    pub fn abs_path(&self) -> String {
        self.node.abs_path()
    }

    /// Lists the children of this directory, sorted ascending by name.
    pub fn list(&self) -> Vec<Entry> {
        self.children().read().values().map(Entry::from_node).collect()
    }

    /// Registers a metric at `path`, relative to this directory, creating
    /// missing ancestor directories on the way.
    ///
    /// Fails with [`RegisterError::PathInUse`] if the path is empty, if any
    /// ancestor is already a metric, or if the final segment is already
    /// bound to anything.
    pub fn register_metric(
        &self,
        path: &str,
        value: Value,
        unit: Unit,
        description: &str,
    ) -> Result<(), RegisterError> {
        let path = Path::parse(path);
        if path.is_empty() {
            return Err(RegisterError::PathInUse);
        }
        let parent = self.ensure_directories(path.dir())?;
        let metric = parent.store_metric(path.base(), value, unit, description)?;
        debug!(path = %metric.abs_path(), kind = ?metric.value().kind(), "registered metric");
        Ok(())
    }

    /// Returns the directory at `path`, relative to this directory, creating
    /// missing directories along the way.
    ///
    /// Registering a path that already names a directory returns that same
    /// directory. Fails with [`RegisterError::PathInUse`] if any segment
    /// along the way is already a metric.
    pub fn register_directory(&self, path: &str) -> Result<Directory, RegisterError> {
        let path = Path::parse(path);
        self.ensure_directories(path.segments())
    }

    /// Looks up a directory by relative path.
    ///
    /// Returns `None` if the path is missing or names a metric.
    pub fn get_directory(&self, path: &str) -> Option<Directory> {
        self.resolve_directory(Path::parse(path).segments())
    }

    /// Looks up a metric by relative path.
    ///
    /// Returns `None` if the path is missing or names a directory.
    pub fn get_metric(&self, path: &str) -> Option<Metric> {
        match self.get_directory_or_metric(path) {
            Some(Entry::Metric(metric)) => Some(metric),
            _ => None,
        }
    }

    /// Resolves `path` to whatever it names, in a single walk.
    ///
    /// The empty path names this directory itself.
    pub fn get_directory_or_metric(&self, path: &str) -> Option<Entry> {
        let path = Path::parse(path);
        if path.is_empty() {
            return Some(Entry::Directory(self.clone()));
        }
        let parent = self.resolve_directory(path.dir())?;
        let node = parent.node.child(path.base())?;
        Some(Entry::from_node(&node))
    }

    /// Delivers every metric beneath this directory to `collector`,
    /// depth-first with children visited in name order.
    ///
    /// The first collector error aborts the traversal and is returned
    /// unchanged. Directories themselves are not delivered.
    pub fn get_all_metrics<C: Collector>(&self, collector: &mut C) -> Result<(), C::Error> {
        for entry in self.list() {
            match entry {
                Entry::Directory(dir) => dir.get_all_metrics(collector)?,
                Entry::Metric(metric) => collector.collect(&metric)?,
            }
        }
        Ok(())
    }

    /// Delivers whatever `path` names to `collector`: a single metric, a
    /// subtree, or nothing at all if the path is missing.
    pub fn get_all_metrics_by_path<C: Collector>(
        &self,
        path: &str,
        collector: &mut C,
    ) -> Result<(), C::Error> {
        match self.get_directory_or_metric(path) {
            Some(Entry::Metric(metric)) => collector.collect(&metric),
            Some(Entry::Directory(dir)) => dir.get_all_metrics(collector),
            None => Ok(()),
        }
    }

    fn resolve_directory(&self, segments: &[String]) -> Option<Directory> {
        let mut current = Arc::clone(&self.node);
        for segment in segments {
            let next = current.child(segment)?;
            if !next.is_directory() {
                return None;
            }
            current = next;
        }
        Some(Directory { node: current })
    }

    fn ensure_directories(&self, segments: &[String]) -> Result<Directory, RegisterError> {
        let mut current = self.clone();
        for segment in segments {
            current = current.create_child_directory(segment)?;
        }
        Ok(current)
    }

    fn create_child_directory(&self, name: &str) -> Result<Directory, RegisterError> {
        let mut children = self.children().write();
        if let Some(existing) = children.get(name) {
            return if existing.is_directory() {
                Ok(Directory { node: Arc::clone(existing) })
            } else {
                Err(RegisterError::PathInUse)
            };
        }
        let node = Arc::new(Node {
            name: name.to_owned(),
            parent: Arc::downgrade(&self.node),
            role: Role::Directory(RwLock::new(BTreeMap::new())),
        });
        children.insert(name.to_owned(), Arc::clone(&node));
        debug!(path = %node.abs_path(), "created directory");
        Ok(Directory { node })
    }

    fn store_metric(
        &self,
        name: &str,
        value: Value,
        unit: Unit,
        description: &str,
    ) -> Result<Metric, RegisterError> {
        let mut children = self.children().write();
        if children.contains_key(name) {
            return Err(RegisterError::PathInUse);
        }
        let node = Arc::new(Node {
            name: name.to_owned(),
            parent: Arc::downgrade(&self.node),
            role: Role::Metric(MetricData {
                description: description.to_owned(),
                unit,
                value,
            }),
        });
        children.insert(name.to_owned(), Arc::clone(&node));
        Ok(Metric::new(node))
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Directory) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Directory {}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory").field("path", &self.abs_path()).finish()
    }
}
