use std::fmt;

/// A parsed metric path: the non-empty segments of a `/`-separated name.
///
/// Parsing never fails. Leading, trailing, and repeated slashes are
/// tolerated, and whitespace-only segments are dropped. An empty path names
/// whatever directory it is resolved against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn parse(raw: &str) -> Path {
        let segments = raw
            .split('/')
            .filter(|segment| !segment.trim().is_empty())
            .map(str::to_owned)
            .collect();
        Path { segments }
    }

    /// All segments but the last.
    ///
    /// Panics if the path is empty.
    pub fn dir(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, dir)) => dir,
            None => panic!("dir() of an empty path"),
        }
    }

    /// The final segment.
    ///
    /// Panics if the path is empty.
    pub fn base(&self) -> &str {
        match self.segments.last() {
            Some(base) => base,
            None => panic!("base() of an empty path"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
