//! Breadcrumbs locating fields in nested payloads.
//!
//! This module provides [`Breadcrumb`] and [`PathSegment`] for building the
//! dotted paths that identify where a validation error occurred.

use std::fmt::{self, Display};

/// A segment of a breadcrumb.
///
/// Breadcrumbs are built from segments that represent either a field key or an
/// array position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A field key (e.g., `tags`, `name`)
    Field(String),
    /// An array position (e.g., `[0]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// An immutable path to a field in a nested payload.
///
/// Each recursion step derives a new breadcrumb from its parent, so sibling
/// fields never observe each other's segments.
///
/// # Example
///
/// ```rust
/// use contextual_validator::Breadcrumb;
///
/// let path = Breadcrumb::root()
///     .push_field("tags")
///     .push_index(1)
///     .push_field("id");
///
/// assert_eq!(path.to_string(), "tags[1].id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Breadcrumb {
    segments: Vec<PathSegment>,
}

impl Breadcrumb {
    /// Creates an empty breadcrumb representing the payload root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a breadcrumb from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Returns a new breadcrumb with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new breadcrumb with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true if this is the root breadcrumb (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this breadcrumb has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the last segment, or None for the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for Breadcrumb {
    /// Parses a dotted breadcrumb such as `nutritionFacts.sodium` or `tags[1].id`.
    fn from(dotted: &str) -> Self {
        let mut segments = Vec::new();
        for part in dotted.split('.').filter(|p| !p.is_empty()) {
            let (name, rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if !name.is_empty() {
                segments.push(PathSegment::Field(name.to_string()));
            }
            for idx in rest
                .split(|c| c == '[' || c == ']')
                .filter_map(|s| s.parse::<usize>().ok())
            {
                segments.push(PathSegment::Index(idx));
            }
        }
        Self { segments }
    }
}
