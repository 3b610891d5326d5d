//! Locations of validation issues inside call arguments and return values.
//!
//! A [`Location`] is an ordered path from the root input to the offending
//! value. Positional arguments are addressed by index, keyword arguments and
//! object fields by name. The empty location denotes the whole input, which is
//! how issues against a function's return value are reported.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// One step of a [`Location`].
///
/// Serializes untagged, so a location renders as a JSON array of strings and
/// integers (`["user", "pets", 0, "age"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A position in a sequence (positional argument, array item).
    Index(usize),
    /// A named member (keyword argument, object field).
    Field(String),
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

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(idx) => write!(f, "{}", idx),
            PathSegment::Field(name) => write!(f, "{}", name),
        }
    }
}

/// An ordered path from the root input to a value.
///
/// Locations are immutable; `push_*` returns an extended copy so a parent
/// location can be shared by sibling fields.
///
/// # Example
///
/// ```rust
/// use safecall::Location;
///
/// let loc = Location::root()
///     .push_index(0)
///     .push_field("user")
///     .push_field("pet");
///
/// assert_eq!(loc.to_string(), "0.user.pet");
/// assert_eq!(loc.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location {
    segments: Vec<PathSegment>,
}

impl Location {
    /// The empty location: the whole argument set or the whole return value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a location with a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Creates a location with a single index segment.
    pub fn from_index(idx: usize) -> Self {
        Self {
            segments: vec![PathSegment::Index(idx)],
        }
    }

    /// Returns a new location with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns a new location with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    fn push(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Returns true for the empty location.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// The first segment, which names the argument an issue belongs to.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn as_slice(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Location {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_location() {
        let loc = Location::root();
        assert!(loc.is_root());
        assert_eq!(loc.len(), 0);
        assert_eq!(loc.to_string(), "");
        assert_eq!(loc.first(), None);
    }

    #[test]
    fn test_mixed_segments_display() {
        let loc = Location::root()
            .push_index(0)
            .push_field("user")
            .push_field("pets")
            .push_index(2);
        assert_eq!(loc.to_string(), "0.user.pets.2");
    }

    #[test]
    fn test_push_leaves_parent_untouched() {
        let base = Location::from_field("items");
        let first = base.push_index(0);
        let second = base.push_index(1);

        assert_eq!(base.len(), 1);
        assert_eq!(first.last(), Some(&PathSegment::Index(0)));
        assert_eq!(second.last(), Some(&PathSegment::Index(1)));
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let loc = Location::root().push_field("user").push_index(3);
        assert_eq!(serde_json::to_value(&loc).unwrap(), json!(["user", 3]));
    }

    #[test]
    fn test_deserializes_strings_and_integers() {
        let loc: Location = serde_json::from_value(json!([0, "user", "pet"])).unwrap();
        assert_eq!(loc, Location::from_index(0).push_field("user").push_field("pet"));
    }

    #[test]
    fn test_collects_from_segments() {
        let loc: Location = ["a", "b"].into_iter().collect();
        assert_eq!(loc.to_string(), "a.b");
    }
}
