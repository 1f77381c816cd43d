use std::fmt::{Display, Formatter};

use crate::firestore::error::{invalid_input, FirestoreResult};

/// Slash-separated path to a collection or document (`cities/sf/landmarks`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_string(path: &str) -> FirestoreResult<Self> {
        if path.contains("//") {
            return Err(invalid_input("Found empty segment in resource path"));
        }

        Ok(Self::from_segments(
            path.split('/').filter(|segment| !segment.is_empty()),
        ))
    }

    /// Parses `path` and checks that it names a collection.
    pub fn collection(path: &str) -> FirestoreResult<Self> {
        let parsed = Self::from_string(path)?;
        if parsed.is_empty() || parsed.len() % 2 == 0 {
            return Err(invalid_input(format!(
                "Invalid collection path '{path}': collections must have an odd number of segments"
            )));
        }
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn without_last(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render_path() {
        let path = ResourcePath::from_string("cities/sf/neighborhoods/downtown").unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last_segment(), Some("downtown"));
        assert_eq!(path.canonical_string(), "cities/sf/neighborhoods/downtown");
    }

    #[test]
    fn rejects_empty_segments() {
        let err = ResourcePath::from_string("cities//sf").unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn collection_requires_odd_segments() {
        assert!(ResourcePath::collection("cities").is_ok());
        assert!(ResourcePath::collection("cities/sf/landmarks").is_ok());
        assert!(ResourcePath::collection("cities/sf").is_err());
        assert!(ResourcePath::collection("").is_err());
    }
}
