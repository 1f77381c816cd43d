use std::fmt::{Display, Formatter};

use crate::firestore::error::{invalid_input, FirestoreResult};

/// A dot-separated path to a (possibly nested) document field.
///
/// Segments are kept verbatim, including interior whitespace: `"home town"`
/// names a single field, not `"home"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<S, I>(segments: I) -> FirestoreResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(invalid_input(
                "FieldPath must contain at least one segment",
            ));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid_input("FieldPath segments cannot be empty"));
        }
        Ok(Self { segments })
    }

    pub fn from_dot_separated(path: &str) -> FirestoreResult<Self> {
        if path.trim().is_empty() {
            return Err(invalid_input("FieldPath string cannot be empty"));
        }
        FieldPath::new(path.split('.')).map_err(|_| {
            invalid_input(format!(
                "Invalid field path '{path}': paths must not start, end or contain '..'"
            ))
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join(".")
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// Trait that converts common user inputs into a validated [`FieldPath`].
pub trait IntoFieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath>;
}

impl IntoFieldPath for FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self)
    }
}

impl<'a> IntoFieldPath for &'a FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for String {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(&self)
    }
}

impl<'a> IntoFieldPath for &'a str {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dot_path() {
        let field = FieldPath::from_dot_separated("foo.bar").unwrap();
        assert_eq!(field.segments(), &["foo", "bar"]);
    }

    #[test]
    fn rejects_empty() {
        let err = FieldPath::from_dot_separated("").unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn keeps_spaces_verbatim() {
        let field = FieldPath::from_dot_separated("home town.zip code").unwrap();
        assert_eq!(field.segments(), &["home town", "zip code"]);
        assert_eq!(field.canonical_string(), "home town.zip code");
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(FieldPath::from_dot_separated("a..b").is_err());
        assert!(FieldPath::from_dot_separated(".a").is_err());
        assert!(FieldPath::from_dot_separated("a.").is_err());
    }
}
