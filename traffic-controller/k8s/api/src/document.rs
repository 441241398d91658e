//! A read-only walker over loosely-typed resource documents.
//!
//! Cluster objects that have no typed model here (mesh CRDs in particular)
//! are handled as raw JSON. Every step of a walk yields a `Document` that is
//! either present or absent, so callers never index into a value that may
//! not exist. JSON `null` is treated the same as a missing field.

use serde_json::Value;

#[derive(Copy, Clone, Debug, Default)]
pub struct Document<'a>(Option<&'a Value>);

impl<'a> Document<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(Some(value).filter(|v| !v.is_null()))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    /// Descends into an object field.
    pub fn get(self, key: &str) -> Self {
        match self.0 {
            Some(Value::Object(map)) => map.get(key).map(Self::new).unwrap_or_default(),
            _ => Self::absent(),
        }
    }

    pub fn path(self, keys: &[&str]) -> Self {
        keys.iter().fold(self, |doc, key| doc.get(key))
    }

    pub fn is_present(self) -> bool {
        self.0.is_some()
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.0.and_then(Value::as_str)
    }

    /// Like `as_str`, but an empty string is absent.
    pub fn as_non_empty_str(self) -> Option<&'a str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    /// Returns the elements of an array, or `None` if this is not an array.
    pub fn as_seq(self) -> Option<impl Iterator<Item = Document<'a>>> {
        self.0
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::new))
    }

    /// Returns the elements of an array. Anything else walks as empty.
    pub fn items(self) -> impl Iterator<Item = Document<'a>> {
        self.as_seq().into_iter().flatten()
    }

    /// Returns the fields of an object, or `None` if this is not an object.
    ///
    /// Fields are yielded in key order.
    pub fn as_map(self) -> Option<impl Iterator<Item = (&'a str, Document<'a>)>> {
        self.0
            .and_then(Value::as_object)
            .map(|map| map.iter().map(|(k, v)| (k.as_str(), Self::new(v))))
    }

    /// Returns the fields of an object. Anything else walks as empty.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, Document<'a>)> {
        self.as_map().into_iter().flatten()
    }
}

impl<'a> From<&'a Value> for Document<'a> {
    fn from(value: &'a Value) -> Self {
        Self::new(value)
    }
}
