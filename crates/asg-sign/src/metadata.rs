//! Request metadata (headers) with case-insensitive lookup.

use crate::{HEADER_REQUEST_TIME, HEADER_SIGN, HEADER_SIGNED, SIGNED_HEADER_VALUE};

/// Name/value metadata attached to a request.
///
/// Lookups ignore ASCII case; each entry keeps the spelling it was last
/// inserted with, and that spelling is what gets signed. Entries iterate in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    entries: Vec<(String, String)>,
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                let (_, old) = std::mem::replace(&mut self.entries[idx], (name, value));
                Some(old)
            }
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the metadata itself is part of the signed material.
    pub fn is_signed(&self) -> bool {
        self.get(HEADER_SIGNED) == Some(SIGNED_HEADER_VALUE)
    }

    pub fn request_time(&self) -> Option<&str> {
        self.get(HEADER_REQUEST_TIME)
    }

    pub fn signature(&self) -> Option<&str> {
        self.get(HEADER_SIGN)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = RequestMetadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}
