//! Vertex and edge identifiers of the form `"collection/key"`.
//!
//! Identifiers are immutable value types, validated once when they enter the
//! engine and never re-derived mid-search. Ordering is lexical over the
//! serialized form, which is what the search uses to break cost ties
//! deterministically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdParseError;

/// Shared representation: the full serialized handle plus the separator
/// offset, so both components are slices into one allocation and clones
/// (frequent, ids are map keys) cost a single allocation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct DocHandle {
    raw: String,
    split: usize,
}

impl DocHandle {
    fn parse(raw: String) -> Result<Self, IdParseError> {
        let split = match raw.find('/') {
            Some(ix) => ix,
            None => return Err(IdParseError::MissingSeparator { text: raw }),
        };
        if split == 0 {
            return Err(IdParseError::EmptyCollection { text: raw });
        }
        if split + 1 == raw.len() {
            return Err(IdParseError::EmptyKey { text: raw });
        }
        Ok(DocHandle { raw, split })
    }

    fn collection(&self) -> &str {
        &self.raw[..self.split]
    }

    fn key(&self) -> &str {
        &self.raw[self.split + 1..]
    }
}

/// Identifier of a vertex document, structurally `(collection, key)`.
///
/// Equality and hashing are structural; the serialized form is
/// `"collection/key"`, which is also how the id serializes through serde.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VertexId(DocHandle);

/// Identifier of the edge document backing a traversed hop. Same shape and
/// validation as [`VertexId`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeId(DocHandle);

impl VertexId {
    /// Parses `"collection/key"` text. Fails when the separator is absent or
    /// either component is empty; the split is at the first `/`.
    pub fn parse(text: &str) -> Result<Self, IdParseError> {
        DocHandle::parse(text.to_string()).map(VertexId)
    }

    /// Collection component.
    pub fn collection(&self) -> &str {
        self.0.collection()
    }

    /// Key component.
    pub fn key(&self) -> &str {
        self.0.key()
    }

    /// The full `"collection/key"` handle.
    pub fn as_str(&self) -> &str {
        &self.0.raw
    }
}

impl EdgeId {
    /// Parses `"collection/key"` text, with the same rules as
    /// [`VertexId::parse`].
    pub fn parse(text: &str) -> Result<Self, IdParseError> {
        DocHandle::parse(text.to_string()).map(EdgeId)
    }

    /// Collection component.
    pub fn collection(&self) -> &str {
        self.0.collection()
    }

    /// Key component.
    pub fn key(&self) -> &str {
        self.0.key()
    }

    /// The full `"collection/key"` handle.
    pub fn as_str(&self) -> &str {
        &self.0.raw
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({:?})", self.as_str())
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({:?})", self.as_str())
    }
}

impl FromStr for VertexId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VertexId::parse(s)
    }
}

impl FromStr for EdgeId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeId::parse(s)
    }
}

impl TryFrom<String> for VertexId {
    type Error = IdParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        DocHandle::parse(text).map(VertexId)
    }
}

impl TryFrom<String> for EdgeId {
    type Error = IdParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        DocHandle::parse(text).map(EdgeId)
    }
}

impl From<VertexId> for String {
    fn from(id: VertexId) -> String {
        id.0.raw
    }
}

impl From<EdgeId> for String {
    fn from(id: EdgeId) -> String {
        id.0.raw
    }
}
