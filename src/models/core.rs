// src/models/core.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized join key derived from a record's URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyKey(String);

impl CompanyKey {
    pub fn new(key: impl Into<String>) -> Self {
        CompanyKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CompanyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CompanyKey {
    fn from(value: String) -> Self {
        CompanyKey(value)
    }
}

impl From<&str> for CompanyKey {
    fn from(value: &str) -> Self {
        CompanyKey(value.to_string())
    }
}

impl AsRef<str> for CompanyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A source row reduced to the two fields matching cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identifier: String,
    pub url: String,
}

impl Record {
    pub fn new(identifier: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
        }
    }
}

/// A record annotated with the key its URL normalizes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRecord {
    pub record: Record,
    pub key: CompanyKey,
}

impl KeyedRecord {
    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    pub fn url(&self) -> &str {
        &self.record.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub left_id: String,
    pub right_id: String,
    pub left_url: String,
    pub right_url: String,
    pub left_key: CompanyKey,
    pub right_key: CompanyKey,
    /// Edit distance between the two keys; always 0 for exact matches.
    pub distance: usize,
}

impl MatchPair {
    pub fn new(left: &KeyedRecord, right: &KeyedRecord, distance: usize) -> Self {
        Self {
            left_id: left.identifier().to_string(),
            right_id: right.identifier().to_string(),
            left_url: left.url().to_string(),
            right_url: right.url().to_string(),
            left_key: left.key.clone(),
            right_key: right.key.clone(),
            distance,
        }
    }

    /// Row layout of the persisted matched table.
    pub fn to_row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.left_id.clone()),
            Some(self.right_id.clone()),
            Some(self.left_url.clone()),
            Some(self.right_url.clone()),
            Some(self.left_key.to_string()),
            Some(self.right_key.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRecord {
    pub identifier: String,
    pub url: String,
}

impl UnmatchedRecord {
    pub fn to_row(&self) -> Vec<Option<String>> {
        vec![Some(self.identifier.clone()), Some(self.url.clone())]
    }
}

impl From<&KeyedRecord> for UnmatchedRecord {
    fn from(record: &KeyedRecord) -> Self {
        Self {
            identifier: record.identifier().to_string(),
            url: record.url().to_string(),
        }
    }
}
