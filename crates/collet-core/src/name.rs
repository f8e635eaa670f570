//! Fully-qualified collection names (`namespace.name`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Reasons a collection name can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("collection name `{0}` must have the form `namespace.name`")]
    Shape(String),
    #[error("collection name `{name}` has an invalid {part} part `{value}`")]
    Part {
        name: String,
        part: &'static str,
        value: String,
    },
}

/// A normalized collection name, the identifier the resolver keys on.
///
/// Names are trimmed and lowercased on parse, so `Community.General` and
/// `community.general` identify the same collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionName {
    namespace: String,
    name: String,
}

impl CollectionName {
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let normalized = s.trim().to_ascii_lowercase();
        let (namespace, name) = normalized
            .split_once('.')
            .ok_or_else(|| NameError::Shape(s.to_string()))?;
        if name.contains('.') {
            return Err(NameError::Shape(s.to_string()));
        }
        validate_part(s, "namespace", namespace)?;
        validate_part(s, "name", name)?;
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_part(full: &str, part: &'static str, value: &str) -> Result<(), NameError> {
    let valid = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(NameError::Part {
            name: full.to_string(),
            part,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for CollectionName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CollectionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CollectionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
