//! Collection version parsing and version specifier matching.
//!
//! Collection versions are semantic versions. Specifiers use the registry
//! syntax:
//! - `*` (or an empty string) accepts any version
//! - comma-separated clauses, all of which must hold: `>=1.0.0,<2.0.0`
//! - operators `==`, `=`, `!=`, `>=`, `>`, `<=`, `<`
//! - a bare version means `==`
//!
//! Short versions such as `1` or `2.5` are padded to `1.0.0` and `2.5.0`.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version `{input}`: {reason}")]
    Version { input: String, reason: String },
    #[error("empty clause in version specifier `{0}`")]
    EmptyClause(String),
}

/// Parse a version, padding missing minor/patch components with zeros.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let s = input.trim();
    let (core, rest) = match s.find(|c: char| c == '-' || c == '+') {
        Some(idx) => s.split_at(idx),
        None => (s, ""),
    };
    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0{rest}"),
        1 => format!("{core}.0{rest}"),
        _ => s.to_string(),
    };
    Version::parse(&padded).map_err(|e| VersionError::Version {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Ge => ">=",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Lt => "<",
        }
    }
}

/// One `<op><version>` clause of a specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub op: Op,
    pub version: Version,
}

impl Clause {
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => version == &self.version,
            Op::Ne => version != &self.version,
            Op::Ge => version >= &self.version,
            Op::Gt => version > &self.version,
            Op::Le => version <= &self.version,
            Op::Lt => version < &self.version,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// A parsed version specifier. An empty clause list accepts everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VersionSpec {
    clauses: Vec<Clause>,
}

impl VersionSpec {
    /// The `*` specifier.
    pub fn any() -> Self {
        Self::default()
    }

    /// A specifier accepting exactly `version`.
    pub fn exact(version: Version) -> Self {
        Self {
            clauses: vec![Clause {
                op: Op::Eq,
                version,
            }],
        }
    }

    pub fn parse(spec: &str) -> Result<Self, VersionError> {
        let s = spec.trim();
        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }
        let mut clauses = Vec::new();
        for raw in s.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(VersionError::EmptyClause(spec.to_string()));
            }
            let (op, rest) = split_op(raw);
            clauses.push(Clause {
                op,
                version: parse_version(rest)?,
            });
        }
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(version))
    }

    /// The single version this specifier pins, if it is an exact `==` pin.
    pub fn pinned(&self) -> Option<&Version> {
        match self.clauses.as_slice() {
            [Clause { op: Op::Eq, version }] => Some(version),
            _ => None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned().is_some()
    }

    /// Whether any clause names a pre-release, which opts this specifier
    /// into considering pre-release candidates.
    pub fn mentions_pre_release(&self) -> bool {
        self.clauses.iter().any(|c| !c.version.pre.is_empty())
    }
}

fn split_op(clause: &str) -> (Op, &str) {
    const OPS: [(&str, Op); 7] = [
        ("==", Op::Eq),
        ("!=", Op::Ne),
        (">=", Op::Ge),
        ("<=", Op::Le),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Eq),
    ];
    for (prefix, op) in OPS {
        if let Some(rest) = clause.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (Op::Eq, clause)
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn pads_short_versions() {
        assert_eq!(v("1"), Version::new(1, 0, 0));
        assert_eq!(v("2.5"), Version::new(2, 5, 0));
        assert_eq!(v("2.5-beta.1").to_string(), "2.5.0-beta.1");
    }

    #[test]
    fn star_accepts_everything() {
        let spec = VersionSpec::parse("*").unwrap();
        assert!(spec.is_any());
        assert!(spec.matches(&v("0.0.1")));
        assert!(spec.matches(&v("99.0.0")));
        assert_eq!(spec.to_string(), "*");
    }

    #[test]
    fn range_clauses() {
        let spec = VersionSpec::parse(">=1,<3").unwrap();
        assert!(spec.matches(&v("1.0.0")));
        assert!(spec.matches(&v("2.5.0")));
        assert!(!spec.matches(&v("3.0.0")));
        assert!(!spec.matches(&v("0.9.0")));
        assert_eq!(spec.to_string(), ">=1.0.0,<3.0.0");
    }

    #[test]
    fn bare_version_is_exact_pin() {
        let spec = VersionSpec::parse("1.2.3").unwrap();
        assert_eq!(spec.pinned(), Some(&v("1.2.3")));
        assert!(VersionSpec::parse("=1.2.3").unwrap().is_pinned());
        assert!(!VersionSpec::parse(">=1.2.3").unwrap().is_pinned());
    }

    #[test]
    fn not_equal_excludes() {
        let spec = VersionSpec::parse("!=2.0.0").unwrap();
        assert!(!spec.matches(&v("2.0.0")));
        assert!(spec.matches(&v("2.0.1")));
    }

    #[test]
    fn pre_release_mentions() {
        assert!(VersionSpec::parse("==2.0.0-rc.1").unwrap().mentions_pre_release());
        assert!(!VersionSpec::parse(">=2.0.0").unwrap().mentions_pre_release());
    }

    #[test]
    fn empty_clause_rejected() {
        assert!(matches!(
            VersionSpec::parse(">=1.0.0,"),
            Err(VersionError::EmptyClause(_))
        ));
        assert!(VersionSpec::parse(">=banana").is_err());
    }
}
