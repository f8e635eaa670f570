//! The project requirements file (`collections.toml`).
//!
//! ```toml
//! [collections]
//! "community.general" = ">=7.0.0,<9.0.0"
//! "ansible.utils" = { version = "*", source = "galaxy", signed = true }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use collet_util::errors::CollectError;

use crate::name::CollectionName;
use crate::requirement::Requirement;
use crate::version::VersionSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsFile {
    #[serde(default)]
    pub collections: BTreeMap<String, RequirementEntry>,
}

/// A requirement entry: either a bare specifier string or a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementEntry {
    Spec(String),
    Detailed(DetailedRequirement),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedRequirement {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub signed: bool,
}

fn default_version() -> String {
    "*".to_string()
}

impl RequirementsFile {
    /// Load and parse a requirements file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CollectError::Requirement {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            CollectError::Requirement {
                message: format!("Failed to parse requirements file: {e}"),
            }
            .into()
        })
    }

    /// Convert every entry into a [`Requirement`], in name order.
    pub fn requirements(&self) -> miette::Result<Vec<Requirement>> {
        let mut out = Vec::with_capacity(self.collections.len());
        for (name, entry) in &self.collections {
            let name = CollectionName::parse(name).map_err(|e| CollectError::Requirement {
                message: e.to_string(),
            })?;
            let (spec, source, signed) = match entry {
                RequirementEntry::Spec(spec) => (spec.as_str(), None, false),
                RequirementEntry::Detailed(d) => (d.version.as_str(), d.source.clone(), d.signed),
            };
            let spec = VersionSpec::parse(spec).map_err(|e| CollectError::Requirement {
                message: format!("{name}: {e}"),
            })?;
            out.push(Requirement {
                name,
                spec,
                source,
                signed,
            });
        }
        Ok(out)
    }
}
