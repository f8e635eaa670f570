//! Registry abstraction: API URL layout and configuration.

use collet_core::config::GlobalConfig;
use collet_core::name::CollectionName;

/// A configured collection registry with an optional API token.
#[derive(Debug, Clone)]
pub struct Registry {
    pub name: String,
    pub url: String,
    pub token: Option<String>,
}

impl Registry {
    pub fn new(name: impl Into<String>, url: &str) -> Self {
        Self {
            name: name.into(),
            url: url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// All registries from the global config, in consultation order.
    pub fn from_config(config: &GlobalConfig) -> Vec<Self> {
        config
            .registry_urls()
            .into_iter()
            .map(|(name, url)| {
                let token = config.tokens.get(&name).cloned();
                Self {
                    token,
                    ..Self::new(name, &url)
                }
            })
            .collect()
    }

    /// Base of the published-content index for one collection.
    ///
    /// `community.general` becomes
    /// `<url>/api/v3/plugin/ansible/content/published/collections/index/community/general`
    pub fn collection_url(&self, name: &CollectionName) -> String {
        format!(
            "{}/api/v3/plugin/ansible/content/published/collections/index/{}/{}",
            self.url,
            name.namespace(),
            name.name()
        )
    }

    /// First page of the version listing.
    pub fn versions_url(&self, name: &CollectionName) -> String {
        format!("{}/versions/?limit=100", self.collection_url(name))
    }

    /// Detail document of one version.
    pub fn version_url(&self, name: &CollectionName, version: &str) -> String {
        format!("{}/versions/{version}/", self.collection_url(name))
    }

    /// Resolve an `href`/`next` link, which registries return host-relative.
    pub fn absolute(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            return link.to_string();
        }
        let host_end = self
            .url
            .find("://")
            .and_then(|scheme| self.url[scheme + 3..].find('/').map(|i| scheme + 3 + i))
            .unwrap_or(self.url.len());
        format!("{}{}", &self.url[..host_end], link)
    }
}
