//! Registry API client: listing and version-detail requests with retries.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use collet_core::name::CollectionName;
use collet_util::errors::CollectError;

use crate::metadata::{CollectionDocument, SignatureInfo, VersionMetadata};
use crate::registry::Registry;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Build a shared reqwest client for registry requests.
pub fn build_client(timeout: Duration) -> miette::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("collet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            CollectError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// One page of a version listing.
#[derive(Debug, Deserialize)]
struct VersionListing {
    #[serde(default)]
    data: Vec<VersionRef>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct VersionRef {
    version: String,
    #[serde(default)]
    href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}

/// The version detail document as the registry serves it.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionDetail {
    namespace: NamespaceRef,
    name: String,
    version: String,
    #[serde(default)]
    metadata: DetailMetadata,
    #[serde(default)]
    signatures: Vec<SignatureInfo>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    artifact: Option<ArtifactRef>,
}

#[derive(Debug, Deserialize)]
struct NamespaceRef {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct DetailMetadata {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ArtifactRef {
    #[serde(default)]
    sha256: Option<String>,
}

impl From<VersionDetail> for VersionMetadata {
    fn from(d: VersionDetail) -> Self {
        Self {
            namespace: d.namespace.name,
            name: d.name,
            version: d.version,
            dependencies: d.metadata.dependencies,
            signatures: d.signatures,
            download_url: d.download_url,
            sha256: d.artifact.and_then(|a| a.sha256),
        }
    }
}

/// A JSON GET, with a bearer token when the registry has one.
fn request(client: &Client, registry: &Registry, url: &str) -> RequestBuilder {
    let req = client.get(url).header("Accept", "application/json");
    match &registry.token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

/// GET a JSON document, with authentication and retries.
///
/// Returns `Ok(None)` for 404. Timeouts, connection failures and 5xx are
/// retried; any other failure is returned immediately.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    registry: &Registry,
    url: &str,
) -> miette::Result<Option<T>> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        match request(client, registry, url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    tracing::debug!("{last_err}, retrying");
                    continue;
                }
                if !status.is_success() {
                    return Err(CollectError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    }
                    .into());
                }
                let body = resp.json::<T>().await.map_err(|e| CollectError::Metadata {
                    message: format!("Malformed response from {url}: {e}"),
                })?;
                return Ok(Some(body));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(CollectError::Network {
                    message: format!("Request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(CollectError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    }
    .into())
}

/// Fetch every published version of `name` from `registry`.
///
/// Walks the paginated listing, then loads each version's detail document.
/// Returns `Ok(None)` when the registry does not know the collection.
pub async fn fetch_collection(
    client: &Client,
    registry: &Registry,
    name: &CollectionName,
) -> miette::Result<Option<CollectionDocument>> {
    let mut refs = Vec::new();
    let mut next = Some(registry.versions_url(name));
    while let Some(url) = next.take() {
        let Some(page) = get_json::<VersionListing>(client, registry, &url).await? else {
            if refs.is_empty() {
                return Ok(None);
            }
            break;
        };
        refs.extend(page.data);
        next = page.links.next.map(|link| registry.absolute(&link));
    }

    let mut versions = Vec::with_capacity(refs.len());
    for r in refs {
        let url = match r.href {
            Some(ref href) => registry.absolute(href),
            None => registry.version_url(name, &r.version),
        };
        match get_json::<VersionDetail>(client, registry, &url).await? {
            Some(detail) => versions.push(VersionMetadata::from(detail)),
            None => tracing::warn!("{name} {} listed but has no detail document", r.version),
        }
    }

    tracing::debug!("fetched {} versions of {name} from {}", versions.len(), registry.name);
    Ok(Some(CollectionDocument {
        namespace: name.namespace().to_string(),
        name: name.name().to_string(),
        versions,
    }))
}
