//! TOML file repository.
//!
//! # Responsibilities
//! - Read raw clusters and routes from a single TOML document
//! - Re-read the file for every build so each build sees current contents
//!
//! # Design Decisions
//! - A missing file is "no data", not an error
//! - Clusters without an explicit `id` take their table key
//! - One read serves one clusters fetch plus one routes fetch, so a build
//!   never mixes sections from two versions of the file

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::model::{Cluster, ProxyRoute};
use crate::repository::{ClustersRepo, RepoError, RoutesRepo};

/// On-disk layout of a raw proxy definition file.
///
/// ```toml
/// [clusters.backend]
/// destinations.d1.address = "https://10.0.0.1:8443/"
///
/// [[routes]]
/// route_id = "api"
/// cluster_id = "backend"
/// match.hosts = ["api.example.com"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyDocument {
    pub clusters: HashMap<String, Cluster>,
    pub routes: Vec<ProxyRoute>,
}

impl ProxyDocument {
    /// Parse a document, filling empty cluster ids from their keys.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut document: ProxyDocument = toml::from_str(content)?;
        for (key, cluster) in document.clusters.iter_mut() {
            if cluster.id.is_empty() {
                cluster.id = key.clone();
            }
        }
        Ok(document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Clusters,
    Routes,
}

impl Section {
    fn other(self) -> Self {
        match self {
            Section::Clusters => Section::Routes,
            Section::Routes => Section::Clusters,
        }
    }
}

/// A document read for one section, held until the other section asks.
#[derive(Debug)]
struct Pending {
    document: Option<Arc<ProxyDocument>>,
    waiting: Section,
}

/// Repository backed by a TOML file on disk.
#[derive(Debug)]
pub struct FileRepo {
    path: PathBuf,
    pending: Mutex<Option<Pending>>,
}

impl FileRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Option<ProxyDocument>, RepoError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "Definition file not found, treating as empty");
                return Ok(None);
            }
            Err(source) => {
                return Err(RepoError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document = ProxyDocument::parse(&content).map_err(|source| RepoError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(document))
    }

    /// Document for `section`: the one the other section read last if it is
    /// still unclaimed, otherwise a fresh read.
    async fn fetch(&self, section: Section) -> Result<Option<Arc<ProxyDocument>>, RepoError> {
        let mut pending = self.pending.lock().await;

        if let Some(held) = pending.take() {
            if held.waiting == section {
                return Ok(held.document);
            }
        }

        let document = self.load().await?.map(Arc::new);
        *pending = Some(Pending {
            document: document.clone(),
            waiting: section.other(),
        });
        Ok(document)
    }
}

#[async_trait]
impl ClustersRepo for FileRepo {
    async fn get_clusters(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<HashMap<String, Cluster>>, RepoError> {
        Ok(self
            .fetch(Section::Clusters)
            .await?
            .map(|doc| doc.clusters.clone()))
    }
}

#[async_trait]
impl RoutesRepo for FileRepo {
    async fn get_routes(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<Vec<ProxyRoute>>, RepoError> {
        Ok(self
            .fetch(Section::Routes)
            .await?
            .map(|doc| doc.routes.clone()))
    }
}
