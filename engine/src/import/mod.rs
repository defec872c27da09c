//! IMPORT fetchers
//!
//! - [`FileImportFetcher`] reads local books relative to a base directory.
//! - [`HttpImportFetcher`] downloads `http(s)://` references with a timeout.
//! - [`CompositeImportFetcher`] routes each reference to one of the two.

use async_trait::async_trait;
use folio_sdk::{EngineError, ImportFetcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Whether a reference is fetched over the network
pub fn is_remote_reference(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads imports from the local filesystem
#[derive(Debug, Clone)]
pub struct FileImportFetcher {
    base_dir: PathBuf,
}

impl FileImportFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Absolute references are kept, relative ones join the base directory
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let reference = reference.trim();
        let reference = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[async_trait]
impl ImportFetcher for FileImportFetcher {
    async fn fetch(&self, reference: &str) -> Result<String, EngineError> {
        let path = self.resolve_path(reference);
        debug!("Reading import {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EngineError::import(reference, format!("{}: {}", path.display(), e)))
    }
}

/// Downloads imports over HTTP
#[derive(Debug, Clone)]
pub struct HttpImportFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpImportFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Network(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl ImportFetcher for HttpImportFetcher {
    async fn fetch(&self, reference: &str) -> Result<String, EngineError> {
        let url = reference.trim();
        if !is_remote_reference(url) {
            return Err(EngineError::import(reference, "not an http(s) URL"));
        }
        debug!("Downloading import {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(self.timeout_secs)
            } else {
                EngineError::import(reference, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::import(reference, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| EngineError::import(reference, e.to_string()))
    }
}

/// Sends URLs to the HTTP fetcher and everything else to the file fetcher.
///
/// Either side may be missing; a reference with no matching fetcher fails
/// with [`EngineError::ImportUnavailable`].
#[derive(Debug, Clone, Default)]
pub struct CompositeImportFetcher {
    file: Option<FileImportFetcher>,
    http: Option<HttpImportFetcher>,
}

impl CompositeImportFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, fetcher: FileImportFetcher) -> Self {
        self.file = Some(fetcher);
        self
    }

    pub fn with_http(mut self, fetcher: HttpImportFetcher) -> Self {
        self.http = Some(fetcher);
        self
    }
}

#[async_trait]
impl ImportFetcher for CompositeImportFetcher {
    async fn fetch(&self, reference: &str) -> Result<String, EngineError> {
        if is_remote_reference(reference) {
            match &self.http {
                Some(http) => http.fetch(reference).await,
                None => Err(EngineError::ImportUnavailable),
            }
        } else {
            match &self.file {
                Some(file) => file.fetch(reference).await,
                None => Err(EngineError::ImportUnavailable),
            }
        }
    }
}
