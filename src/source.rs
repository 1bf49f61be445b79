//! Where graph snapshots come from: remote origins over HTTP, local files,
//! and the document bundled into the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, error};
use url::Url;

use crate::document::{self, LoadedGraph};
use crate::error::{LoadError, NetworkError};

const BUNDLED_DEFAULT: &str = include_str!("../assets/default_diagram.json");

/// Anything that can turn an origin reference into a validated graph.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self, origin: &str) -> Result<LoadedGraph, LoadError>;
}

/// The graph shown when a remote origin cannot be loaded.
pub fn bundled_default() -> LoadedGraph {
    match document::parse(BUNDLED_DEFAULT) {
        Ok(graph) => graph,
        Err(err) => {
            error!(%err, "bundled default document is unreadable");
            LoadedGraph {
                nodes: Vec::new(),
                edges: Vec::new(),
                viewport: None,
                report: Default::default(),
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body. Anything outside 2xx is an error.
    pub fn get_text(&self, url: &str) -> Result<String, NetworkError> {
        let url = Url::parse(url).map_err(|_| NetworkError::InvalidUrl(url.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(url.to_string()));
        }
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus(status.as_u16()));
        }
        response.text().map_err(|e| NetworkError::Body(e.to_string()))
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&self, origin: &str) -> Result<LoadedGraph, LoadError> {
        let body = self.get_text(origin)?;
        Ok(document::parse(&body)?)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl FileSource {
    pub fn read(&self, path: &Path) -> Result<LoadedGraph, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(document::parse(&text)?)
    }
}

impl SnapshotSource for FileSource {
    fn fetch(&self, origin: &str) -> Result<LoadedGraph, LoadError> {
        self.read(&file_path(origin))
    }
}

fn file_path(origin: &str) -> PathBuf {
    Url::parse(origin)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(origin))
}

/// Dispatches on the origin: http(s) URLs go over the network, everything
/// else is treated as a local path or `file://` URL.
#[derive(Clone, Debug)]
pub struct OriginSource {
    http: HttpSource,
    file: FileSource,
}

impl OriginSource {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        Ok(Self {
            http: HttpSource::new(timeout)?,
            file: FileSource,
        })
    }

    pub fn http(&self) -> &HttpSource {
        &self.http
    }
}

pub fn is_remote(origin: &str) -> bool {
    let lower = origin.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl SnapshotSource for OriginSource {
    fn fetch(&self, origin: &str) -> Result<LoadedGraph, LoadError> {
        if is_remote(origin) {
            self.http.fetch(origin.trim())
        } else {
            self.file.fetch(origin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    #[test]
    fn bundled_default_has_two_nodes_and_one_edge() {
        let graph = bundled_default();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn file_source_reads_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"{"nodes":[{"id":"x"}],"edges":[]}"#).unwrap();

        let graph = FileSource.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(graph.nodes[0].id, "x");

        let url = Url::from_file_path(&path).unwrap();
        let graph = FileSource.fetch(url.as_str()).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource.read(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"{"nodes":[]}"#).unwrap();
        let err = FileSource.read(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Format(FormatError::MissingArray("edges"))
        ));
    }

    #[test]
    fn http_rejects_bad_urls_without_a_request() {
        let http = HttpSource::new(Duration::from_secs(1)).unwrap();
        assert!(matches!(
            http.get_text("not a url"),
            Err(NetworkError::InvalidUrl(_))
        ));
        assert!(matches!(
            http.get_text("ftp://example.org/x"),
            Err(NetworkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn origin_dispatch() {
        assert!(is_remote("https://example.org/graph"));
        assert!(is_remote("HTTP://example.org"));
        assert!(!is_remote("/tmp/graph.json"));
        assert!(!is_remote("file:///tmp/graph.json"));
    }
}
