use std::path::PathBuf;

/// A document that cannot be turned into a graph. Loading aborts and the
/// current graph is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("document is not valid JSON: {0}")]
    Json(String),
    #[error("document root must be a JSON object")]
    NotAnObject,
    #[error("document has no `{0}` array")]
    MissingArray(&'static str),
    #[error("`{0}` must be an array")]
    NotAnArray(&'static str),
    #[error("{collection}[{index}] is malformed: {reason}")]
    Entry {
        collection: &'static str,
        index: usize,
        reason: String,
    },
    #[error("node id `{0}` appears more than once")]
    DuplicateNodeId(String),
}

impl FormatError {
    pub(crate) fn node(index: usize, reason: impl Into<String>) -> Self {
        FormatError::Entry {
            collection: "nodes",
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn edge(index: usize, reason: impl Into<String>) -> Self {
        FormatError::Entry {
            collection: "edges",
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid url `{0}`")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    HttpStatus(u16),
    #[error("could not read response body: {0}")]
    Body(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Re-fetching a history entry's origin failed; the stored snapshot is used.
#[derive(Debug, thiserror::Error)]
#[error("could not refresh history entry {index} from {origin}: {cause}")]
pub struct ReconciliationError {
    pub index: usize,
    pub origin: String,
    #[source]
    pub cause: LoadError,
}

/// Graph consistency problems. These are surfaced to the user, never patched
/// over by dropping data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("edge `{edge}` references missing node `{node}`")]
    DanglingEdge { edge: String, node: String },
    #[error("node `{0}` does not exist")]
    MissingNode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::ser::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
