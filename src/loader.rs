//! Off-thread graph loading.
//!
//! Each request runs on its own worker thread and reports back over a
//! channel. The UI thread drains completions and applies them one at a
//! time, so a load is never visible half-applied.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{debug, warn};

use crate::document::LoadedGraph;
use crate::error::LoadError;
use crate::source::SnapshotSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    Remote(String),
    File(PathBuf),
    /// Re-fetch of a history entry's origin.
    Refresh { index: usize, origin: String },
}

impl LoadRequest {
    /// Origin tag recorded on the resulting snapshot.
    pub fn origin(&self) -> String {
        match self {
            LoadRequest::Remote(url) => url.clone(),
            LoadRequest::File(path) => path.display().to_string(),
            LoadRequest::Refresh { origin, .. } => origin.clone(),
        }
    }

    fn run(&self, source: &dyn SnapshotSource) -> Result<LoadedGraph, LoadError> {
        match self {
            LoadRequest::Remote(url) | LoadRequest::Refresh { origin: url, .. } => source.fetch(url),
            LoadRequest::File(path) => source.fetch(&path.to_string_lossy()),
        }
    }
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub token: u64,
    pub request: LoadRequest,
    pub result: Result<LoadedGraph, LoadError>,
}

pub struct Loader {
    source: Arc<dyn SnapshotSource>,
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
    next_token: u64,
    newest_applied: u64,
    in_flight: usize,
    discard_stale: bool,
}

impl Loader {
    pub fn new(source: Arc<dyn SnapshotSource>, discard_stale: bool) -> Self {
        let (tx, rx) = unbounded();
        Self {
            source,
            tx,
            rx,
            next_token: 1,
            newest_applied: 0,
            in_flight: 0,
            discard_stale,
        }
    }

    pub fn set_discard_stale(&mut self, discard_stale: bool) {
        self.discard_stale = discard_stale;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn request(&mut self, request: LoadRequest) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.in_flight += 1;
        debug!(token, ?request, "load requested");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let job = request.clone();
        let spawned = thread::Builder::new()
            .name(format!("honeycomb-load-{token}"))
            .spawn(move || {
                let result = job.run(source.as_ref());
                let _ = tx.send(LoadCompletion {
                    token,
                    request: job,
                    result,
                });
            });
        if let Err(err) = spawned {
            warn!(%err, "could not spawn load worker, loading inline");
            let result = request.run(self.source.as_ref());
            let _ = self.tx.send(LoadCompletion {
                token,
                request,
                result,
            });
        }
        token
    }

    /// Completions that arrived since the last poll, in arrival order.
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        let arrived: Vec<_> = self.rx.try_iter().collect();
        arrived
            .into_iter()
            .filter_map(|completion| self.accept(completion))
            .collect()
    }

    /// Blocks for the next accepted completion.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        loop {
            match self.rx.recv_timeout(timeout) {
                Ok(completion) => {
                    if let Some(accepted) = self.accept(completion) {
                        return Some(accepted);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Applies the stale-completion policy. With discarding off, everything
    /// is accepted and the last completion to arrive wins.
    pub fn accept(&mut self, completion: LoadCompletion) -> Option<LoadCompletion> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.discard_stale && completion.token < self.newest_applied {
            debug!(
                token = completion.token,
                newest = self.newest_applied,
                "discarding stale load"
            );
            return None;
        }
        self.newest_applied = self.newest_applied.max(completion.token);
        Some(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeData, Point};

    struct GatedSource {
        gate: Receiver<()>,
    }

    impl SnapshotSource for GatedSource {
        fn fetch(&self, origin: &str) -> Result<LoadedGraph, LoadError> {
            if origin.contains("slow") {
                let _ = self.gate.recv_timeout(Duration::from_secs(5));
            }
            Ok(LoadedGraph {
                nodes: vec![Node::new(origin, Point::default(), NodeData::labeled(origin))],
                edges: Vec::new(),
                viewport: None,
                report: Default::default(),
            })
        }
    }

    fn loader(discard_stale: bool) -> (Loader, Sender<()>) {
        let (open, gate) = unbounded();
        (Loader::new(Arc::new(GatedSource { gate }), discard_stale), open)
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn completion_carries_request_and_result() {
        let (mut loader, _open) = loader(false);
        let token = loader.request(LoadRequest::Remote("https://example.org/a".into()));
        assert!(loader.is_busy());
        let done = loader.wait(TIMEOUT).unwrap();
        assert_eq!(done.token, token);
        assert_eq!(done.request, LoadRequest::Remote("https://example.org/a".into()));
        assert_eq!(done.result.unwrap().nodes[0].id, "https://example.org/a");
        assert!(!loader.is_busy());
    }

    #[test]
    fn out_of_order_completions_are_all_applied_by_default() {
        let (mut loader, open) = loader(false);
        let slow = loader.request(LoadRequest::Remote("slow".into()));
        let fast = loader.request(LoadRequest::Remote("fast".into()));
        assert_eq!(loader.wait(TIMEOUT).unwrap().token, fast);
        open.send(()).unwrap();
        assert_eq!(loader.wait(TIMEOUT).unwrap().token, slow);
    }

    #[test]
    fn stale_completions_can_be_discarded() {
        let (mut loader, open) = loader(true);
        loader.request(LoadRequest::Remote("slow".into()));
        let fast = loader.request(LoadRequest::Remote("fast".into()));
        assert_eq!(loader.wait(TIMEOUT).unwrap().token, fast);
        open.send(()).unwrap();
        assert!(loader.wait(Duration::from_millis(500)).is_none());
        assert!(!loader.is_busy());
    }

    #[test]
    fn file_requests_are_tagged_with_their_path() {
        let request = LoadRequest::File(PathBuf::from("graphs/one.json"));
        assert_eq!(request.origin(), "graphs/one.json");
    }
}
