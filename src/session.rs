//! One editing session: the editor, its navigation history, and the policy
//! for applying loads.

use std::path::Path;

use tracing::{info, warn};

use crate::commands::Editor;
use crate::document::{self, ImportReport, LoadedGraph, Viewport};
use crate::error::{LoadError, PersistError};
use crate::history::{Navigation, NavigationHistory, Reconciled};
use crate::ids::IdGenerator;
use crate::loader::{LoadCompletion, LoadRequest};
use crate::model::GraphSnapshot;
use crate::source::{self, FileSource, SnapshotSource};

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        report: ImportReport,
        viewport: Option<Viewport>,
    },
    /// A remote origin failed; the bundled default graph is shown instead.
    FellBack(LoadError),
    /// A file could not be imported; the current graph was kept.
    Rejected(LoadError),
    /// A history refresh finished. `shown` is set when the store was
    /// replaced with the refreshed entry.
    Reconciled { result: Reconciled, shown: bool },
}

#[derive(Debug)]
pub enum Step {
    Replayed(Reconciled),
    /// Already at the first or last entry.
    Boundary,
    /// Navigated to an index the history does not know.
    EntryPoint,
}

pub struct Session {
    editor: Editor,
    history: NavigationHistory,
}

impl Session {
    pub fn new(ids: IdGenerator, history_capacity: usize) -> Self {
        Self {
            editor: Editor::new(ids),
            history: NavigationHistory::new(history_capacity),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// Shows the bundled graph without recording it in the history.
    pub fn show_default(&mut self) {
        let graph = source::bundled_default();
        self.editor.load(&graph.into_snapshot(None));
    }

    pub fn apply_completion(&mut self, completion: LoadCompletion) -> LoadOutcome {
        self.apply_loaded(&completion.request, completion.result)
    }

    pub fn apply_loaded(
        &mut self,
        request: &LoadRequest,
        result: Result<LoadedGraph, LoadError>,
    ) -> LoadOutcome {
        if let LoadRequest::Refresh { index, origin } = request {
            let shown = self.history.cursor() == *index;
            let result = self.apply_refresh(*index, origin, result);
            let shown = shown && matches!(result, Reconciled::Refreshed(_));
            return LoadOutcome::Reconciled { result, shown };
        }
        match result {
            Ok(graph) => {
                let origin = request.origin();
                info!(%origin, nodes = graph.nodes.len(), edges = graph.edges.len(), "graph loaded");
                let report = graph.report.clone();
                let viewport = graph.viewport;
                self.adopt(graph.into_snapshot(Some(origin)));
                LoadOutcome::Loaded { report, viewport }
            }
            Err(err) => match request {
                LoadRequest::Remote(url) => {
                    warn!(%url, %err, "remote load failed, showing bundled default");
                    self.show_default();
                    LoadOutcome::FellBack(err)
                }
                _ => {
                    warn!(origin = %request.origin(), %err, "load rejected, keeping current graph");
                    LoadOutcome::Rejected(err)
                }
            },
        }
    }

    /// Applies a history re-fetch of `origin`. The store is only replaced
    /// when the cursor still points at `index`, that entry still holds
    /// `origin`, and the origin returned something new.
    pub fn apply_refresh(
        &mut self,
        index: usize,
        origin: &str,
        result: Result<LoadedGraph, LoadError>,
    ) -> Reconciled {
        let reconciled = self.history.reconcile_with(index, origin, result);
        if let Reconciled::Refreshed(snapshot) = &reconciled
            && self.history.cursor() == index
        {
            self.editor.load(snapshot);
        }
        reconciled
    }

    pub fn import_file(&mut self, path: &Path) -> Result<ImportReport, LoadError> {
        let graph = FileSource.read(path)?;
        let report = graph.report.clone();
        info!(path = %path.display(), nodes = graph.nodes.len(), "imported file");
        self.adopt(graph.into_snapshot(Some(path.display().to_string())));
        Ok(report)
    }

    pub fn export_file(&self, path: &Path) -> Result<(), PersistError> {
        let json = document::to_json(&document::export_snapshot(self.editor.store()))?;
        std::fs::write(path, json).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "exported file");
        Ok(())
    }

    /// Moves back one entry, reconciles it against its origin, and shows it.
    pub fn go_back(&mut self, source: &dyn SnapshotSource) -> Step {
        if self.history.back().is_none() {
            return Step::Boundary;
        }
        self.show_reconciled(source)
    }

    pub fn go_forward(&mut self, source: &dyn SnapshotSource) -> Step {
        if self.history.forward().is_none() {
            return Step::Boundary;
        }
        self.show_reconciled(source)
    }

    pub fn go_to(&mut self, index: usize, source: &dyn SnapshotSource) -> Step {
        match self.history.go_to(index) {
            Navigation::EntryPoint => Step::EntryPoint,
            Navigation::Entry(_) => self.show_reconciled(source),
        }
    }

    /// Non-blocking back: shows the stored entry now and returns the refresh
    /// the caller should run in the background, if the entry has an origin.
    pub fn replay_back(&mut self) -> Option<Option<LoadRequest>> {
        self.history.back()?;
        Some(self.replay_current())
    }

    pub fn replay_forward(&mut self) -> Option<Option<LoadRequest>> {
        self.history.forward()?;
        Some(self.replay_current())
    }

    pub fn replay_to(&mut self, index: usize) -> Option<Option<LoadRequest>> {
        match self.history.go_to(index) {
            Navigation::EntryPoint => None,
            Navigation::Entry(_) => Some(self.replay_current()),
        }
    }

    fn replay_current(&mut self) -> Option<LoadRequest> {
        let snapshot = self.history.current()?.clone();
        self.editor.load(&snapshot);
        snapshot.origin.map(|origin| LoadRequest::Refresh {
            index: self.history.cursor(),
            origin,
        })
    }

    fn show_reconciled(&mut self, source: &dyn SnapshotSource) -> Step {
        let index = self.history.cursor();
        let reconciled = self.history.reconcile(index, source);
        if let Some(snapshot) = reconciled.snapshot() {
            self.editor.load(snapshot);
        }
        Step::Replayed(reconciled)
    }

    fn adopt(&mut self, snapshot: GraphSnapshot) {
        self.editor.load(&snapshot);
        self.history.push(snapshot);
    }
}
