use std::path::Path;
use std::thread;

use crossbeam_channel::Receiver;
use eframe::egui;
use honeycomb::document::ImportReport;
use honeycomb::history::Reconciled;
use honeycomb::loader::LoadRequest;
use honeycomb::session::LoadOutcome;
use honeycomb::settings;
use tracing::warn;

use super::geometry::to_point;
use super::{HoneycombApp, View};

fn report_suffix(report: &ImportReport) -> String {
    if report.is_clean() {
        return String::new();
    }
    let mut parts = Vec::new();
    if !report.repositioned.is_empty() {
        parts.push(format!("{} node(s) repositioned", report.repositioned.len()));
    }
    if !report.dangling.is_empty() {
        parts.push(format!("{} dangling edge endpoint(s)", report.dangling.len()));
    }
    format!(" ({})", parts.join(", "))
}

/// Runs `job` on a named worker and hands back the receiving end of its
/// single result.
fn spawn_request<T, F>(name: &str, job: F) -> std::io::Result<Receiver<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::Builder::new().name(name.to_string()).spawn(move || {
        let _ = tx.send(job());
    })?;
    Ok(rx)
}

impl HoneycombApp {
    pub(super) fn poll_loads(&mut self) {
        for completion in self.loader.poll() {
            let origin = completion.request.origin();
            let outcome = self.session.apply_completion(completion);
            self.report_outcome(&origin, outcome);
        }
    }

    fn report_outcome(&mut self, origin: &str, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded { report, viewport } => {
                if let Some(viewport) = viewport {
                    self.view = View {
                        pan_screen: egui::vec2(viewport.x as f32, viewport.y as f32),
                        zoom: (viewport.zoom as f32).clamp(0.1, 8.0),
                    };
                }
                self.status = Some(format!("Loaded {origin}{}", report_suffix(&report)));
            }
            LoadOutcome::FellBack(e) => {
                self.status = Some(format!("Could not load {origin}: {e}. Showing the default diagram."));
            }
            LoadOutcome::Rejected(e) => {
                self.status = Some(format!("Import failed: {e}"));
            }
            LoadOutcome::Reconciled {
                result: Reconciled::Refreshed(_),
                shown: true,
            } => {
                self.status = Some(format!("Refreshed from {origin}"));
            }
            LoadOutcome::Reconciled {
                result: Reconciled::Stale { error, .. },
                ..
            } if self.session.history().cursor() == error.index => {
                self.status = Some(format!("Showing cached copy: {error}"));
            }
            LoadOutcome::Reconciled { .. } => {}
        }
    }

    pub(super) fn request_url(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        self.loader.request(LoadRequest::Remote(url.to_string()));
        self.status = Some(format!("Loading {url}..."));
    }

    pub(super) fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.status = Some(format!("Loading {}...", path.display()));
            self.file_path = path.display().to_string();
            self.loader.request(LoadRequest::File(path));
        }
    }

    /// Re-imports the quick-save path synchronously.
    pub(super) fn reload_from_path(&mut self) {
        let path = self.file_path.clone();
        match self.session.import_file(Path::new(&path)) {
            Ok(report) => self.status = Some(format!("Loaded {path}{}", report_suffix(&report))),
            Err(e) => self.status = Some(format!("Import failed: {e}")),
        }
    }

    pub(super) fn save_to_path(&mut self) {
        match self.session.export_file(Path::new(&self.file_path)) {
            Ok(()) => self.status = Some(format!("Saved {}", self.file_path)),
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    pub(super) fn save_as_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.file_path)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.file_path = path.display().to_string();
            self.save_to_path();
            self.persist_settings();
        }
    }

    pub(super) fn open_collection(&mut self, id: &str) {
        let Some(api) = &self.api else {
            return;
        };
        let origin = api.collection_origin(id);
        self.request_url(&origin);
        self.collections.open = false;
    }

    pub(super) fn refresh_collections(&mut self) {
        let Some(api) = self.api.clone() else {
            self.collections.error = Some("No hierarchy service configured".to_string());
            return;
        };
        match spawn_request("honeycomb-collections", move || api.list_collections()) {
            Ok(rx) => {
                self.collections.pending = Some(rx);
                self.collections.error = None;
            }
            Err(e) => {
                warn!(%e, "could not start collection request");
                self.collections.pending = None;
                self.collections.error = Some(format!("Could not start request: {e}"));
            }
        }
    }

    pub(super) fn poll_collections(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.collections.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(items)) => {
                self.collections.items = items;
                self.collections.pending = None;
            }
            Ok(Err(e)) => {
                warn!(%e, "could not list collections");
                self.collections.error = Some(e.to_string());
                self.collections.pending = None;
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {
                ctx.request_repaint_after(std::time::Duration::from_millis(75));
            }
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                self.collections.error = Some("Collection request was dropped".to_string());
                self.collections.pending = None;
            }
        }
    }

    pub(super) fn go_back(&mut self) {
        match self.session.replay_back() {
            Some(refresh) => self.after_replay(refresh),
            None => self.status = Some("Already at the oldest entry".to_string()),
        }
    }

    pub(super) fn go_forward(&mut self) {
        match self.session.replay_forward() {
            Some(refresh) => self.after_replay(refresh),
            None => self.status = Some("Already at the newest entry".to_string()),
        }
    }

    pub(super) fn go_to(&mut self, index: usize) {
        match self.session.replay_to(index) {
            Some(refresh) => self.after_replay(refresh),
            None => self.load_entry_point(),
        }
    }

    fn after_replay(&mut self, refresh: Option<LoadRequest>) {
        self.drag = None;
        if let Some(request) = refresh {
            self.loader.request(request);
        }
        let history = self.session.history();
        self.status = Some(format!("History {}/{}", history.cursor() + 1, history.len()));
    }

    pub(super) fn create_node_at_view_center(&mut self, ctx: &egui::Context) {
        let center = ctx.content_rect().center();
        let world = self.view.screen_to_world(self.canvas_origin, center);
        self.session.editor_mut().create_node_at(to_point(world));
    }

    pub(super) fn undo(&mut self) {
        if !self.session.editor_mut().undo() {
            self.status = Some("Nothing to undo".to_string());
        }
    }

    pub(super) fn redo(&mut self) {
        if !self.session.editor_mut().redo() {
            self.status = Some("Nothing to redo".to_string());
        }
    }

    pub(super) fn open_link(&mut self, ctx: &egui::Context, url: String) {
        self.status = Some(format!("Opening {url}"));
        ctx.open_url(egui::OpenUrl::new_tab(url));
    }

    pub(super) fn toggle_discard_stale(&mut self) {
        self.settings.discard_stale_loads = !self.settings.discard_stale_loads;
        self.loader.set_discard_stale(self.settings.discard_stale_loads);
        self.persist_settings();
    }

    pub(super) fn persist_settings(&mut self) {
        self.settings.file_path = self.file_path.clone();
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }

    pub(super) fn reload_settings(&mut self) {
        let reloaded = settings::load_settings(&self.settings_path).unwrap_or_default();
        self.loader.set_discard_stale(reloaded.discard_stale_loads);
        self.file_path = reloaded.file_path.clone();
        self.settings = reloaded;
        self.status = Some("Settings reloaded".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn worker_result_arrives_on_the_channel() {
        let rx = spawn_request("honeycomb-test", || 42).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }
}
