use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use eframe::egui;
use honeycomb::browse::{CollectionSummary, HoneycombApi};
use honeycomb::error::LoadError;
use honeycomb::loader::{LoadRequest, Loader};
use honeycomb::model::Side;
use honeycomb::session::Session;
use honeycomb::settings::Settings;
use honeycomb::source::{FileSource, OriginSource, SnapshotSource};
use honeycomb::ids::IdGenerator;
use tracing::{error, info};

mod actions;
mod command_palette;
mod dialogs;
mod geometry;
mod help;
mod render;
mod update;

#[derive(Clone, Debug)]
enum CanvasDrag {
    Node {
        id: String,
        grab_offset: egui::Vec2,
    },
    Connect {
        source: String,
        side: Side,
        current_world: egui::Pos2,
    },
    Pan,
}

#[derive(Clone, Copy, Debug)]
struct View {
    pan_screen: egui::Vec2,
    zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_screen: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    fn world_to_screen(&self, origin: egui::Pos2, world: egui::Pos2) -> egui::Pos2 {
        origin + self.pan_screen + world.to_vec2() * self.zoom
    }

    fn screen_to_world(&self, origin: egui::Pos2, screen: egui::Pos2) -> egui::Pos2 {
        ((screen - origin - self.pan_screen) / self.zoom).to_pos2()
    }

    fn zoom_about_screen_point(
        &mut self,
        origin: egui::Pos2,
        screen_point: egui::Pos2,
        zoom_delta: f32,
    ) {
        let before = self.screen_to_world(origin, screen_point);
        self.zoom = (self.zoom * zoom_delta).clamp(0.1, 8.0);
        let after_screen = self.world_to_screen(origin, before);
        self.pan_screen += screen_point - after_screen;
    }
}

#[derive(Default)]
struct CollectionsPanel {
    open: bool,
    items: Vec<CollectionSummary>,
    error: Option<String>,
    pending: Option<Receiver<Result<Vec<CollectionSummary>, LoadError>>>,
}

pub struct HoneycombApp {
    session: Session,
    loader: Loader,
    api: Option<HoneycombApi>,
    view: View,
    canvas_origin: egui::Pos2,
    drag: Option<CanvasDrag>,
    settings: Settings,
    settings_path: PathBuf,
    file_path: String,
    status: Option<String>,
    command_palette: command_palette::CommandPalette,
    url_prompt: Option<String>,
    collections: CollectionsPanel,
    show_help: bool,
}

impl HoneycombApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        let (source, api): (Arc<dyn SnapshotSource>, Option<HoneycombApi>) =
            match OriginSource::new(settings.fetch_timeout()) {
                Ok(origin) => {
                    let api = match HoneycombApi::new(&settings.api_base_url, origin.http().clone()) {
                        Ok(api) => Some(api),
                        Err(e) => {
                            error!(%e, "hierarchy API disabled");
                            None
                        }
                    };
                    (Arc::new(origin), api)
                }
                Err(e) => {
                    error!(%e, "http client unavailable, only files can be loaded");
                    (Arc::new(FileSource), None)
                }
            };

        let mut app = Self {
            session: Session::new(IdGenerator::new(settings.id_strategy), settings.history_capacity),
            loader: Loader::new(source, settings.discard_stale_loads),
            api,
            view: View::default(),
            canvas_origin: egui::Pos2::ZERO,
            drag: None,
            file_path: settings.file_path.clone(),
            settings,
            settings_path,
            status: None,
            command_palette: command_palette::CommandPalette::default(),
            url_prompt: None,
            collections: CollectionsPanel::default(),
            show_help: false,
        };
        app.load_entry_point();
        app
    }

    /// Loads the configured start origin, or shows the bundled graph.
    fn load_entry_point(&mut self) {
        match self.settings.effective_start_url() {
            Some(url) => {
                info!(%url, "loading start origin");
                self.loader.request(LoadRequest::Remote(url));
            }
            None => self.session.show_default(),
        }
    }
}
