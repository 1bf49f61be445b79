use eframe::egui;
use honeycomb::interaction::Effect;
use honeycomb::model::Point;

use super::command_palette::{CommandContext, CommandPalette};
use super::geometry::{
    HANDLE_RADIUS, connect_target, edge_at, handle_at, node_at, node_rect_world, side_anchor,
    source_handle, to_point, to_pos2,
};
use super::render::{draw_background, draw_connection_preview, draw_edges, draw_nodes};
use super::{CanvasDrag, HoneycombApp};

impl eframe::App for HoneycombApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loads();
        self.poll_collections(ctx);
        if self.loader.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(75));
        }

        self.handle_shortcuts(ctx);
        self.top_bar(ctx);
        self.status_bar(ctx);
        self.canvas(ctx);
        self.context_menu(ctx);
        self.dialogs(ctx);

        let cx = self.command_context();
        if let Some(cmd) = self.command_palette.ui(ctx, cx) {
            CommandPalette::execute(self, ctx, cmd);
        }
        super::help::draw_help_window(ctx, &mut self.show_help);
    }
}

impl HoneycombApp {
    pub(super) fn command_context(&self) -> CommandContext {
        let editor = self.session.editor();
        let history = self.session.history();
        CommandContext {
            has_undo: editor.can_undo(),
            has_redo: editor.can_redo(),
            can_go_back: history.can_go_back(),
            can_go_forward: history.can_go_forward(),
            has_api: self.api.is_some(),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let modal_open = {
            let interaction = self.session.editor().interaction();
            interaction.is_node_modal_open() || interaction.is_edge_modal_open()
        };
        let mut back = false;
        let mut forward = false;
        ctx.input_mut(|i| {
            if !self.command_palette.open
                && i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::P)
            {
                self.command_palette.open("");
            }
            if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S) {
                self.save_as_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.save_to_path();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                self.open_file_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::L) {
                self.url_prompt = Some(String::new());
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if i.pointer.button_pressed(egui::PointerButton::Extra1) {
                back = true;
            }
            if i.pointer.button_pressed(egui::PointerButton::Extra2) {
                forward = true;
            }

            let skip_shortcuts = wants_keyboard || self.command_palette.open;
            if skip_shortcuts {
                return;
            }
            if i.consume_key(egui::Modifiers::ALT, egui::Key::ArrowLeft) {
                back = true;
            }
            if i.consume_key(egui::Modifiers::ALT, egui::Key::ArrowRight) {
                forward = true;
            }
            if modal_open {
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                    self.session.editor_mut().interaction_mut().cancel_edit();
                }
                return;
            }
            if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
            {
                self.redo();
            } else if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z) {
                self.undo();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                self.drag = None;
                self.session.editor_mut().interaction_mut().close_menu();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete)
                || i.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
            {
                let editor = self.session.editor_mut();
                if !editor.delete_selected_node() {
                    editor.delete_selected_edge();
                }
            }
        });
        if back {
            self.go_back();
        }
        if forward {
            self.go_forward();
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open... (⌘O)").clicked() {
                        self.open_file_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Load URL... (⌘L)").clicked() {
                        self.url_prompt = Some(String::new());
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.api.is_some(), egui::Button::new("Browse collections..."))
                        .clicked()
                    {
                        self.collections.open = true;
                        self.refresh_collections();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Save (⌘S)").clicked() {
                        self.save_to_path();
                        ui.close_menu();
                    }
                    if ui.button("Save As... (⌘⇧S)").clicked() {
                        self.save_as_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.label("Quick save path:");
                    if ui.text_edit_singleline(&mut self.file_path).lost_focus() {
                        self.persist_settings();
                    }
                    if ui.button("Reload from path").clicked() {
                        self.reload_from_path();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Show default diagram").clicked() {
                        self.session.show_default();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let (can_undo, can_redo) = {
                        let editor = self.session.editor();
                        (editor.can_undo(), editor.can_redo())
                    };
                    if ui.add_enabled(can_undo, egui::Button::new("Undo (⌘Z)")).clicked() {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui.add_enabled(can_redo, egui::Button::new("Redo (⌘⇧Z)")).clicked() {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Add node").clicked() {
                        self.create_node_at_view_center(ui.ctx());
                        ui.close_menu();
                    }
                    if ui.button("Reset view").clicked() {
                        self.view = super::View::default();
                        ui.close_menu();
                    }
                });

                ui.menu_button("History", |ui| {
                    let history = self.session.history();
                    let (can_back, can_forward) = (history.can_go_back(), history.can_go_forward());
                    let cursor = history.cursor();
                    let entries: Vec<String> = history
                        .entries()
                        .map(|s| s.origin.clone().unwrap_or_else(|| "(unsaved)".to_string()))
                        .collect();
                    if ui.add_enabled(can_back, egui::Button::new("Back (Alt+←)")).clicked() {
                        self.go_back();
                        ui.close_menu();
                    }
                    if ui.add_enabled(can_forward, egui::Button::new("Forward (Alt+→)")).clicked() {
                        self.go_forward();
                        ui.close_menu();
                    }
                    ui.separator();
                    for (index, origin) in entries.iter().enumerate() {
                        if ui.selectable_label(index == cursor, origin).clicked() {
                            self.go_to(index);
                            ui.close_menu();
                        }
                    }
                    if entries.is_empty() {
                        ui.weak("No visited diagrams");
                    }
                    ui.separator();
                    if ui.button("Start page").clicked() {
                        self.load_entry_point();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Settings", |ui| {
                    let mut discard = self.settings.discard_stale_loads;
                    if ui.checkbox(&mut discard, "Ignore superseded loads").changed() {
                        self.toggle_discard_stale();
                    }
                    ui.label(format!("Service: {}", self.settings.api_base_url));
                    ui.label(format!("Settings file: {}", self.settings_path.display()));
                    if ui.button("Reload settings").clicked() {
                        self.reload_settings();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("Shortcuts (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                    if ui.button("Command palette (⌘⇧P)").clicked() {
                        self.command_palette.open("");
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                } else {
                    ui.label("Ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let store = self.session.editor().store();
                    let history = self.session.history();
                    ui.label(format!("Zoom: {:.0}%", self.view.zoom * 100.0));
                    ui.separator();
                    ui.label(format!("Nodes: {}", store.nodes().len()));
                    ui.separator();
                    ui.label(format!("Edges: {}", store.edges().len()));
                    ui.separator();
                    if history.is_empty() {
                        ui.label("History: -");
                    } else {
                        ui.label(format!("History: {}/{}", history.cursor() + 1, history.len()));
                    }
                    if self.loader.is_busy() {
                        ui.separator();
                        ui.spinner();
                    }
                });
            });
        });
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let origin = rect.min;
            self.canvas_origin = origin;

            let scroll_delta = ctx.input(|i| i.raw_scroll_delta.y);
            if scroll_delta.abs() > 0.0
                && let Some(hover_pos) = ctx.input(|i| i.pointer.hover_pos())
                && rect.contains(hover_pos)
            {
                let zoom_delta = (1.0 + scroll_delta * 0.001).clamp(0.8, 1.25);
                self.view.zoom_about_screen_point(origin, hover_pos, zoom_delta);
            }

            let pointer_pos = ctx.input(|i| i.pointer.interact_pos());
            let pointer_world = pointer_pos.map(|p| self.view.screen_to_world(origin, p));
            let threshold_world = 6.0 / self.view.zoom;
            let handle_radius_world = (HANDLE_RADIUS + 3.0) / self.view.zoom;

            if response.drag_started()
                && let Some(press) = ctx.input(|i| i.pointer.press_origin())
            {
                let world = self.view.screen_to_world(origin, press);
                let store = self.session.editor().store();
                self.drag = if let Some((source, side)) = handle_at(store, world, handle_radius_world) {
                    Some(CanvasDrag::Connect {
                        source,
                        side,
                        current_world: world,
                    })
                } else if let Some(node) = node_at(store, world) {
                    Some(CanvasDrag::Node {
                        id: node.id.clone(),
                        grab_offset: world - to_pos2(node.position),
                    })
                } else {
                    Some(CanvasDrag::Pan)
                };
                if matches!(self.drag, Some(CanvasDrag::Node { .. })) {
                    self.session.editor_mut().begin_node_drag();
                }
            }

            if response.dragged() {
                match &mut self.drag {
                    Some(CanvasDrag::Node { id, grab_offset }) => {
                        if let Some(p) = pointer_world {
                            let position = to_point(p - *grab_offset);
                            self.session.editor_mut().drag_node_to(id, position);
                        }
                    }
                    Some(CanvasDrag::Connect { current_world, .. }) => {
                        if let Some(p) = pointer_world {
                            *current_world = p;
                        }
                    }
                    Some(CanvasDrag::Pan) => self.view.pan_screen += response.drag_delta(),
                    None => {}
                }
            }

            if response.drag_stopped()
                && let Some(CanvasDrag::Connect { source, side, .. }) = self.drag.take()
                && let Some(p) = pointer_world
            {
                let target =
                    connect_target(self.session.editor().store(), &source, side, p, handle_radius_world);
                if let Some((target, target_side)) = target
                    && let Err(e) = self.session.editor_mut().connect(
                        &source,
                        Some(source_handle(side)),
                        &target,
                        target_side,
                    )
                {
                    self.status = Some(format!("Cannot connect: {e}"));
                }
            }
            if response.drag_stopped() {
                self.drag = None;
            }

            if response.secondary_clicked()
                && let (Some(screen), Some(world)) = (pointer_pos, pointer_world)
            {
                let anchor = Point::new(screen.x as f64, screen.y as f64);
                let store = self.session.editor().store();
                let node = node_at(store, world).map(|n| n.id.clone());
                let edge = match node {
                    Some(_) => None,
                    None => edge_at(store, world, threshold_world).map(|e| e.id.clone()),
                };
                let interaction = self.session.editor_mut().interaction_mut();
                match (node, edge) {
                    (Some(id), _) => interaction.open_node_menu(anchor, id),
                    (None, Some(id)) => interaction.open_edge_menu(anchor, id),
                    (None, None) => interaction.open_pane_menu(anchor),
                }
            }

            if response.clicked() {
                self.session.editor_mut().interaction_mut().pane_click();
            }

            if response.double_clicked()
                && let Some(world) = pointer_world
            {
                let store = self.session.editor().store();
                let node = node_at(store, world).map(|n| n.id.clone());
                let edge = edge_at(store, world, threshold_world).map(|e| e.id.clone());
                if let Some(id) = node {
                    if let Some(Effect::OpenLink(url)) = self.session.editor_mut().double_click_node(&id)
                    {
                        self.open_link(ctx, url);
                    }
                } else if let Some(id) = edge {
                    self.session.editor_mut().double_click_edge(&id);
                }
            }

            let painter = ui.painter_at(rect);
            draw_background(&painter, rect, &self.view);
            let editor = self.session.editor();
            let store = editor.store();
            let interaction = editor.interaction();
            let hovered = pointer_world
                .filter(|_| response.hovered() || self.drag.is_some())
                .and_then(|p| node_at(store, p))
                .map(|n| n.id.as_str());
            draw_edges(&painter, origin, &self.view, store, interaction.selected_edge());
            draw_nodes(
                &painter,
                origin,
                &self.view,
                store,
                interaction.selected_node(),
                hovered,
            );
            if let Some(CanvasDrag::Connect {
                source,
                side,
                current_world,
            }) = &self.drag
                && let Some(node) = store.node(source)
            {
                let from = side_anchor(node_rect_world(node), *side);
                draw_connection_preview(
                    &painter,
                    self.view.world_to_screen(origin, from),
                    self.view.world_to_screen(origin, *current_world),
                );
            }
        });
    }

    fn context_menu(&mut self, ctx: &egui::Context) {
        let interaction = self.session.editor().interaction();
        let Some(anchor) = interaction.context_anchor() else {
            return;
        };
        let entries = interaction.menu_entries();
        let pos = to_pos2(anchor);
        let mut chosen = None;
        egui::Area::new(egui::Id::new("canvas_context_menu"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    ui.set_min_width(160.0);
                    for entry in entries {
                        if ui.button(entry.label()).clicked() {
                            chosen = Some(entry);
                        }
                    }
                });
            });
        if let Some(entry) = chosen {
            let world = self.view.screen_to_world(self.canvas_origin, pos);
            self.session.editor_mut().run_menu_entry(entry, to_point(world));
        }
    }
}
