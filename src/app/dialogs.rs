use eframe::egui;
use honeycomb::model::{EdgeVariant, LineStyle};
use honeycomb::theme::ThemeColor;

use super::HoneycombApp;
use super::render::color;

fn optional_text(ui: &mut egui::Ui, value: &mut Option<String>, hint: &str) {
    let mut text = value.clone().unwrap_or_default();
    let resp = ui.add(egui::TextEdit::singleline(&mut text).hint_text(hint));
    if resp.changed() {
        *value = (!text.trim().is_empty()).then_some(text);
    }
}

fn modal(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
}

impl HoneycombApp {
    pub(super) fn dialogs(&mut self, ctx: &egui::Context) {
        self.node_editor(ctx);
        self.edge_editor(ctx);
        self.url_prompt_window(ctx);
        self.collections_window(ctx);
    }

    fn node_editor(&mut self, ctx: &egui::Context) {
        let mut save = false;
        let mut cancel = false;
        let Some(draft) = self.session.editor_mut().interaction_mut().node_draft_mut() else {
            return;
        };
        modal("Edit node").show(ctx, |ui| {
            egui::Grid::new("node_edit_grid").num_columns(2).show(ui, |ui| {
                ui.label("Label");
                ui.text_edit_singleline(&mut draft.data.label);
                ui.end_row();

                ui.label("Color");
                let current = draft.data.theme_color;
                egui::ComboBox::from_id_salt("node_theme_color")
                    .selected_text(egui::RichText::new(current.key()).color(color(current.rgb())))
                    .show_ui(ui, |ui| {
                        for c in ThemeColor::ALL {
                            ui.selectable_value(
                                &mut draft.data.theme_color,
                                c,
                                egui::RichText::new(c.key()).color(color(c.rgb())),
                            );
                        }
                    });
                ui.end_row();

                ui.label("Link");
                optional_text(ui, &mut draft.data.url, "https://");
                ui.end_row();

                ui.label("Icon");
                optional_text(ui, &mut draft.data.icon_url, "https://");
                ui.end_row();
            });
            ui.separator();
            ui.horizontal(|ui| {
                save = ui.button("Save").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });
        if save {
            self.session.editor_mut().save_node_edit();
        } else if cancel {
            self.session.editor_mut().interaction_mut().cancel_edit();
        }
    }

    fn edge_editor(&mut self, ctx: &egui::Context) {
        let mut save = false;
        let mut cancel = false;
        let Some(draft) = self.session.editor_mut().interaction_mut().edge_draft_mut() else {
            return;
        };
        modal("Edit edge").show(ctx, |ui| {
            egui::Grid::new("edge_edit_grid").num_columns(2).show(ui, |ui| {
                ui.label("Label");
                optional_text(ui, &mut draft.label, "");
                ui.end_row();

                ui.label("Line");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut draft.line_style, LineStyle::Solid, "Solid");
                    ui.radio_value(&mut draft.line_style, LineStyle::Dashed, "Dashed");
                });
                ui.end_row();

                ui.label("Arrow");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut draft.arrow.has_arrow, "Show");
                    ui.add_enabled(
                        draft.arrow.has_arrow,
                        egui::Checkbox::new(&mut draft.arrow.is_reversed, "Reversed"),
                    );
                });
                ui.end_row();

                ui.label("Variant");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut draft.variant, EdgeVariant::Plain, "Plain");
                    ui.radio_value(&mut draft.variant, EdgeVariant::Labeled, "Labeled");
                });
                ui.end_row();

                ui.label("Color");
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_salt("edge_color")
                        .selected_text(draft.color.as_deref().unwrap_or("endpoints"))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut draft.color, None, "endpoints");
                            for c in ThemeColor::ALL {
                                ui.selectable_value(
                                    &mut draft.color,
                                    Some(c.hex().to_string()),
                                    egui::RichText::new(c.key()).color(color(c.rgb())),
                                );
                            }
                        });
                    optional_text(ui, &mut draft.color, "#rrggbb");
                });
                ui.end_row();
            });
            ui.separator();
            ui.horizontal(|ui| {
                save = ui.button("Save").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });
        if save {
            self.session.editor_mut().save_edge_edit();
        } else if cancel {
            self.session.editor_mut().interaction_mut().cancel_edit();
        }
    }

    fn url_prompt_window(&mut self, ctx: &egui::Context) {
        let Some(url) = &mut self.url_prompt else {
            return;
        };
        let mut submit = false;
        let mut cancel = false;
        modal("Load URL").show(ctx, |ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(url)
                    .desired_width(360.0)
                    .hint_text("https://example.com/diagram.json"),
            );
            resp.request_focus();
            if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.horizontal(|ui| {
                submit |= ui.button("Load").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });
        if submit {
            if let Some(url) = self.url_prompt.take() {
                self.request_url(&url);
            }
        } else if cancel || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.url_prompt = None;
        }
    }

    fn collections_window(&mut self, ctx: &egui::Context) {
        if !self.collections.open {
            return;
        }
        let mut open = true;
        let mut chosen = None;
        let mut refresh = false;
        egui::Window::new("Collections")
            .open(&mut open)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    refresh = ui.button("Refresh").clicked();
                    if self.collections.pending.is_some() {
                        ui.spinner();
                    }
                });
                if let Some(e) = &self.collections.error {
                    ui.colored_label(ui.visuals().error_fg_color, e);
                }
                ui.separator();
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for item in &self.collections.items {
                        let title = match &item.icon {
                            Some(icon) => format!("{icon} {}", item.title),
                            None => item.title.clone(),
                        };
                        if ui.selectable_label(false, title).clicked() {
                            chosen = Some(item.id.clone());
                        }
                    }
                    if self.collections.items.is_empty() && self.collections.pending.is_none() {
                        ui.weak("No collections");
                    }
                });
            });
        self.collections.open = open;
        if refresh {
            self.refresh_collections();
        }
        if let Some(id) = chosen {
            self.open_collection(&id);
        }
    }
}
