use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help & Commands")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(460.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "⌘⇧P", "Open command palette");
                help_row(ui, "⌘O", "Open diagram file");
                help_row(ui, "⌘L", "Load diagram from URL");
                help_row(ui, "⌘S", "Save to the quick save path");
                help_row(ui, "⌘⇧S", "Save as...");
                help_row(ui, "⌘Z", "Undo");
                help_row(ui, "⌘⇧Z / ⌘Y", "Redo");
                help_row(ui, "F1", "Show this window");
                help_row(ui, "Escape", "Close menu / cancel edit");

                ui.add_space(10.0);
                ui.label("History");
                help_row(ui, "Alt + ←", "Back to the previous diagram");
                help_row(ui, "Alt + →", "Forward");
                help_row(ui, "Mouse back/forward", "Same as Alt + arrows");

                ui.add_space(10.0);
                ui.label("Canvas");
                help_row(ui, "Right-click", "Context menu for node, edge or pane");
                help_row(ui, "Double-click node", "Follow its link, or edit it");
                help_row(ui, "Double-click edge", "Edit the edge");
                help_row(ui, "Drag node", "Move it");
                help_row(ui, "Drag handle", "Connect to another node or handle");
                help_row(ui, "Drag pane", "Pan");
                help_row(ui, "Scroll wheel", "Zoom");
                help_row(ui, "Delete / Backspace", "Delete the node or edge under the open menu");

                ui.add_space(20.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/honeycomb.toml or settings.toml:");
                ui.add_space(5.0);
                ui.code(
                    r##"api_base_url = "http://localhost:6543"
start_url = "http://localhost:6543/api/v1/collections/abc"
history_capacity = 5
fetch_timeout_secs = 4
discard_stale_loads = false
log_filter = "info""##,
                );
                ui.add_space(5.0);
                ui.label("HONEYCOMB_START_URL overrides start_url. HONEYCOMB_LOG overrides log_filter.");

                ui.add_space(20.0);
                ui.heading("File Formats");
                ui.separator();
                ui.label("• Diagrams are JSON documents with nodes, edges and an optional viewport");
                ui.label("• Nodes without a position are placed in a staggered column");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [130.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
