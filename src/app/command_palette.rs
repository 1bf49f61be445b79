use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::HoneycombApp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandId {
    Undo,
    Redo,
    AddNode,
    Open,
    Reload,
    Save,
    SaveAs,
    LoadUrl,
    BrowseCollections,
    ShowDefault,
    Back,
    Forward,
    StartPage,
    ResetView,
    ToggleDiscardStale,
    ReloadSettings,
    Help,
}

pub(super) struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub search: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { id: CommandId::Undo, name: "Edit: Undo", search: "undo" },
    CommandSpec { id: CommandId::Redo, name: "Edit: Redo", search: "redo" },
    CommandSpec { id: CommandId::AddNode, name: "Edit: Add node", search: "add create new node cell" },
    CommandSpec { id: CommandId::Open, name: "File: Open", search: "open load import file json" },
    CommandSpec { id: CommandId::Reload, name: "File: Reload from path", search: "reload import file path" },
    CommandSpec { id: CommandId::Save, name: "File: Save", search: "save export file json" },
    CommandSpec { id: CommandId::SaveAs, name: "File: Save as", search: "save as export file json" },
    CommandSpec { id: CommandId::LoadUrl, name: "File: Load URL", search: "load url remote http fetch" },
    CommandSpec { id: CommandId::BrowseCollections, name: "File: Browse collections", search: "browse collections honeycomb service" },
    CommandSpec { id: CommandId::ShowDefault, name: "File: Show default diagram", search: "default bundled diagram" },
    CommandSpec { id: CommandId::Back, name: "History: Back", search: "back previous history" },
    CommandSpec { id: CommandId::Forward, name: "History: Forward", search: "forward next history" },
    CommandSpec { id: CommandId::StartPage, name: "History: Start page", search: "start entry home history" },
    CommandSpec { id: CommandId::ResetView, name: "View: Reset", search: "reset view zoom pan" },
    CommandSpec { id: CommandId::ToggleDiscardStale, name: "Settings: Toggle ignoring superseded loads", search: "stale superseded loads discard settings" },
    CommandSpec { id: CommandId::ReloadSettings, name: "Settings: Reload", search: "reload settings config" },
    CommandSpec { id: CommandId::Help, name: "Help: Shortcuts", search: "help shortcuts keys" },
];

#[derive(Default)]
pub(super) struct CommandPalette {
    pub open: bool,
    pub query: String,
    cursor: usize,
    focus_pending: bool,
}

#[derive(Clone, Copy)]
pub(super) struct CommandContext {
    pub has_undo: bool,
    pub has_redo: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub has_api: bool,
}

struct PaletteKeys {
    dismiss: bool,
    down: bool,
    up: bool,
    run: bool,
}

impl CommandPalette {
    pub fn open(&mut self, query: impl Into<String>) {
        self.open = true;
        self.query = query.into();
        self.cursor = 0;
        self.focus_pending = true;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    fn is_enabled(cx: CommandContext, id: CommandId) -> bool {
        match id {
            CommandId::Undo => cx.has_undo,
            CommandId::Redo => cx.has_redo,
            CommandId::Back => cx.can_go_back,
            CommandId::Forward => cx.can_go_forward,
            CommandId::BrowseCollections => cx.has_api,
            _ => true,
        }
    }

    pub(super) fn execute(app: &mut HoneycombApp, ctx: &egui::Context, id: CommandId) {
        match id {
            CommandId::Undo => app.undo(),
            CommandId::Redo => app.redo(),
            CommandId::AddNode => app.create_node_at_view_center(ctx),
            CommandId::Open => app.open_file_dialog(),
            CommandId::Reload => app.reload_from_path(),
            CommandId::Save => app.save_to_path(),
            CommandId::SaveAs => app.save_as_dialog(),
            CommandId::LoadUrl => app.url_prompt = Some(String::new()),
            CommandId::BrowseCollections => {
                app.collections.open = true;
                app.refresh_collections();
            }
            CommandId::ShowDefault => app.session.show_default(),
            CommandId::Back => app.go_back(),
            CommandId::Forward => app.go_forward(),
            CommandId::StartPage => app.load_entry_point(),
            CommandId::ResetView => app.view = super::View::default(),
            CommandId::ToggleDiscardStale => app.toggle_discard_stale(),
            CommandId::ReloadSettings => app.reload_settings(),
            CommandId::Help => app.show_help = true,
        }
        ctx.request_repaint();
    }

    /// Commands matching the query, best score first. An empty query lists
    /// everything in declaration order.
    fn ranked(&self) -> Vec<&'static CommandSpec> {
        let query = self.query.trim();
        if query.is_empty() {
            return COMMANDS.iter().collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<_> = COMMANDS
            .iter()
            .filter_map(|c| matcher.fuzzy_match(c.search, query).map(|score| (score, c)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(b.1.name)));
        scored.into_iter().map(|(_, c)| c).collect()
    }

    pub fn ui(&mut self, ctx: &egui::Context, cx: CommandContext) -> Option<CommandId> {
        if !self.open {
            return None;
        }
        let keys = ctx.input(|i| PaletteKeys {
            dismiss: i.key_pressed(egui::Key::Escape),
            down: i.key_pressed(egui::Key::ArrowDown),
            up: i.key_pressed(egui::Key::ArrowUp),
            run: i.key_pressed(egui::Key::Enter),
        });
        if keys.dismiss {
            self.close();
            return None;
        }
        let ranked = self.ranked();
        let last = ranked.len().saturating_sub(1);
        self.cursor = self.cursor.min(last);
        if keys.down {
            self.cursor = (self.cursor + 1).min(last);
        }
        if keys.up {
            self.cursor = self.cursor.saturating_sub(1);
        }

        let mut clicked = None;
        let width = 520.0;
        let screen = ctx.content_rect();
        egui::Area::new(egui::Id::new("command_palette"))
            .fixed_pos(egui::pos2(screen.center().x - width * 0.5, screen.top() + 48.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).inner_margin(10.0).show(ui, |ui| {
                    ui.set_width(width);
                    let input = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(f32::INFINITY)
                            .hint_text("Type a command"),
                    );
                    if std::mem::take(&mut self.focus_pending) {
                        input.request_focus();
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                        for (idx, command) in ranked.iter().enumerate() {
                            let button = egui::Button::new(command.name).selected(idx == self.cursor);
                            if ui.add_enabled(Self::is_enabled(cx, command.id), button).clicked() {
                                clicked = Some(idx);
                            }
                        }
                    });
                });
            });

        let chosen = clicked.or(keys.run.then_some(self.cursor))?;
        let command = ranked.get(chosen).filter(|c| Self::is_enabled(cx, c.id))?;
        self.close();
        Some(command.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CommandContext {
        CommandContext {
            has_undo: false,
            has_redo: false,
            can_go_back: true,
            can_go_forward: false,
            has_api: false,
        }
    }

    #[test]
    fn fuzzy_query_ranks_matching_commands() {
        let mut palette = CommandPalette::default();
        palette.open("back");
        let ranked = palette.ranked();
        assert_eq!(ranked.first().map(|c| c.id), Some(CommandId::Back));
    }

    #[test]
    fn history_and_service_commands_follow_context() {
        let cx = context();
        assert!(CommandPalette::is_enabled(cx, CommandId::Back));
        assert!(!CommandPalette::is_enabled(cx, CommandId::Forward));
        assert!(!CommandPalette::is_enabled(cx, CommandId::BrowseCollections));
        assert!(!CommandPalette::is_enabled(cx, CommandId::Undo));
        assert!(CommandPalette::is_enabled(cx, CommandId::Save));
    }
}
