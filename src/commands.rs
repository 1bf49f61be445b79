//! Named editing operations. Each one mutates the graph store in a single
//! step and then clears whatever transient UI state it consumed.

use tracing::debug;

use crate::error::InvariantViolation;
use crate::ids::{IdGenerator, IdPrefix};
use crate::interaction::{Effect, InteractionMachine, MenuEntry};
use crate::model::{Edge, GraphSnapshot, Handle, Node, NodeData, Point};
use crate::store::GraphStore;

pub const DEFAULT_NODE_LABEL: &str = "New node";
const UNDO_LIMIT: usize = 200;

pub struct Editor {
    store: GraphStore,
    interaction: InteractionMachine,
    ids: IdGenerator,
    undo_stack: Vec<GraphSnapshot>,
    redo_stack: Vec<GraphSnapshot>,
}

impl Editor {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            store: GraphStore::new(),
            interaction: InteractionMachine::new(),
            ids,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionMachine {
        &mut self.interaction
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.store.snapshot(None));
        if self.undo_stack.len() > UNDO_LIMIT {
            let overflow = self.undo_stack.len() - UNDO_LIMIT;
            self.undo_stack.drain(0..overflow);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.store.snapshot(None));
        self.store.restore(&prev);
        self.interaction.reset();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.store.snapshot(None));
        self.store.restore(&next);
        self.interaction.reset();
        true
    }

    /// Wholesale replacement used by loads, imports and history replay.
    /// The previous graph stays reachable through undo unless it was empty.
    pub fn load(&mut self, snapshot: &GraphSnapshot) {
        if self.store.is_empty() {
            self.redo_stack.clear();
        } else {
            self.push_undo();
        }
        self.store.restore(snapshot);
        self.interaction.reset();
    }

    pub fn create_node_at(&mut self, position: Point) -> String {
        self.push_undo();
        let id = self.ids.new_id(IdPrefix::Node);
        self.store.add_node(Node::new(
            id.clone(),
            position,
            NodeData::labeled(DEFAULT_NODE_LABEL),
        ));
        self.interaction.close_menu();
        debug!(node = %id, x = position.x, y = position.y, "created node");
        id
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        if !self.store.contains_node(id) {
            return false;
        }
        self.push_undo();
        let removed = self.store.remove_node(id);
        debug!(
            node = id,
            edges = removed.map_or(0, |r| r.edges.len()),
            "deleted node"
        );
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        if self.store.edge(id).is_none() {
            return false;
        }
        self.push_undo();
        self.store.remove_edge(id);
        debug!(edge = id, "deleted edge");
        true
    }

    pub fn delete_selected_node(&mut self) -> bool {
        let Some(id) = self.interaction.selected_node().map(str::to_string) else {
            return false;
        };
        let deleted = self.delete_node(&id);
        self.interaction.close_menu();
        deleted
    }

    pub fn delete_selected_edge(&mut self) -> bool {
        let Some(id) = self.interaction.selected_edge().map(str::to_string) else {
            return false;
        };
        let deleted = self.delete_edge(&id);
        self.interaction.close_menu();
        deleted
    }

    pub fn duplicate_selected_node(&mut self) -> Option<String> {
        let id = self.interaction.selected_node()?.to_string();
        self.interaction.close_menu();
        if !self.store.contains_node(&id) {
            return None;
        }
        self.push_undo();
        let new_id = self.ids.new_id(IdPrefix::Node);
        self.store.duplicate_node(&id, new_id.clone());
        Some(new_id)
    }

    /// Connects two handles. Self-loops are allowed. The edge id is derived
    /// from all four parts, so reconnecting the same handles overwrites the
    /// earlier edge instead of adding a parallel one.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: Option<Handle>,
        target: &str,
        target_handle: Option<Handle>,
    ) -> Result<String, InvariantViolation> {
        for endpoint in [source, target] {
            if !self.store.contains_node(endpoint) {
                return Err(InvariantViolation::MissingNode(endpoint.to_string()));
            }
        }
        self.push_undo();
        let id = Edge::connection_id(source, source_handle, target, target_handle);
        let mut edge = Edge::new(id.clone(), source, target);
        edge.source_handle = source_handle;
        edge.target_handle = target_handle;
        self.store.upsert_edge(edge);
        debug!(edge = %id, "connected");
        Ok(id)
    }

    pub fn edit_node(&mut self, id: &str, data: NodeData) -> bool {
        if !self.store.contains_node(id) {
            self.interaction.cancel_edit();
            return false;
        }
        self.push_undo();
        self.store.update_node_data(id, data);
        self.interaction.cancel_edit();
        true
    }

    pub fn edit_edge(&mut self, id: &str, record: Edge) -> bool {
        if self.store.edge(id).is_none() {
            self.interaction.cancel_edit();
            return false;
        }
        self.push_undo();
        self.store.update_edge(id, record);
        self.interaction.cancel_edit();
        true
    }

    /// Commits the open node modal's draft.
    pub fn save_node_edit(&mut self) -> bool {
        match self.interaction.take_node_draft() {
            Some(draft) => self.edit_node(&draft.id, draft.data),
            None => false,
        }
    }

    pub fn save_edge_edit(&mut self) -> bool {
        match self.interaction.take_edge_draft() {
            Some(draft) => {
                let id = draft.id.clone();
                self.edit_edge(&id, draft)
            }
            None => false,
        }
    }

    pub fn toggle_edge_direction(&mut self) -> bool {
        self.with_selected_edge(GraphStore::toggle_edge_arrow_direction)
    }

    pub fn toggle_edge_line_variant(&mut self) -> bool {
        self.with_selected_edge(GraphStore::toggle_edge_line_variant)
    }

    pub fn toggle_edge_arrow(&mut self) -> bool {
        self.with_selected_edge(GraphStore::toggle_edge_arrow)
    }

    fn with_selected_edge(&mut self, op: fn(&mut GraphStore, &str) -> bool) -> bool {
        let Some(id) = self.interaction.selected_edge().map(str::to_string) else {
            return false;
        };
        self.interaction.close_menu();
        if self.store.edge(&id).is_none() {
            return false;
        }
        self.push_undo();
        op(&mut self.store, &id)
    }

    /// Records the pre-drag state so the whole drag undoes as one step.
    pub fn begin_node_drag(&mut self) {
        self.push_undo();
    }

    pub fn drag_node_to(&mut self, id: &str, position: Point) -> bool {
        self.store.move_node(id, position)
    }

    pub fn double_click_node(&mut self, id: &str) -> Option<Effect> {
        let node = self.store.node(id)?.clone();
        self.interaction.double_click_node(&node)
    }

    pub fn double_click_edge(&mut self, id: &str) {
        if let Some(edge) = self.store.edge(id).cloned() {
            self.interaction.double_click_edge(&edge);
        }
    }

    /// Runs a context-menu entry against the menu's current subject.
    /// `canvas_point` is the menu anchor already mapped into canvas space.
    pub fn run_menu_entry(&mut self, entry: MenuEntry, canvas_point: Point) {
        match entry {
            MenuEntry::CreateNode => {
                self.create_node_at(canvas_point);
            }
            MenuEntry::EditNode => {
                let node = self
                    .interaction
                    .selected_node()
                    .and_then(|id| self.store.node(id))
                    .cloned();
                match node {
                    Some(node) => self.interaction.open_node_editor(&node),
                    None => self.interaction.close_menu(),
                }
            }
            MenuEntry::DuplicateNode => {
                self.duplicate_selected_node();
            }
            MenuEntry::DeleteNode => {
                self.delete_selected_node();
            }
            MenuEntry::EditEdge => {
                let edge = self
                    .interaction
                    .selected_edge()
                    .and_then(|id| self.store.edge(id))
                    .cloned();
                match edge {
                    Some(edge) => self.interaction.open_edge_editor(&edge),
                    None => self.interaction.close_menu(),
                }
            }
            MenuEntry::ToggleEdgeDirection => {
                self.toggle_edge_direction();
            }
            MenuEntry::ToggleEdgeLineVariant => {
                self.toggle_edge_line_variant();
            }
            MenuEntry::ToggleEdgeArrow => {
                self.toggle_edge_arrow();
            }
            MenuEntry::DeleteEdge => {
                self.delete_selected_edge();
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(IdGenerator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HandleRole, LineStyle, Side};

    fn editor_with_nodes(ids: &[&str]) -> Editor {
        let mut editor = Editor::default();
        let nodes = ids
            .iter()
            .map(|id| Node::new(*id, Point::default(), NodeData::labeled(*id)))
            .collect();
        editor.load(&GraphSnapshot::new(nodes, Vec::new(), None));
        editor
    }

    const RIGHT_OUT: Option<Handle> = Some(Handle::new(Side::Right, HandleRole::Source));
    const LEFT_IN: Option<Handle> = Some(Handle::new(Side::Left, HandleRole::Target));

    #[test]
    fn create_node_uses_anchor_and_closes_menu() {
        let mut editor = Editor::default();
        editor.interaction_mut().open_pane_menu(Point::new(400.0, 300.0));
        editor.run_menu_entry(MenuEntry::CreateNode, Point::new(12.0, 34.0));
        let node = &editor.store().nodes()[0];
        assert_eq!(node.position, Point::new(12.0, 34.0));
        assert_eq!(node.data.label, DEFAULT_NODE_LABEL);
        assert!(node.id.starts_with("node-"));
        assert!(editor.interaction().is_idle());
    }

    #[test]
    fn connect_twice_keeps_one_edge() {
        let mut editor = editor_with_nodes(&["a", "b"]);
        let first = editor.connect("a", RIGHT_OUT, "b", LEFT_IN).unwrap();

        editor.interaction_mut().open_edge_menu(Point::default(), first.clone());
        editor.toggle_edge_line_variant();
        assert!(editor.store().edge(&first).unwrap().arrow.has_arrow);

        let second = editor.connect("a", RIGHT_OUT, "b", LEFT_IN).unwrap();
        assert_eq!(first, second);
        assert_eq!(editor.store().edges().len(), 1);
        let edge = editor.store().edge(&second).unwrap();
        assert!(!edge.arrow.has_arrow);
        assert_eq!(edge.line_style, LineStyle::Solid);
    }

    #[test]
    fn different_handles_make_parallel_edges() {
        let mut editor = editor_with_nodes(&["a", "b"]);
        editor.connect("a", RIGHT_OUT, "b", LEFT_IN).unwrap();
        editor.connect("a", None, "b", None).unwrap();
        assert_eq!(editor.store().edges().len(), 2);
    }

    #[test]
    fn self_loops_are_allowed() {
        let mut editor = editor_with_nodes(&["a"]);
        let id = editor.connect("a", RIGHT_OUT, "a", LEFT_IN).unwrap();
        assert_eq!(editor.store().edge(&id).unwrap().target, "a");
    }

    #[test]
    fn connect_to_missing_node_is_rejected() {
        let mut editor = editor_with_nodes(&["a"]);
        let before = editor.store().clone();
        let err = editor.connect("a", None, "ghost", None).unwrap_err();
        assert_eq!(err, InvariantViolation::MissingNode("ghost".into()));
        assert_eq!(editor.store(), &before);
    }

    #[test]
    fn delete_selected_node_cascades_and_clears_subject() {
        let mut editor = editor_with_nodes(&["a", "b"]);
        editor.connect("a", None, "b", None).unwrap();
        editor.interaction_mut().open_node_menu(Point::default(), "a");
        assert!(editor.delete_selected_node());
        assert!(editor.store().edges().is_empty());
        assert!(editor.interaction().is_idle());
    }

    #[test]
    fn delete_without_subject_is_a_no_op() {
        let mut editor = editor_with_nodes(&["a"]);
        assert!(!editor.delete_selected_node());
        assert!(!editor.delete_selected_edge());
        assert_eq!(editor.store().nodes().len(), 1);
    }

    #[test]
    fn stale_subject_after_concurrent_delete_is_harmless() {
        let mut editor = editor_with_nodes(&["a", "b"]);
        let id = editor.connect("a", None, "b", None).unwrap();
        editor.interaction_mut().open_edge_menu(Point::default(), id.clone());
        editor.delete_edge(&id);
        assert!(!editor.toggle_edge_direction());
        assert!(editor.interaction().is_idle());
    }

    #[test]
    fn node_modal_save_commits_draft() {
        let mut editor = editor_with_nodes(&["a"]);
        editor.double_click_node("a");
        editor.interaction_mut().node_draft_mut().unwrap().data.label = "Renamed".into();
        assert!(editor.save_node_edit());
        assert_eq!(editor.store().node("a").unwrap().data.label, "Renamed");
        assert!(editor.interaction().is_idle());
    }

    #[test]
    fn node_modal_cancel_discards_draft() {
        let mut editor = editor_with_nodes(&["a"]);
        editor.double_click_node("a");
        editor.interaction_mut().node_draft_mut().unwrap().data.label = "Renamed".into();
        editor.interaction_mut().cancel_edit();
        assert_eq!(editor.store().node("a").unwrap().data.label, "a");
    }

    #[test]
    fn edge_modal_save_replaces_record() {
        let mut editor = editor_with_nodes(&["a", "b"]);
        let id = editor.connect("a", None, "b", None).unwrap();
        editor.double_click_edge(&id);
        {
            let draft = editor.interaction_mut().edge_draft_mut().unwrap();
            draft.label = Some("depends on".into());
            draft.line_style = LineStyle::Dashed;
        }
        assert!(editor.save_edge_edit());
        let edge = editor.store().edge(&id).unwrap();
        assert_eq!(edge.label.as_deref(), Some("depends on"));
        assert_eq!(edge.line_style, LineStyle::Dashed);
    }

    #[test]
    fn undo_and_redo_walk_edit_history() {
        let mut editor = editor_with_nodes(&["a"]);
        editor.create_node_at(Point::new(1.0, 1.0));
        assert_eq!(editor.store().nodes().len(), 2);
        assert!(editor.undo());
        assert_eq!(editor.store().nodes().len(), 1);
        assert!(editor.redo());
        assert_eq!(editor.store().nodes().len(), 2);
        assert!(!editor.redo());
    }

    #[test]
    fn drag_is_a_single_undo_step() {
        let mut editor = editor_with_nodes(&["a"]);
        editor.begin_node_drag();
        for i in 1..10 {
            editor.drag_node_to("a", Point::new(i as f64, 0.0));
        }
        editor.undo();
        assert_eq!(editor.store().node("a").unwrap().position, Point::default());
    }

    #[test]
    fn duplicate_from_menu() {
        let mut editor = editor_with_nodes(&["a"]);
        editor.interaction_mut().open_node_menu(Point::default(), "a");
        let copy = editor.duplicate_selected_node().unwrap();
        assert_ne!(copy, "a");
        assert_eq!(editor.store().nodes().len(), 2);
    }
}
