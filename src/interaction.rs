//! Transient editor UI state: the open context menu, or the node/edge being
//! edited in a modal. At most one of those is open at any time.

use crate::model::{Edge, Node, Point};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuSubject {
    Node(String),
    Edge(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    ContextMenuOpen {
        /// Screen position the menu was opened at.
        anchor: Point,
        subject: Option<MenuSubject>,
    },
    NodeEditing {
        draft: Node,
    },
    EdgeEditing {
        draft: Edge,
    },
}

/// Side effects the host has to carry out on the machine's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    OpenLink(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    CreateNode,
    EditNode,
    DuplicateNode,
    DeleteNode,
    EditEdge,
    ToggleEdgeDirection,
    ToggleEdgeLineVariant,
    ToggleEdgeArrow,
    DeleteEdge,
}

impl MenuEntry {
    pub fn label(self) -> &'static str {
        match self {
            MenuEntry::CreateNode => "Create node",
            MenuEntry::EditNode => "Edit node",
            MenuEntry::DuplicateNode => "Duplicate node",
            MenuEntry::DeleteNode => "Delete node",
            MenuEntry::EditEdge => "Edit line",
            MenuEntry::ToggleEdgeDirection => "Reverse direction",
            MenuEntry::ToggleEdgeLineVariant => "Switch line type",
            MenuEntry::ToggleEdgeArrow => "Toggle arrow",
            MenuEntry::DeleteEdge => "Delete line",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn open_pane_menu(&mut self, anchor: Point) {
        self.state = InteractionState::ContextMenuOpen {
            anchor,
            subject: None,
        };
    }

    pub fn open_node_menu(&mut self, anchor: Point, node_id: impl Into<String>) {
        self.state = InteractionState::ContextMenuOpen {
            anchor,
            subject: Some(MenuSubject::Node(node_id.into())),
        };
    }

    pub fn open_edge_menu(&mut self, anchor: Point, edge_id: impl Into<String>) {
        self.state = InteractionState::ContextMenuOpen {
            anchor,
            subject: Some(MenuSubject::Edge(edge_id.into())),
        };
    }

    pub fn close_menu(&mut self) {
        if matches!(self.state, InteractionState::ContextMenuOpen { .. }) {
            self.state = InteractionState::Idle;
        }
    }

    /// Left click on empty canvas. Only dismisses a menu; open modals stay.
    pub fn pane_click(&mut self) {
        self.close_menu();
    }

    pub fn double_click_node(&mut self, node: &Node) -> Option<Effect> {
        if let Some(url) = node.data.link() {
            return Some(Effect::OpenLink(url.to_string()));
        }
        self.open_node_editor(node);
        None
    }

    pub fn double_click_edge(&mut self, edge: &Edge) {
        self.open_edge_editor(edge);
    }

    /// Replaces whatever is open, discarding any edge draft.
    pub fn open_node_editor(&mut self, node: &Node) {
        self.state = InteractionState::NodeEditing {
            draft: node.clone(),
        };
    }

    pub fn open_edge_editor(&mut self, edge: &Edge) {
        self.state = InteractionState::EdgeEditing {
            draft: edge.clone(),
        };
    }

    pub fn cancel_edit(&mut self) {
        if matches!(
            self.state,
            InteractionState::NodeEditing { .. } | InteractionState::EdgeEditing { .. }
        ) {
            self.state = InteractionState::Idle;
        }
    }

    pub fn node_draft_mut(&mut self) -> Option<&mut Node> {
        match &mut self.state {
            InteractionState::NodeEditing { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn edge_draft_mut(&mut self) -> Option<&mut Edge> {
        match &mut self.state {
            InteractionState::EdgeEditing { draft } => Some(draft),
            _ => None,
        }
    }

    /// Closes the node modal and hands back its draft for committing.
    pub fn take_node_draft(&mut self) -> Option<Node> {
        match std::mem::take(&mut self.state) {
            InteractionState::NodeEditing { draft } => Some(draft),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn take_edge_draft(&mut self) -> Option<Edge> {
        match std::mem::take(&mut self.state) {
            InteractionState::EdgeEditing { draft } => Some(draft),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn context_anchor(&self) -> Option<Point> {
        match &self.state {
            InteractionState::ContextMenuOpen { anchor, .. } => Some(*anchor),
            _ => None,
        }
    }

    pub fn menu_subject(&self) -> Option<&MenuSubject> {
        match &self.state {
            InteractionState::ContextMenuOpen { subject, .. } => subject.as_ref(),
            _ => None,
        }
    }

    /// Node the open context menu targets.
    pub fn selected_node(&self) -> Option<&str> {
        match self.menu_subject() {
            Some(MenuSubject::Node(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn selected_edge(&self) -> Option<&str> {
        match self.menu_subject() {
            Some(MenuSubject::Edge(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn is_node_modal_open(&self) -> bool {
        matches!(self.state, InteractionState::NodeEditing { .. })
    }

    pub fn is_edge_modal_open(&self) -> bool {
        matches!(self.state, InteractionState::EdgeEditing { .. })
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        match &self.state {
            InteractionState::ContextMenuOpen { subject, .. } => match subject {
                None => vec![MenuEntry::CreateNode],
                Some(MenuSubject::Node(_)) => vec![
                    MenuEntry::EditNode,
                    MenuEntry::DuplicateNode,
                    MenuEntry::DeleteNode,
                ],
                Some(MenuSubject::Edge(_)) => vec![
                    MenuEntry::EditEdge,
                    MenuEntry::ToggleEdgeDirection,
                    MenuEntry::ToggleEdgeLineVariant,
                    MenuEntry::ToggleEdgeArrow,
                    MenuEntry::DeleteEdge,
                ],
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeData;

    fn node(id: &str, url: Option<&str>) -> Node {
        let mut data = NodeData::labeled(id);
        data.url = url.map(str::to_string);
        Node::new(id, Point::default(), data)
    }

    fn open_count(m: &InteractionMachine) -> usize {
        [
            m.context_anchor().is_some(),
            m.is_node_modal_open(),
            m.is_edge_modal_open(),
        ]
        .into_iter()
        .filter(|open| *open)
        .count()
    }

    #[test]
    fn pane_menu_offers_only_create() {
        let mut m = InteractionMachine::new();
        m.open_pane_menu(Point::new(5.0, 6.0));
        assert_eq!(m.menu_entries(), vec![MenuEntry::CreateNode]);
        assert_eq!(m.context_anchor(), Some(Point::new(5.0, 6.0)));
        assert_eq!(m.selected_node(), None);
    }

    #[test]
    fn node_and_edge_menus_carry_their_subject() {
        let mut m = InteractionMachine::new();
        m.open_node_menu(Point::default(), "n1");
        assert_eq!(m.selected_node(), Some("n1"));
        assert!(m.menu_entries().contains(&MenuEntry::DeleteNode));

        m.open_edge_menu(Point::default(), "e1");
        assert_eq!(m.selected_node(), None);
        assert_eq!(m.selected_edge(), Some("e1"));
        assert!(m.menu_entries().contains(&MenuEntry::ToggleEdgeDirection));
        assert!(m.menu_entries().contains(&MenuEntry::ToggleEdgeLineVariant));
    }

    #[test]
    fn pane_click_clears_the_menu_subject() {
        let mut m = InteractionMachine::new();
        m.open_node_menu(Point::default(), "n1");
        m.pane_click();
        assert!(m.is_idle());
        assert_eq!(m.selected_node(), None);
    }

    #[test]
    fn double_click_on_linked_node_only_opens_link() {
        let mut m = InteractionMachine::new();
        m.open_pane_menu(Point::default());
        let effect = m.double_click_node(&node("n", Some("https://example.org")));
        assert_eq!(effect, Some(Effect::OpenLink("https://example.org".into())));
        assert!(!m.is_node_modal_open());
        assert!(m.context_anchor().is_some());
    }

    #[test]
    fn double_click_on_plain_node_opens_editor_and_closes_menu() {
        let mut m = InteractionMachine::new();
        m.open_pane_menu(Point::default());
        assert_eq!(m.double_click_node(&node("n", None)), None);
        assert!(m.is_node_modal_open());
        assert_eq!(open_count(&m), 1);
    }

    #[test]
    fn opening_node_modal_discards_edge_draft() {
        let mut m = InteractionMachine::new();
        m.double_click_edge(&Edge::new("e", "a", "b"));
        m.edge_draft_mut().unwrap().label = Some("unsaved".into());
        m.open_node_editor(&node("n", None));
        assert_eq!(open_count(&m), 1);
        assert!(m.is_node_modal_open());
        assert!(m.take_edge_draft().is_none());
        assert!(m.is_node_modal_open());
    }

    #[test]
    fn take_draft_closes_modal() {
        let mut m = InteractionMachine::new();
        m.open_node_editor(&node("n", None));
        m.node_draft_mut().unwrap().data.label = "renamed".into();
        let draft = m.take_node_draft().unwrap();
        assert_eq!(draft.data.label, "renamed");
        assert!(m.is_idle());
    }

    #[test]
    fn cancel_does_not_touch_an_open_menu() {
        let mut m = InteractionMachine::new();
        m.open_pane_menu(Point::default());
        m.cancel_edit();
        assert!(m.context_anchor().is_some());
        m.open_edge_editor(&Edge::new("e", "a", "b"));
        m.cancel_edit();
        assert!(m.is_idle());
    }
}
