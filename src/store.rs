//! The authoritative node/edge set of the diagram being edited.
//!
//! Every mutation that targets an id quietly does nothing when the id is
//! gone: the UI can issue a command against an element that was removed a
//! moment earlier, and that must not be an error.

use std::collections::HashSet;

use crate::error::InvariantViolation;
use crate::model::{Edge, GraphSnapshot, Node, NodeData, Point};
use crate::theme::{self, EdgePaint, ThemeColor};

/// Offset applied to a duplicated node so it does not sit on the original.
pub const DUPLICATE_OFFSET: f64 = 50.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// What a node removal took with it.
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        Self {
            nodes: snapshot.nodes.clone(),
            edges: snapshot.edges.clone(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn incident_edges(&self, node_id: &str) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    pub fn snapshot(&self, origin: Option<String>) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone(), origin)
    }

    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
    }

    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.replace_all(snapshot.nodes.clone(), snapshot.edges.clone());
    }

    /// The caller supplies a fresh id from the id generator.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn remove_node(&mut self, id: &str) -> Option<RemovedNode> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(idx);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            self.edges.drain(..).partition(|e| e.touches(id));
        self.edges = kept;
        Some(RemovedNode {
            node,
            edges: removed,
        })
    }

    /// The caller guarantees both endpoints exist.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Replaces an edge with the same id in place, or appends it.
    pub fn upsert_edge(&mut self, edge: Edge) {
        match self.edges.iter_mut().find(|e| e.id == edge.id) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(idx))
    }

    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.data = data;
        true
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        true
    }

    /// Swaps in a whole new edge record. The stored id is kept even if the
    /// record carries a different one.
    pub fn update_edge(&mut self, id: &str, mut record: Edge) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        record.id = edge.id.clone();
        *edge = record;
        true
    }

    pub fn toggle_edge_arrow_direction(&mut self, id: &str) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        edge.arrow.is_reversed = !edge.arrow.is_reversed;
        true
    }

    pub fn toggle_edge_arrow(&mut self, id: &str) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        edge.arrow.has_arrow = !edge.arrow.has_arrow;
        true
    }

    pub fn toggle_edge_line_variant(&mut self, id: &str) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        edge.variant = edge.variant.toggled();
        let (line_style, has_arrow) = edge.variant.default_stroke();
        edge.line_style = line_style;
        edge.arrow.has_arrow = has_arrow;
        true
    }

    pub fn duplicate_node(&mut self, id: &str, new_id: String) -> Option<&Node> {
        let original = self.node(id)?;
        let mut copy = original.clone();
        copy.id = new_id;
        copy.position = copy.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        self.nodes.push(copy);
        self.nodes.last()
    }

    /// Every edge endpoint that names a node not in the store.
    pub fn dangling_edges(&self) -> Vec<InvariantViolation> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut out = Vec::new();
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    out.push(InvariantViolation::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }
        out
    }

    pub fn theme_of(&self, node_id: &str) -> ThemeColor {
        self.node(node_id)
            .map(|n| n.data.theme_color)
            .unwrap_or_default()
    }

    pub fn edge_paint(&self, edge: &Edge) -> EdgePaint {
        theme::edge_paint(
            edge.color.as_deref(),
            self.theme_of(&edge.source),
            self.theme_of(&edge.target),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeVariant, LineStyle};
    use proptest::prelude::*;

    fn node(id: &str) -> Node {
        Node::new(id, Point::new(0.0, 0.0), NodeData::labeled(id))
    }

    fn store_with(nodes: &[&str], edges: &[(&str, &str, &str)]) -> GraphStore {
        let mut store = GraphStore::new();
        for id in nodes {
            store.add_node(node(id));
        }
        for (id, s, t) in edges {
            store.add_edge(Edge::new(*id, *s, *t));
        }
        store
    }

    #[test]
    fn removing_a_node_takes_its_edges() {
        let mut store = store_with(
            &["a", "b", "c"],
            &[("ab", "a", "b"), ("bc", "b", "c"), ("ca", "c", "a")],
        );
        let removed = store.remove_node("b").unwrap();
        assert_eq!(removed.node.id, "b");
        let ids: Vec<&str> = removed.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ab", "bc"]);
        assert_eq!(store.edges().len(), 1);
        assert!(store.dangling_edges().is_empty());
    }

    #[test]
    fn absent_ids_are_no_ops() {
        let mut store = store_with(&["a"], &[]);
        let before = store.clone();
        assert!(store.remove_node("zzz").is_none());
        assert!(store.remove_edge("zzz").is_none());
        assert!(!store.update_node_data("zzz", NodeData::labeled("x")));
        assert!(!store.update_edge("zzz", Edge::new("zzz", "a", "a")));
        assert!(!store.toggle_edge_arrow_direction("zzz"));
        assert!(!store.toggle_edge_line_variant("zzz"));
        assert!(!store.move_node("zzz", Point::new(1.0, 1.0)));
        assert!(store.duplicate_node("zzz", "n".into()).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn update_edge_keeps_the_stored_id() {
        let mut store = store_with(&["a", "b"], &[("e1", "a", "b")]);
        let mut record = Edge::new("something-else", "a", "b");
        record.label = Some("knows".into());
        record.line_style = LineStyle::Dashed;
        assert!(store.update_edge("e1", record));
        let edge = store.edge("e1").unwrap();
        assert_eq!(edge.label.as_deref(), Some("knows"));
        assert_eq!(edge.line_style, LineStyle::Dashed);
        assert!(store.edge("something-else").is_none());
    }

    #[test]
    fn update_node_data_keeps_position() {
        let mut store = GraphStore::new();
        store.add_node(Node::new("a", Point::new(3.0, 4.0), NodeData::labeled("old")));
        store.update_node_data("a", NodeData::labeled("new"));
        let n = store.node("a").unwrap();
        assert_eq!(n.data.label, "new");
        assert_eq!(n.position, Point::new(3.0, 4.0));
    }

    #[test]
    fn line_variant_toggle_applies_variant_stroke() {
        let mut store = store_with(&["a", "b"], &[("e", "a", "b")]);
        {
            let edge = store.edges.iter_mut().find(|e| e.id == "e").unwrap();
            edge.line_style = LineStyle::Dashed;
            edge.arrow.is_reversed = true;
        }
        store.toggle_edge_line_variant("e");
        let edge = store.edge("e").unwrap();
        assert_eq!(edge.variant, EdgeVariant::Labeled);
        assert_eq!(edge.line_style, LineStyle::Solid);
        assert!(edge.arrow.has_arrow);
        assert!(edge.arrow.is_reversed);

        store.toggle_edge_line_variant("e");
        let edge = store.edge("e").unwrap();
        assert_eq!(edge.variant, EdgeVariant::Plain);
        assert!(!edge.arrow.has_arrow);
    }

    #[test]
    fn direction_toggle_flips_only_reversal() {
        let mut store = store_with(&["a", "b"], &[("e", "a", "b")]);
        store.toggle_edge_arrow_direction("e");
        assert!(store.edge("e").unwrap().arrow.is_reversed);
        store.toggle_edge_arrow_direction("e");
        assert!(!store.edge("e").unwrap().arrow.is_reversed);
        assert!(!store.edge("e").unwrap().arrow.has_arrow);
    }

    #[test]
    fn duplicate_is_offset() {
        let mut store = GraphStore::new();
        store.add_node(Node::new("a", Point::new(10.0, 20.0), NodeData::labeled("a")));
        let copy = store.duplicate_node("a", "a2".into()).unwrap();
        assert_eq!(copy.position, Point::new(60.0, 70.0));
        assert_eq!(copy.data.label, "a");
        assert_eq!(store.nodes().len(), 2);
    }

    #[test]
    fn dangling_edges_are_reported_per_endpoint() {
        let store = store_with(&["a"], &[("e", "a", "ghost"), ("f", "x", "y")]);
        let found = store.dangling_edges();
        assert_eq!(found.len(), 3);
        assert!(found.contains(&InvariantViolation::DanglingEdge {
            edge: "e".into(),
            node: "ghost".into()
        }));
    }

    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
    }

    proptest! {
        #[test]
        fn cascade_removes_exactly_the_incident_edges(
            (n, pairs) in graph_strategy(),
            victim in any::<prop::sample::Index>(),
        ) {
            let mut store = GraphStore::new();
            for i in 0..n {
                store.add_node(node(&format!("n{i}")));
            }
            for (k, (s, t)) in pairs.iter().enumerate() {
                store.add_edge(Edge::new(format!("e{k}"), format!("n{s}"), format!("n{t}")));
            }
            let victim = format!("n{}", victim.index(n));
            let mut expected: Vec<String> = store
                .incident_edges(&victim)
                .map(|e| e.id.clone())
                .collect();

            let removed = store.remove_node(&victim).unwrap();
            let mut removed_ids: Vec<String> = removed.edges.iter().map(|e| e.id.clone()).collect();
            expected.sort();
            removed_ids.sort();

            prop_assert_eq!(removed_ids, expected);
            prop_assert!(store.edges().iter().all(|e| !e.touches(&victim)));
            prop_assert_eq!(store.edges().len() + removed.edges.len(), pairs.len());
        }
    }
}
