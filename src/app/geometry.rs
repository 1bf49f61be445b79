use eframe::egui;
use honeycomb::model::{Edge, Handle, HandleRole, Node, Point, Side};
use honeycomb::store::GraphStore;

pub(super) const NODE_MIN_WIDTH: f32 = 150.0;
pub(super) const NODE_HEIGHT: f32 = 40.0;
pub(super) const HANDLE_RADIUS: f32 = 5.0;
pub(super) const LOOP_RADIUS: f32 = 18.0;
const LOOP_SEGMENTS: usize = 16;
const LABEL_CHAR_WIDTH: f32 = 7.5;
const LABEL_PADDING: f32 = 32.0;

const SIDES: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

pub(super) fn to_pos2(p: Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

pub(super) fn to_point(p: egui::Pos2) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

pub(super) fn node_rect_world(node: &Node) -> egui::Rect {
    let chars = node.data.label.chars().count() as f32;
    let width = (chars * LABEL_CHAR_WIDTH + LABEL_PADDING).max(NODE_MIN_WIDTH);
    egui::Rect::from_min_size(to_pos2(node.position), egui::vec2(width, NODE_HEIGHT))
}

pub(super) fn side_anchor(rect: egui::Rect, side: Side) -> egui::Pos2 {
    match side {
        Side::Top => rect.center_top(),
        Side::Bottom => rect.center_bottom(),
        Side::Left => rect.left_center(),
        Side::Right => rect.right_center(),
    }
}

/// Side of `rect` that faces `toward`, for edges stored without a handle.
pub(super) fn facing_side(rect: egui::Rect, toward: egui::Pos2) -> Side {
    let d = toward - rect.center();
    let nx = d.x / rect.width().max(1.0);
    let ny = d.y / rect.height().max(1.0);
    if nx.abs() >= ny.abs() {
        if nx >= 0.0 { Side::Right } else { Side::Left }
    } else if ny >= 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Topmost node under `world_pos`. Later nodes draw on top.
pub(super) fn node_at(store: &GraphStore, world_pos: egui::Pos2) -> Option<&Node> {
    store
        .nodes()
        .iter()
        .rev()
        .find(|n| node_rect_world(n).contains(world_pos))
}

pub(super) fn handle_at(
    store: &GraphStore,
    world_pos: egui::Pos2,
    radius_world: f32,
) -> Option<(String, Side)> {
    store.nodes().iter().rev().find_map(|n| {
        let rect = node_rect_world(n);
        SIDES
            .into_iter()
            .find(|side| side_anchor(rect, *side).distance(world_pos) <= radius_world)
            .map(|side| (n.id.clone(), side))
    })
}

pub(super) fn edge_endpoints_world(store: &GraphStore, edge: &Edge) -> Option<(egui::Pos2, egui::Pos2)> {
    let a = node_rect_world(store.node(&edge.source)?);
    let b = node_rect_world(store.node(&edge.target)?);
    let side_a = edge
        .source_handle
        .map(|h| h.side)
        .unwrap_or_else(|| facing_side(a, b.center()));
    let side_b = edge
        .target_handle
        .map(|h| h.side)
        .unwrap_or_else(|| facing_side(b, a.center()));
    Some((side_anchor(a, side_a), side_anchor(b, side_b)))
}

/// Screen-independent path of an edge. Edges whose two ends land on the
/// same anchor (same-side self-loops) get a small loop out of that side.
pub(super) fn edge_path_world(store: &GraphStore, edge: &Edge) -> Option<Vec<egui::Pos2>> {
    let (a, b) = edge_endpoints_world(store, edge)?;
    if a.distance(b) > 1.0 {
        return Some(vec![a, b]);
    }
    let side = match edge.source_handle {
        Some(h) => h.side,
        None => facing_side(node_rect_world(store.node(&edge.source)?), a),
    };
    Some(loop_points(a, side))
}

fn outward(side: Side) -> egui::Vec2 {
    match side {
        Side::Top => egui::vec2(0.0, -1.0),
        Side::Bottom => egui::vec2(0.0, 1.0),
        Side::Left => egui::vec2(-1.0, 0.0),
        Side::Right => egui::vec2(1.0, 0.0),
    }
}

/// Closed circle of radius [`LOOP_RADIUS`] touching `anchor`, outside `side`.
fn loop_points(anchor: egui::Pos2, side: Side) -> Vec<egui::Pos2> {
    let out = outward(side);
    let perp = egui::vec2(-out.y, out.x);
    let center = anchor + out * LOOP_RADIUS;
    (0..=LOOP_SEGMENTS)
        .map(|i| {
            let t = i as f32 / LOOP_SEGMENTS as f32 * std::f32::consts::TAU;
            center - out * (LOOP_RADIUS * t.cos()) + perp * (LOOP_RADIUS * t.sin())
        })
        .collect()
}

pub(super) fn edge_at<'a>(
    store: &'a GraphStore,
    world_pos: egui::Pos2,
    threshold_world: f32,
) -> Option<&'a Edge> {
    store.edges().iter().rev().find(|e| {
        edge_path_world(store, e).is_some_and(|path| {
            path.windows(2)
                .any(|w| distance_to_segment(world_pos, w[0], w[1]) <= threshold_world)
        })
    })
}

/// Where a connect-drag from `source`'s `side` handle lands. A handle
/// under the pointer wins over a node body. Dropping back on the starting
/// handle or on the source's own body connects nothing.
pub(super) fn connect_target(
    store: &GraphStore,
    source: &str,
    side: Side,
    world_pos: egui::Pos2,
    radius_world: f32,
) -> Option<(String, Option<Handle>)> {
    if let Some((id, target_side)) = handle_at(store, world_pos, radius_world) {
        if id == source && target_side == side {
            return None;
        }
        return Some((id, Some(target_handle(target_side))));
    }
    let node = node_at(store, world_pos)?;
    (node.id != source).then(|| (node.id.clone(), None))
}

pub(super) fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

pub(super) fn source_handle(side: Side) -> Handle {
    Handle::new(side, HandleRole::Source)
}

pub(super) fn target_handle(side: Side) -> Handle {
    Handle::new(side, HandleRole::Target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeycomb::model::NodeData;

    fn store() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::new("a", Point::new(0.0, 0.0), NodeData::labeled("A")));
        store.add_node(Node::new("b", Point::new(400.0, 0.0), NodeData::labeled("B")));
        store.add_edge(Edge::new("e", "a", "b"));
        store
    }

    #[test]
    fn short_labels_get_the_minimum_size() {
        let rect = node_rect_world(&Node::new("a", Point::default(), NodeData::labeled("x")));
        assert_eq!(rect.size(), egui::vec2(NODE_MIN_WIDTH, NODE_HEIGHT));
    }

    #[test]
    fn handle_hit_uses_side_centers() {
        let store = store();
        let hit = handle_at(&store, egui::pos2(150.0, 20.0), 6.0);
        assert_eq!(hit, Some(("a".to_string(), Side::Right)));
        assert_eq!(handle_at(&store, egui::pos2(75.0, 20.0), 6.0), None);
    }

    #[test]
    fn handleless_edges_attach_to_facing_sides() {
        let store = store();
        let (a, b) = edge_endpoints_world(&store, &store.edges()[0]).unwrap();
        assert_eq!(a, egui::pos2(150.0, 20.0));
        assert_eq!(b, egui::pos2(400.0, 20.0));
        assert!(edge_at(&store, egui::pos2(275.0, 22.0), 4.0).is_some());
        assert!(edge_at(&store, egui::pos2(275.0, 40.0), 4.0).is_none());
    }

    #[test]
    fn dropping_on_the_starting_handle_or_own_body_connects_nothing() {
        let store = store();
        assert_eq!(connect_target(&store, "a", Side::Right, egui::pos2(150.0, 20.0), 6.0), None);
        assert_eq!(connect_target(&store, "a", Side::Right, egui::pos2(60.0, 20.0), 6.0), None);
    }

    #[test]
    fn dropping_elsewhere_resolves_handle_or_body() {
        let store = store();
        assert_eq!(
            connect_target(&store, "a", Side::Right, egui::pos2(75.0, 0.0), 6.0),
            Some(("a".to_string(), Some(target_handle(Side::Top))))
        );
        assert_eq!(
            connect_target(&store, "a", Side::Right, egui::pos2(450.0, 20.0), 6.0),
            Some(("b".to_string(), None))
        );
    }

    #[test]
    fn same_anchor_self_loops_are_drawn_and_pickable() {
        let mut store = store();
        let mut edge = Edge::new("loop", "b", "b");
        edge.source_handle = Some(source_handle(Side::Top));
        edge.target_handle = Some(target_handle(Side::Top));
        store.add_edge(edge);
        store.add_edge(Edge::new("bare", "a", "a"));

        let path = edge_path_world(&store, store.edge("loop").unwrap()).unwrap();
        assert!(path.len() > 2);
        let anchor = egui::pos2(475.0, 0.0);
        assert!(path.first().unwrap().distance(anchor) < 1e-3);
        assert!(path.iter().all(|p| p.y <= 1e-3));
        let top = egui::pos2(475.0, -2.0 * LOOP_RADIUS);
        assert_eq!(edge_at(&store, top, 2.0).map(|e| e.id.as_str()), Some("loop"));

        let bare = edge_path_world(&store, store.edge("bare").unwrap()).unwrap();
        assert!(bare.iter().any(|p| p.x > 150.0 + LOOP_RADIUS));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = distance_to_segment(egui::pos2(-3.0, 4.0), egui::pos2(0.0, 0.0), egui::pos2(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }
}
