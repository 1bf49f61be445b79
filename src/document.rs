//! The on-disk / on-wire diagram document and its conversion to and from the
//! in-memory graph.
//!
//! Export is plain serde. Import walks a `serde_json::Value` by hand so that
//! partially broken documents can be normalized (missing positions, unknown
//! theme colors) while structural damage is reported precisely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{FormatError, InvariantViolation};
use crate::model::{
    ArrowPolicy, Edge, EdgeVariant, GraphSnapshot, Handle, LineStyle, Node, NodeData, Point,
};
use crate::store::GraphStore;
use crate::theme::ThemeColor;

const DASH_PATTERN: &str = "5,5";
const FALLBACK_ORIGIN: f64 = 100.0;
const FALLBACK_STEP: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeDataRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDataRecord {
    #[serde(default)]
    pub has_arrow: bool,
    #[serde(default)]
    pub is_reversed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        EdgeRecord {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: edge.source_handle.map(|h| h.as_str().to_string()),
            target_handle: edge.target_handle.map(|h| h.as_str().to_string()),
            label: edge.label.clone(),
            kind: Some(edge.variant.type_name().to_string()),
            style: (edge.line_style == LineStyle::Dashed).then(|| EdgeStyleRecord {
                stroke_dasharray: Some(DASH_PATTERN.to_string()),
            }),
            data: Some(EdgeDataRecord {
                has_arrow: edge.arrow.has_arrow,
                is_reversed: edge.arrow.is_reversed,
                color: edge.color.clone(),
            }),
        }
    }
}

impl EdgeRecord {
    pub fn into_edge(self) -> Edge {
        let line_style = match self.style.and_then(|s| s.stroke_dasharray) {
            Some(dash) if !dash.trim().is_empty() => LineStyle::Dashed,
            _ => LineStyle::Solid,
        };
        let data = self.data.unwrap_or_default();
        Edge {
            source_handle: parse_handle(&self.id, self.source_handle.as_deref()),
            target_handle: parse_handle(&self.id, self.target_handle.as_deref()),
            id: self.id,
            source: self.source,
            target: self.target,
            label: self.label,
            line_style,
            arrow: ArrowPolicy {
                has_arrow: data.has_arrow,
                is_reversed: data.is_reversed,
            },
            color: data.color.filter(|c| !c.trim().is_empty()),
            variant: self
                .kind
                .as_deref()
                .map(EdgeVariant::from_type_name)
                .unwrap_or_default(),
        }
    }
}

fn parse_handle(edge_id: &str, raw: Option<&str>) -> Option<Handle> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<Handle>() {
        Ok(handle) => Some(handle),
        Err(_) => {
            warn!(edge = edge_id, handle = raw, "ignoring unknown handle");
            None
        }
    }
}

/// Things an import normalized or found suspicious without rejecting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    /// Nodes that had no usable position and were placed on the fallback diagonal.
    pub repositioned: Vec<String>,
    pub dangling: Vec<InvariantViolation>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.repositioned.is_empty() && self.dangling.is_empty()
    }
}

/// A validated document, ready to replace the store contents.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Option<Viewport>,
    pub report: ImportReport,
}

impl LoadedGraph {
    pub fn into_snapshot(self, origin: Option<String>) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes, self.edges, origin)
    }

    pub fn to_snapshot(&self, origin: Option<String>) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone(), origin)
    }
}

pub fn export_snapshot(store: &GraphStore) -> Document {
    Document {
        nodes: store.nodes().to_vec(),
        edges: store.edges().iter().map(EdgeRecord::from).collect(),
        viewport: None,
    }
}

pub fn to_json(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

pub fn parse(text: &str) -> Result<LoadedGraph, FormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| FormatError::Json(e.to_string()))?;
    decode(value)
}

pub fn decode(value: Value) -> Result<LoadedGraph, FormatError> {
    let Value::Object(mut root) = value else {
        return Err(FormatError::NotAnObject);
    };
    let raw_nodes = take_array(&mut root, "nodes")?;
    let raw_edges = take_array(&mut root, "edges")?;

    let mut report = ImportReport::default();
    let mut seen = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (index, raw) in raw_nodes.into_iter().enumerate() {
        let node = decode_node(index, raw, &mut report)?;
        if !seen.insert(node.id.clone()) {
            return Err(FormatError::DuplicateNodeId(node.id));
        }
        nodes.push(node);
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (index, raw) in raw_edges.into_iter().enumerate() {
        let edge = decode_edge(index, raw)?;
        for endpoint in [&edge.source, &edge.target] {
            if !seen.contains(endpoint) {
                report.dangling.push(InvariantViolation::DanglingEdge {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        edges.push(edge);
    }

    let viewport = root
        .remove("viewport")
        .and_then(|v| serde_json::from_value::<Viewport>(v).ok());

    if !report.dangling.is_empty() {
        warn!(count = report.dangling.len(), "document has dangling edges");
    }
    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        repositioned = report.repositioned.len(),
        "decoded document"
    );
    Ok(LoadedGraph {
        nodes,
        edges,
        viewport,
        report,
    })
}

/// Validates `value` and swaps it into `store` in one step. On error the
/// store is not touched.
pub fn import_snapshot(store: &mut GraphStore, value: Value) -> Result<ImportReport, FormatError> {
    let loaded = decode(value)?;
    store.replace_all(loaded.nodes, loaded.edges);
    Ok(loaded.report)
}

fn take_array(root: &mut Map<String, Value>, key: &'static str) -> Result<Vec<Value>, FormatError> {
    match root.remove(key) {
        None | Some(Value::Null) => Err(FormatError::MissingArray(key)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(FormatError::NotAnArray(key)),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn decode_node(index: usize, raw: Value, report: &mut ImportReport) -> Result<Node, FormatError> {
    let Value::Object(obj) = raw else {
        return Err(FormatError::node(index, "not an object"));
    };
    let id = string_field(&obj, "id").ok_or_else(|| FormatError::node(index, "missing string `id`"))?;

    let position = obj.get("position").and_then(|p| {
        let x = p.get("x")?.as_f64()?;
        let y = p.get("y")?.as_f64()?;
        Some(Point::new(x, y)).filter(|p| p.is_finite())
    });
    let position = match position {
        Some(p) => p,
        None => {
            let offset = FALLBACK_ORIGIN + FALLBACK_STEP * index as f64;
            report.repositioned.push(id.clone());
            Point::new(offset, offset)
        }
    };

    let data = obj.get("data").and_then(Value::as_object);
    let field = |key: &str| data.and_then(|d| string_field(d, key));
    let theme_color = field("themeColor")
        .map(ThemeColor::from)
        .unwrap_or_default();
    let node_data = NodeData {
        label: field("label").unwrap_or_default(),
        theme_color,
        url: field("url"),
        icon_url: field("iconUrl"),
    };

    Ok(Node::new(id, position, node_data))
}

fn decode_edge(index: usize, raw: Value) -> Result<Edge, FormatError> {
    let Value::Object(obj) = raw else {
        return Err(FormatError::edge(index, "not an object"));
    };
    let required = |key: &str| {
        string_field(&obj, key)
            .ok_or_else(|| FormatError::edge(index, format!("missing string `{key}`")))
    };
    let id = required("id")?;
    let source = required("source")?;
    let target = required("target")?;

    let style = obj.get("style").and_then(Value::as_object);
    let data = obj.get("data").and_then(Value::as_object);
    let flag = |key: &str| {
        data.and_then(|d| d.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let record = EdgeRecord {
        id,
        source,
        target,
        source_handle: string_field(&obj, "sourceHandle"),
        target_handle: string_field(&obj, "targetHandle"),
        label: string_field(&obj, "label"),
        kind: string_field(&obj, "type"),
        style: style.map(|s| EdgeStyleRecord {
            stroke_dasharray: string_field(s, "strokeDasharray"),
        }),
        data: Some(EdgeDataRecord {
            has_arrow: flag("hasArrow"),
            is_reversed: flag("isReversed"),
            color: data.and_then(|d| string_field(d, "color")),
        }),
    };
    Ok(record.into_edge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HandleRole, Side};
    use serde_json::json;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        let mut data = NodeData::labeled("Alpha");
        data.theme_color = ThemeColor::Teal;
        data.url = Some("https://example.org/a".into());
        store.add_node(Node::new("a", Point::new(10.0, 20.5), data));
        store.add_node(Node::new("b", Point::new(-4.0, 0.0), NodeData::labeled("Beta")));
        let mut edge = Edge::new("a-right-source-b-left-target", "a", "b");
        edge.source_handle = Some(Handle::new(Side::Right, HandleRole::Source));
        edge.target_handle = Some(Handle::new(Side::Left, HandleRole::Target));
        edge.label = Some("feeds".into());
        edge.line_style = LineStyle::Dashed;
        edge.arrow = ArrowPolicy {
            has_arrow: true,
            is_reversed: true,
        };
        edge.variant = EdgeVariant::Labeled;
        edge.color = Some("#ff0000".into());
        store.add_edge(edge);
        store
    }

    #[test]
    fn export_then_import_reproduces_the_graph() {
        let store = sample_store();
        let text = to_json(&export_snapshot(&store)).unwrap();
        let loaded = parse(&text).unwrap();
        assert!(loaded.report.is_clean());
        let restored = GraphStore::from_snapshot(&loaded.into_snapshot(None));
        assert_eq!(restored, store);
    }

    #[test]
    fn dashed_edges_use_the_dash_pattern() {
        let doc = export_snapshot(&sample_store());
        let style = doc.edges[0].style.as_ref().unwrap();
        assert_eq!(style.stroke_dasharray.as_deref(), Some("5,5"));
        assert_eq!(doc.edges[0].kind.as_deref(), Some("custom-label"));
    }

    #[test]
    fn missing_edges_array_leaves_store_untouched() {
        let mut store = sample_store();
        let before = store.clone();
        let err = import_snapshot(&mut store, json!({ "nodes": [] })).unwrap_err();
        assert_eq!(err, FormatError::MissingArray("edges"));
        assert_eq!(store, before);
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert_eq!(decode(json!([1, 2])).unwrap_err(), FormatError::NotAnObject);
        assert!(matches!(parse("{ nope"), Err(FormatError::Json(_))));
    }

    #[test]
    fn nodes_without_position_are_staggered() {
        let loaded = decode(json!({
            "nodes": [
                { "id": "a", "position": { "x": 1, "y": 2 }, "data": { "label": "A" } },
                { "id": "b" },
                { "id": "c", "position": { "x": "left", "y": 0 } }
            ],
            "edges": []
        }))
        .unwrap();
        assert_eq!(loaded.nodes[0].position, Point::new(1.0, 2.0));
        assert_eq!(loaded.nodes[1].position, Point::new(150.0, 150.0));
        assert_eq!(loaded.nodes[2].position, Point::new(200.0, 200.0));
        assert_eq!(loaded.nodes[1].data.label, "");
        assert_eq!(loaded.report.repositioned, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn unknown_theme_color_falls_back_to_default() {
        let loaded = decode(json!({
            "nodes": [{ "id": "a", "position": { "x": 0, "y": 0 },
                        "data": { "label": "A", "themeColor": "chartreuse" } }],
            "edges": []
        }))
        .unwrap();
        assert_eq!(loaded.nodes[0].data.theme_color, ThemeColor::Default);
    }

    #[test]
    fn dangling_edges_are_kept_and_reported() {
        let loaded = decode(json!({
            "nodes": [{ "id": "a", "position": { "x": 0, "y": 0 }, "data": {} }],
            "edges": [{ "id": "e", "source": "a", "target": "ghost" }]
        }))
        .unwrap();
        assert_eq!(loaded.edges.len(), 1);
        assert_eq!(
            loaded.report.dangling,
            vec![InvariantViolation::DanglingEdge {
                edge: "e".into(),
                node: "ghost".into()
            }]
        );
    }

    #[test]
    fn duplicate_node_ids_are_a_format_error() {
        let err = decode(json!({
            "nodes": [{ "id": "a" }, { "id": "a" }],
            "edges": []
        }))
        .unwrap_err();
        assert_eq!(err, FormatError::DuplicateNodeId("a".into()));
    }

    #[test]
    fn edge_without_target_names_its_index() {
        let err = decode(json!({
            "nodes": [],
            "edges": [{ "id": "ok", "source": "a", "target": "b" }, { "id": "bad", "source": "a" }]
        }))
        .unwrap_err();
        assert_eq!(err, FormatError::edge(1, "missing string `target`"));
    }

    #[test]
    fn unknown_handles_and_viewport() {
        let loaded = decode(json!({
            "nodes": [],
            "edges": [{ "id": "e", "source": "a", "target": "b",
                        "sourceHandle": "middle", "targetHandle": "" }],
            "viewport": { "x": 3.0, "y": 4.0, "zoom": 1.5 }
        }))
        .unwrap();
        assert_eq!(loaded.edges[0].source_handle, None);
        assert_eq!(loaded.edges[0].target_handle, None);
        assert_eq!(
            loaded.viewport,
            Some(Viewport {
                x: 3.0,
                y: 4.0,
                zoom: 1.5
            })
        );
    }

    #[test]
    fn bundled_default_decodes() {
        let loaded = parse(include_str!("../assets/default_diagram.json")).unwrap();
        assert_eq!(loaded.nodes.len(), 2);
        assert_eq!(loaded.edges[0].variant, EdgeVariant::Labeled);
        assert!(loaded.report.is_clean());
    }
}
