use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::theme::ThemeColor;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Custom,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub theme_color: ThemeColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl NodeData {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// External link opened on double-click. Blank urls count as no link.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Point,
    pub data: NodeData,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: impl Into<String>, position: Point, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
            kind: NodeKind::Custom,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleRole {
    Source,
    Target,
}

/// One of the eight connection points on a node (four sides, two roles).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub side: Side,
    pub role: HandleRole,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::new(Side::Top, HandleRole::Target),
        Handle::new(Side::Top, HandleRole::Source),
        Handle::new(Side::Bottom, HandleRole::Target),
        Handle::new(Side::Bottom, HandleRole::Source),
        Handle::new(Side::Left, HandleRole::Target),
        Handle::new(Side::Left, HandleRole::Source),
        Handle::new(Side::Right, HandleRole::Target),
        Handle::new(Side::Right, HandleRole::Source),
    ];

    pub const fn new(side: Side, role: HandleRole) -> Self {
        Self { side, role }
    }

    pub fn as_str(self) -> &'static str {
        match (self.side, self.role) {
            (Side::Top, HandleRole::Source) => "top-source",
            (Side::Top, HandleRole::Target) => "top-target",
            (Side::Bottom, HandleRole::Source) => "bottom-source",
            (Side::Bottom, HandleRole::Target) => "bottom-target",
            (Side::Left, HandleRole::Source) => "left-source",
            (Side::Left, HandleRole::Target) => "left-target",
            (Side::Right, HandleRole::Source) => "right-source",
            (Side::Right, HandleRole::Target) => "right-target",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownHandle(pub String);

impl FromStr for Handle {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| UnknownHandle(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ArrowPolicy {
    pub has_arrow: bool,
    /// Marker points at `source` instead of `target`.
    pub is_reversed: bool,
}

/// The two line variants an edge flips between from the context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdgeVariant {
    #[default]
    Plain,
    Labeled,
}

impl EdgeVariant {
    pub fn toggled(self) -> Self {
        match self {
            EdgeVariant::Plain => EdgeVariant::Labeled,
            EdgeVariant::Labeled => EdgeVariant::Plain,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            EdgeVariant::Plain => "default",
            EdgeVariant::Labeled => "custom-label",
        }
    }

    pub fn from_type_name(name: &str) -> Self {
        match name {
            "custom-label" => EdgeVariant::Labeled,
            _ => EdgeVariant::Plain,
        }
    }

    /// Stroke defaults applied when an edge switches into this variant.
    pub fn default_stroke(self) -> (LineStyle, bool) {
        match self {
            EdgeVariant::Plain => (LineStyle::Solid, false),
            EdgeVariant::Labeled => (LineStyle::Solid, true),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<Handle>,
    pub target_handle: Option<Handle>,
    pub label: Option<String>,
    pub line_style: LineStyle,
    pub arrow: ArrowPolicy,
    pub color: Option<String>,
    pub variant: EdgeVariant,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            label: None,
            line_style: LineStyle::Solid,
            arrow: ArrowPolicy::default(),
            color: None,
            variant: EdgeVariant::Plain,
        }
    }

    /// Id shared by every connection between the same pair of handles.
    pub fn connection_id(
        source: &str,
        source_handle: Option<Handle>,
        target: &str,
        target_handle: Option<Handle>,
    ) -> String {
        format!(
            "{}-{}-{}-{}",
            source,
            source_handle.map(Handle::as_str).unwrap_or(""),
            target,
            target_handle.map(Handle::as_str).unwrap_or("")
        )
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Node the arrow marker points at, when one is drawn.
    pub fn arrow_head(&self) -> Option<&str> {
        if !self.arrow.has_arrow {
            return None;
        }
        Some(if self.arrow.is_reversed {
            &self.source
        } else {
            &self.target
        })
    }
}

/// Immutable capture of a whole graph, tagged with where it was loaded from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub origin: Option<String>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, origin: Option<String>) -> Self {
        Self {
            nodes,
            edges,
            origin,
        }
    }

    /// Structural equality of the graph content, ignoring the origin tag.
    pub fn same_graph(&self, other: &GraphSnapshot) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}
