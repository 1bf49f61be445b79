//! Read-only client for the honeycomb hierarchy service.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::document::{self, LoadedGraph};
use crate::error::{FormatError, LoadError, NetworkError};
use crate::model::Node;
use crate::source::HttpSource;

/// Theme key the service uses to mark a collection's own root cell.
const ROOT_MARKER: &str = "root";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize)]
struct CollectionList {
    #[serde(default)]
    honeycombs: Vec<CollectionSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    pub title: String,
    pub graph: LoadedGraph,
    roots: HashSet<String>,
}

impl Collection {
    /// Cells shown inside the collection, without its root cell.
    pub fn child_cells(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .nodes
            .iter()
            .filter(|n| !self.roots.contains(&n.id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub contents: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
    pub graph: LoadedGraph,
}

#[derive(Clone, Debug)]
pub struct HoneycombApi {
    base: Url,
    http: HttpSource,
}

impl HoneycombApi {
    pub fn new(base_url: &str, http: HttpSource) -> Result<Self, NetworkError> {
        let base =
            Url::parse(base_url).map_err(|_| NetworkError::InvalidUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base, http })
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url.to_string()
    }

    /// URL the editor loads a collection's graph from.
    pub fn collection_origin(&self, id: &str) -> String {
        self.endpoint(&["honeycombs", id])
    }

    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>, LoadError> {
        let body = self.http.get_text(&self.endpoint(&["honeycombs"]))?;
        let list = parse_list(&body)?;
        debug!(count = list.len(), "listed collections");
        Ok(list)
    }

    pub fn get_collection(&self, id: &str) -> Result<Collection, LoadError> {
        let body = self.http.get_text(&self.collection_origin(id))?;
        Ok(parse_collection(json(&body)?)?)
    }

    pub fn get_item(&self, id: &str) -> Result<Item, LoadError> {
        let body = self.http.get_text(&self.endpoint(&["node", id]))?;
        Ok(parse_item(json(&body)?)?)
    }
}

fn json(body: &str) -> Result<Value, FormatError> {
    serde_json::from_str(body).map_err(|e| FormatError::Json(e.to_string()))
}

fn parse_list(body: &str) -> Result<Vec<CollectionSummary>, FormatError> {
    serde_json::from_str::<CollectionList>(body)
        .map(|list| list.honeycombs)
        .map_err(|e| FormatError::Json(e.to_string()))
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn root_ids(value: &Value) -> HashSet<String> {
    value
        .get("nodes")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|n| n.pointer("/data/themeColor").and_then(Value::as_str) == Some(ROOT_MARKER))
        .filter_map(|n| text(n, "id"))
        .collect()
}

fn parse_collection(value: Value) -> Result<Collection, FormatError> {
    let title = text(&value, "title").unwrap_or_default();
    let roots = root_ids(&value);
    let graph = document::decode(value)?;
    Ok(Collection {
        title,
        graph,
        roots,
    })
}

fn parse_item(value: Value) -> Result<Item, FormatError> {
    let id = text(&value, "id").ok_or_else(|| FormatError::Entry {
        collection: "node",
        index: 0,
        reason: "missing string `id`".into(),
    })?;
    let label = text(&value, "label").unwrap_or_default();
    let contents = text(&value, "contents");
    let url = text(&value, "url").filter(|u| !u.trim().is_empty());
    let icon_url = text(&value, "iconUrl");
    let graph = document::decode(value)?;
    Ok(Item {
        id,
        label,
        contents,
        url,
        icon_url,
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn api(base: &str) -> HoneycombApi {
        HoneycombApi::new(base, HttpSource::new(Duration::from_secs(1)).unwrap()).unwrap()
    }

    #[test]
    fn endpoints_are_built_under_api_v1() {
        let api = api("http://localhost:6543");
        assert_eq!(
            api.collection_origin("team map"),
            "http://localhost:6543/api/v1/honeycombs/team%20map"
        );
        assert_eq!(
            api.endpoint(&["node", "n1"]),
            "http://localhost:6543/api/v1/node/n1"
        );
    }

    #[test]
    fn base_with_path_keeps_its_prefix() {
        let api = api("https://example.org/hive/");
        assert_eq!(
            api.endpoint(&["honeycombs"]),
            "https://example.org/hive/api/v1/honeycombs"
        );
    }

    #[test]
    fn bad_base_is_rejected() {
        let http = HttpSource::new(Duration::from_secs(1)).unwrap();
        assert!(HoneycombApi::new("mailto:me@example.org", http.clone()).is_err());
        assert!(HoneycombApi::new("::", http).is_err());
    }

    #[test]
    fn list_tolerates_missing_optional_fields() {
        let list = parse_list(r#"{"honeycombs":[{"id":"a","title":"A"},{"id":"b","title":"B","icon":"hex"}]}"#)
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].icon.as_deref(), Some("hex"));
        assert!(parse_list("\"nope\"").is_err());
    }

    #[test]
    fn root_cells_are_not_children() {
        let collection = parse_collection(json!({
            "title": "Team",
            "nodes": [
                { "id": "r", "position": { "x": 0, "y": 0 }, "data": { "label": "Team", "themeColor": "root" } },
                { "id": "c", "position": { "x": 1, "y": 1 }, "data": { "label": "Child", "themeColor": "teal" } }
            ],
            "edges": []
        }))
        .unwrap();
        assert_eq!(collection.title, "Team");
        let children: Vec<_> = collection.child_cells().map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["c"]);
        assert_eq!(collection.graph.nodes.len(), 2);
    }

    #[test]
    fn item_carries_its_subgraph() {
        let item = parse_item(json!({
            "id": "n1",
            "label": "Cell",
            "contents": "notes",
            "url": "",
            "nodes": [{ "id": "x" }],
            "edges": []
        }))
        .unwrap();
        assert_eq!(item.label, "Cell");
        assert_eq!(item.url, None);
        assert_eq!(item.graph.nodes[0].id, "x");
        assert!(parse_item(json!({ "label": "no id", "nodes": [], "edges": [] })).is_err());
    }
}
