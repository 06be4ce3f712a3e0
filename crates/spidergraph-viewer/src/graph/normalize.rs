use bevy::prelude::Vec2;
use serde_json::{Map, Value};
use spidergraph_core::NodeId;
use tracing::debug;

use crate::graph::model::{Edge, EdgeKind, GraphModel, Node, Tier};

const SUMMARY_EDGE_CAP: usize = 12;
const DOCS_EDGE_CAP: usize = 600;
const VIEW_EDGE_CAP: usize = 900;

/// Turns an arbitrary JSON payload into a canonical [`GraphModel`].
///
/// Never fails: anything unusable is skipped, and an unusable payload yields
/// an empty model.
pub fn normalize_payload(payload: &Value) -> GraphModel {
    let mut model = GraphModel::default();
    let Some(obj) = payload.as_object() else {
        return model;
    };
    model.view_name = view_name(obj);

    let mut skipped = 0usize;
    if let Some(nodes) = obj.get("nodes").and_then(Value::as_array) {
        for (i, raw) in nodes.iter().enumerate() {
            match node_from_value(raw, i) {
                Some(node) if !model.contains(&node.id) => {
                    model.push_node(node);
                }
                _ => skipped += 1,
            }
        }
    }

    let raw_edges = obj
        .get("links")
        .and_then(Value::as_array)
        .or_else(|| obj.get("edges").and_then(Value::as_array));
    let mut edges = Vec::new();
    if let Some(raw_edges) = raw_edges {
        for (i, raw) in raw_edges.iter().enumerate() {
            match edge_from_value(raw, i) {
                Some(edge) => edges.push(edge),
                None => skipped += 1,
            }
        }
    }

    let mut synthesized = 0usize;
    for edge in filter_edges_for_view(model.view_name.as_deref(), edges) {
        for end in [&edge.source, &edge.target] {
            if !model.contains(end) {
                model.push_node(Node::placeholder(end.clone()));
                synthesized += 1;
            }
        }
        model.push_edge(edge);
    }

    debug!(
        nodes = model.len(),
        edges = model.edges.len(),
        skipped,
        synthesized,
        "normalized payload"
    );
    model
}

fn view_name(obj: &Map<String, Value>) -> Option<String> {
    obj.get("view")
        .or_else(|| obj.get("current_view"))
        .or_else(|| obj.get("meta").and_then(|meta| meta.get("view")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Edge subset kept for a named view. Untagged payloads keep everything.
pub fn filter_edges_for_view(view: Option<&str>, edges: Vec<Edge>) -> Vec<Edge> {
    let Some(view) = view else {
        return edges;
    };
    let is_doc_link = |edge: &Edge| matches!(edge.kind, EdgeKind::DocsLink | EdgeKind::Link);
    match view {
        "Summary" => edges
            .into_iter()
            .filter(|edge| edge.kind == EdgeKind::Aggregate)
            .take(SUMMARY_EDGE_CAP)
            .collect(),
        "Docs" => edges
            .into_iter()
            .filter(is_doc_link)
            .take(DOCS_EDGE_CAP)
            .collect(),
        _ => edges
            .into_iter()
            .filter(|edge| !is_doc_link(edge))
            .take(VIEW_EDGE_CAP)
            .collect(),
    }
}

fn entry_data(raw: &Value) -> Option<&Map<String, Value>> {
    let obj = raw.as_object()?;
    Some(obj.get("data").and_then(Value::as_object).unwrap_or(obj))
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(scalar_text))
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn finite(value: Option<&Value>) -> Option<f32> {
    let v = value?.as_f64()? as f32;
    v.is_finite().then_some(v)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn position_of(raw: &Value, data: &Map<String, Value>) -> Option<Vec2> {
    let nested = raw
        .get("position")
        .or_else(|| data.get("position"))
        .and_then(Value::as_object);
    let (x, y) = match nested {
        Some(pos) => (finite(pos.get("x")), finite(pos.get("y"))),
        None => (finite(data.get("x")), finite(data.get("y"))),
    };
    Some(Vec2::new(x?, y?))
}

fn node_from_value(raw: &Value, index: usize) -> Option<Node> {
    let data = entry_data(raw)?;
    let id = first_text(data, &["id", "key"]).unwrap_or_else(|| format!("node-{index}"));
    let label = first_text(data, &["label", "name", "title", "fullLabel"]).unwrap_or_else(|| id.clone());

    let mut node = Node::new(NodeId(id), label);
    node.path = first_text(data, &["path", "file", "uri"]).map(|p| p.replace('\\', "/"));
    node.kind = first_text(data, &["kind", "group", "type"]);
    node.explicit_importance = finite(data.get("importance"))
        .or_else(|| finite(data.get("score")))
        .map(|v| v.max(0.0));
    node.explicit_tier = first_text(data, &["tier"]).and_then(|t| Tier::parse(&t));
    if let Some(tier) = node.explicit_tier {
        node.tier = tier;
    }
    node.pinned = truthy(data.get("pinned")) || truthy(data.get("fixed"));
    node.parent = first_text(data, &["parent"]).map(NodeId);
    node.pos = position_of(raw, data);
    Some(node)
}

fn endpoint(value: Option<&Value>) -> Option<NodeId> {
    let text = match value? {
        Value::Object(obj) => first_text(obj, &["id", "name", "path", "label"])?,
        other => scalar_text(other)?,
    };
    Some(NodeId(text))
}

fn edge_from_value(raw: &Value, index: usize) -> Option<Edge> {
    let data = entry_data(raw)?;
    let source = endpoint(data.get("source").or_else(|| data.get("from")))?;
    let target = endpoint(data.get("target").or_else(|| data.get("to")))?;
    let id = first_text(data, &["id"]).unwrap_or_else(|| format!("e{index}"));
    let kind = first_text(data, &["kind", "type"])
        .map(|k| EdgeKind::parse(&k))
        .unwrap_or_default();

    let mut edge = Edge::new(id, source, target, kind);
    if let Some(weight) = finite(data.get("weight")) {
        edge.weight = weight;
    }
    Some(edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_endpoint_is_synthesized_and_edge_kept() {
        let model = normalize_payload(&json!({
            "nodes": [{"id": "a"}],
            "links": [{"source": "a", "target": "ghost"}]
        }));

        assert_eq!(model.len(), 2);
        assert_eq!(model.edges.len(), 1);
        let ghost = model.node(&NodeId::from("ghost")).expect("synthesized");
        assert!(ghost.synthesized);
        assert_eq!(ghost.label, "ghost");
    }

    #[test]
    fn accepts_aliases_and_cytoscape_entries() {
        let model = normalize_payload(&json!({
            "nodes": [
                {"key": "k1", "name": "First", "file": "src\\a.rs", "group": "module", "score": 3},
                {"data": {"id": "c1", "fullLabel": "Second", "tier": "P1", "pinned": "true"},
                 "position": {"x": 10.0, "y": -4.0}},
                {"title": "Third", "x": 1, "y": 2, "fixed": true}
            ],
            "edges": [
                {"from": {"name": "k1"}, "to": {"id": "c1"}, "type": "link"},
                {"data": {"source": "c1", "target": "node-2", "kind": "aggregate"}}
            ]
        }));

        let k1 = model.node(&NodeId::from("k1")).expect("k1");
        assert_eq!(k1.label, "First");
        assert_eq!(k1.path.as_deref(), Some("src/a.rs"));
        assert_eq!(k1.kind.as_deref(), Some("module"));
        assert_eq!(k1.explicit_importance, Some(3.0));

        let c1 = model.node(&NodeId::from("c1")).expect("c1");
        assert_eq!(c1.tier, Tier::P1);
        assert!(c1.pinned);
        assert_eq!(c1.pos, Some(Vec2::new(10.0, -4.0)));

        let third = model.node(&NodeId::from("node-2")).expect("index id");
        assert_eq!(third.label, "Third");
        assert!(third.pinned);
        assert_eq!(third.pos, Some(Vec2::new(1.0, 2.0)));

        assert_eq!(model.edges.len(), 2);
        assert_eq!(model.edges[0].kind, EdgeKind::Link);
        assert_eq!(model.edges[0].id, "e0");
        assert_eq!(model.edges[1].kind, EdgeKind::Aggregate);
    }

    #[test]
    fn first_duplicate_wins_and_junk_is_skipped() {
        let model = normalize_payload(&json!({
            "nodes": [{"id": "a", "label": "one"}, 7, null, {"id": "a", "label": "two"}],
            "links": [{"source": null, "target": "a"}, "junk", {"source": "a"}]
        }));

        assert_eq!(model.len(), 1);
        assert_eq!(model.nodes[0].label, "one");
        assert!(model.edges.is_empty());
    }

    #[test]
    fn non_object_or_empty_payload_yields_empty_model() {
        assert!(normalize_payload(&json!([1, 2, 3])).is_empty());
        assert!(normalize_payload(&json!("nope")).is_empty());
        assert!(normalize_payload(&json!({"nodes": []})).is_empty());
    }

    #[test]
    fn non_finite_positions_are_ignored() {
        let model = normalize_payload(&json!({
            "nodes": [{"id": "a", "position": {"x": "left", "y": 2.0}}]
        }));
        assert_eq!(model.nodes[0].pos, None);
    }

    #[test]
    fn summary_view_keeps_only_aggregate_edges() {
        let model = normalize_payload(&json!({
            "view": "Summary",
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [
                {"source": "a", "target": "b", "kind": "aggregate"},
                {"source": "a", "target": "b", "kind": "docs_link"},
                {"source": "b", "target": "lost"}
            ]
        }));

        assert_eq!(model.view_name.as_deref(), Some("Summary"));
        assert_eq!(model.edges.len(), 1);
        assert_eq!(model.edges[0].kind, EdgeKind::Aggregate);
        // Filtered edges never synthesize endpoints.
        assert!(!model.contains(&NodeId::from("lost")));
    }

    #[test]
    fn named_views_drop_doc_links_and_docs_keeps_them() {
        let links = json!([
            {"source": "a", "target": "b", "kind": "docs_link"},
            {"source": "a", "target": "b"}
        ]);
        let pipeline = normalize_payload(&json!({"meta": {"view": "Pipeline"}, "links": links}));
        assert_eq!(pipeline.edges.len(), 1);
        assert_eq!(pipeline.edges[0].kind, EdgeKind::Generic);

        let docs = normalize_payload(&json!({"current_view": "Docs", "links": links}));
        assert_eq!(docs.edges.len(), 1);
        assert_eq!(docs.edges[0].kind, EdgeKind::DocsLink);
    }
}
