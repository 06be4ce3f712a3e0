use spidergraph_core::NodeId;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::graph::model::{Edge, EdgeKind, GraphModel, Node};

pub const GROUP_PREFIX: &str = "group:";

/// `/`-separated form of `path` with no trailing separator.
pub fn normalize_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    trimmed.strip_prefix("./").unwrap_or(trimmed).to_string()
}

pub fn path_segments(path: &str) -> Vec<String> {
    normalize_path(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn group_id(prefix: &str) -> NodeId {
    NodeId(format!("{GROUP_PREFIX}{prefix}"))
}

/// Synthesizes a container for every directory prefix of a parentless
/// node's path and links each node to its innermost container.
///
/// Running it twice yields the same model. Returns the number of groups
/// created.
pub fn derive_groups(model: &mut GraphModel) -> usize {
    let mut by_path: HashMap<String, NodeId> = HashMap::new();
    for node in model.nodes.iter().filter(|n| !n.is_group) {
        if let Some(path) = node.path.as_deref() {
            by_path
                .entry(normalize_path(path))
                .or_insert_with(|| node.id.clone());
        }
    }
    let mut linked = model.membership_pairs();

    let pending: Vec<(NodeId, Vec<String>)> = model
        .nodes
        .iter()
        .filter(|n| !n.is_group && n.parent.is_none())
        .filter_map(|n| Some((n.id.clone(), path_segments(n.path.as_deref()?))))
        .filter(|(_, segs)| segs.len() > 1)
        .collect();

    let mut created = 0usize;
    for (id, segs) in pending {
        if model.node(&id).is_some_and(|n| n.parent.is_some()) {
            continue;
        }

        let mut outer: Option<NodeId> = None;
        for depth in 1..segs.len() {
            let prefix = segs[..depth].join("/");
            let container = match by_path.get(&prefix) {
                Some(existing) if *existing != id => existing.clone(),
                _ => {
                    let gid = group_id(&prefix);
                    if !model.contains(&gid) {
                        model.push_node(Node::group(
                            gid.clone(),
                            &segs[depth - 1],
                            format!("{prefix}/"),
                            depth,
                        ));
                        created += 1;
                    }
                    gid
                }
            };

            if let Some(parent) = outer.as_ref().filter(|p| **p != container) {
                if let Some(node) = model.node_mut(&container) {
                    if node.parent.is_none() {
                        node.parent = Some(parent.clone());
                    }
                }
                link(model, &mut linked, parent, &container);
            }
            outer = Some(container);
        }

        if let Some(parent) = outer {
            if let Some(node) = model.node_mut(&id) {
                node.parent = Some(parent.clone());
            }
            link(model, &mut linked, &parent, &id);
        }
    }

    debug!(created, "derived groups");
    created
}

fn link(
    model: &mut GraphModel,
    linked: &mut HashSet<(NodeId, NodeId)>,
    parent: &NodeId,
    child: &NodeId,
) {
    if linked.insert((parent.clone(), child.clone())) {
        let edge = Edge::new(
            format!("m:{parent}>{child}"),
            parent.clone(),
            child.clone(),
            EdgeKind::Membership,
        );
        model.push_edge(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::normalize::normalize_payload;
    use serde_json::json;

    fn sample() -> GraphModel {
        normalize_payload(&json!({
            "nodes": [
                {"id": "dir:specs/", "label": "specs/", "path": "specs/"},
                {"id": "s1", "path": "specs/modules/view.md"},
                {"id": "s2", "path": "specs/modules/layout.md"},
                {"id": "top", "path": "README.md"},
                {"id": "x", "path": "src\\core\\x.rs"}
            ]
        }))
    }

    #[test]
    fn builds_nested_containers_and_reuses_existing_nodes() {
        let mut model = sample();
        let created = derive_groups(&mut model);
        assert_eq!(created, 3);

        let s1 = model.node(&"s1".into()).expect("s1");
        assert_eq!(s1.parent, Some(group_id("specs/modules")));

        let modules = model.node(&group_id("specs/modules")).expect("modules group");
        assert!(modules.is_group);
        assert_eq!(modules.label, "modules");
        assert_eq!(modules.parent, Some("dir:specs/".into()));

        assert_eq!(
            model.ancestors(&"x".into()),
            vec![group_id("src/core"), group_id("src")]
        );
        assert!(model.node(&"top".into()).expect("top").parent.is_none());
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut model = sample();
        derive_groups(&mut model);
        let nodes = model.len();
        let edges = model.edges.len();
        let parents: Vec<_> = model.nodes.iter().map(|n| n.parent.clone()).collect();

        assert_eq!(derive_groups(&mut model), 0);
        assert_eq!(model.len(), nodes);
        assert_eq!(model.edges.len(), edges);
        let again: Vec<_> = model.nodes.iter().map(|n| n.parent.clone()).collect();
        assert_eq!(parents, again);
    }

    #[test]
    fn membership_edges_are_unique_per_pair() {
        let mut model = sample();
        derive_groups(&mut model);
        let pairs = model.membership_pairs();
        let count = model
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Membership)
            .count();
        assert_eq!(pairs.len(), count);
        assert!(pairs.contains(&(group_id("specs/modules"), "s2".into())));
    }

    #[test]
    fn explicit_parents_are_left_alone() {
        let mut model = normalize_payload(&json!({
            "nodes": [{"id": "p"}, {"id": "c", "path": "a/b/c.md", "parent": "p"}]
        }));
        assert_eq!(derive_groups(&mut model), 0);
        assert_eq!(model.node(&"c".into()).expect("c").parent, Some("p".into()));
    }
}
