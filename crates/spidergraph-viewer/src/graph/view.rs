use serde::{Deserialize, Serialize};
use spidergraph_core::NodeId;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::model::GraphModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    /// Hops expanded from the root. Values below 1 are treated as 1.
    pub max_depth: usize,
    /// Cap on BFS admissions. Ancestors added afterwards do not count.
    pub max_nodes: usize,
    pub main_labels: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_nodes: 240,
            main_labels: 60,
        }
    }
}

/// The visible neighbourhood of one navigation state.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub root: Option<NodeId>,
    /// Visible nodes in admission order.
    pub order: Vec<NodeId>,
    pub visible: HashSet<NodeId>,
    /// Indices into `GraphModel::edges` whose endpoints are both visible.
    pub edges: Vec<usize>,
    pub depth_of: HashMap<NodeId, usize>,
    pub main_labels: HashSet<NodeId>,
}

impl View {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.visible.contains(id)
    }

    pub fn depth(&self, id: &NodeId) -> Option<usize> {
        self.depth_of.get(id).copied()
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.root.as_ref() == Some(id)
    }
}

fn by_importance(model: &GraphModel, a: usize, b: usize) -> Ordering {
    let (na, nb) = (&model.nodes[a], &model.nodes[b]);
    nb.importance
        .partial_cmp(&na.importance)
        .unwrap_or(Ordering::Equal)
        .then_with(|| na.id.cmp(&nb.id))
}

/// Bounded breadth-first expansion from `root`, strongest neighbours first,
/// followed by the parent chains of everything admitted.
pub fn build_view(model: &GraphModel, root: &NodeId, params: &ViewParams) -> View {
    let Some(root_ix) = model.index_of(root) else {
        return View::default();
    };
    let max_depth = params.max_depth.max(1);
    let max_nodes = params.max_nodes.max(1);

    let mut depth: Vec<Option<usize>> = vec![None; model.len()];
    let mut order = vec![root_ix];
    let mut queue = VecDeque::from([root_ix]);
    depth[root_ix] = Some(0);

    'bfs: while let Some(ix) = queue.pop_front() {
        let d = depth[ix].unwrap_or(0);
        if d >= max_depth {
            continue;
        }
        let mut next: Vec<usize> = model.neighbors(ix).filter(|&nb| depth[nb].is_none()).collect();
        next.sort_by(|&a, &b| by_importance(model, a, b));
        next.dedup();
        for nb in next {
            if order.len() >= max_nodes {
                break 'bfs;
            }
            depth[nb] = Some(d + 1);
            order.push(nb);
            queue.push_back(nb);
        }
    }

    let admitted = order.len();
    for i in 0..admitted {
        let mut child = order[i];
        // Chains longer than the model imply a parent cycle.
        for _ in 0..model.len() {
            let Some(parent) = model.parent_index(child) else {
                break;
            };
            if depth[parent].is_none() {
                let below = depth[child].unwrap_or(0);
                depth[parent] = Some((below + 1).min(max_depth));
                order.push(parent);
            }
            child = parent;
        }
    }

    let visible: HashSet<NodeId> = order.iter().map(|&ix| model.nodes[ix].id.clone()).collect();
    let edges: Vec<usize> = (0..model.edges.len())
        .filter(|&eix| {
            let (from, to) = model.edge_ends(eix);
            depth[from].is_some() && depth[to].is_some()
        })
        .collect();

    let mut ranked = order.clone();
    ranked.sort_by(|&a, &b| by_importance(model, a, b));
    let mut main_labels: HashSet<NodeId> = ranked
        .into_iter()
        .take(params.main_labels)
        .map(|ix| model.nodes[ix].id.clone())
        .collect();
    main_labels.insert(root.clone());
    for &eix in &edges {
        let (from, to) = model.edge_ends(eix);
        if from == root_ix {
            main_labels.insert(model.nodes[to].id.clone());
        } else if to == root_ix {
            main_labels.insert(model.nodes[from].id.clone());
        }
    }

    let depth_of = order
        .iter()
        .filter_map(|&ix| Some((model.nodes[ix].id.clone(), depth[ix]?)))
        .collect();

    View {
        root: Some(root.clone()),
        order: order.iter().map(|&ix| model.nodes[ix].id.clone()).collect(),
        visible,
        edges,
        depth_of,
        main_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hierarchy::derive_groups;
    use crate::graph::importance::{score_graph, ScoringConfig};
    use crate::graph::normalize::normalize_payload;
    use serde_json::json;

    fn chain(n: usize) -> GraphModel {
        let nodes: Vec<_> = (0..n).map(|i| json!({"id": format!("n{i}")})).collect();
        let links: Vec<_> = (1..n)
            .map(|i| json!({"source": "n0", "target": format!("n{i}")}))
            .collect();
        let mut model = normalize_payload(&json!({"nodes": nodes, "links": links}));
        score_graph(&mut model, &ScoringConfig::default());
        model
    }

    #[test]
    fn unknown_root_gives_empty_view() {
        let model = chain(3);
        let view = build_view(&model, &"missing".into(), &ViewParams::default());
        assert!(view.is_empty());
        assert!(view.root.is_none());
    }

    #[test]
    fn admission_respects_caps_and_root_depth() {
        let model = chain(50);
        let params = ViewParams {
            max_depth: 2,
            max_nodes: 10,
            main_labels: 3,
        };
        let view = build_view(&model, &"n0".into(), &params);

        assert_eq!(view.len(), 10);
        assert_eq!(view.depth(&"n0".into()), Some(0));
        assert!(view.depth_of.values().all(|&d| d <= params.max_depth));
        // Ties on importance break by id.
        assert_eq!(view.order[1], NodeId::from("n1"));
        assert_eq!(view.order[2], NodeId::from("n10"));
    }

    #[test]
    fn a_b_c_scenario_stops_at_depth_one() {
        let mut model = normalize_payload(&json!({
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "links": [{"source": "A", "target": "B"}, {"source": "B", "target": "C"}]
        }));
        score_graph(&mut model, &ScoringConfig::default());
        let params = ViewParams {
            max_depth: 1,
            ..ViewParams::default()
        };

        let view = build_view(&model, &"A".into(), &params);
        assert!(view.contains(&"A".into()));
        assert!(view.contains(&"B".into()));
        assert!(!view.contains(&"C".into()));
        assert_eq!(view.edges.len(), 1);
        assert!(view.main_labels.contains(&"B".into()));
    }

    #[test]
    fn zero_depth_is_clamped_to_one() {
        let model = chain(4);
        let params = ViewParams {
            max_depth: 0,
            ..ViewParams::default()
        };
        let view = build_view(&model, &"n0".into(), &params);
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn ancestors_of_visible_nodes_are_always_included() {
        let mut model = normalize_payload(&json!({
            "nodes": [
                {"id": "hub"},
                {"id": "leaf", "path": "a/b/c/leaf.md"}
            ],
            "links": [{"source": "hub", "target": "leaf"}]
        }));
        derive_groups(&mut model);
        score_graph(&mut model, &ScoringConfig::default());
        let params = ViewParams {
            max_depth: 1,
            max_nodes: 2,
            main_labels: 10,
        };

        let view = build_view(&model, &"hub".into(), &params);
        for id in view.order.clone() {
            for ancestor in model.ancestors(&id) {
                assert!(view.contains(&ancestor), "{ancestor} missing for {id}");
            }
        }
        assert!(view.contains(&"group:a".into()));
        assert!(view.depth_of.values().all(|&d| d <= 1));
    }
}
