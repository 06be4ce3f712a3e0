use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::graph::model::{EdgeKind, GraphModel, Node, Tier};

/// Importance heuristics and tier cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Case-insensitive substrings of label or path that force tier `P0`.
    pub pinned_patterns: Vec<String>,
    /// Weaker substrings that only add [`ScoringConfig::secondary_boost`].
    pub secondary_patterns: Vec<String>,
    pub pinned_boost: f32,
    pub secondary_boost: f32,
    /// Multiplier on the count of content edges.
    pub degree_weight: f32,
    pub leaf_p1_percentile: f32,
    pub leaf_p2_percentile: f32,
    pub group_p1_percentile: f32,
    pub group_p2_percentile: f32,
    /// How many of a group's strongest children contribute to its score.
    pub group_top_children: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pinned_patterns: ["agents", "playbook", "runbook", "overview", "readme"]
                .into_iter()
                .map(String::from)
                .collect(),
            secondary_patterns: ["spec", "contract", "index", "main", "lib", "mod"]
                .into_iter()
                .map(String::from)
                .collect(),
            pinned_boost: 12.0,
            secondary_boost: 2.0,
            degree_weight: 1.0,
            leaf_p1_percentile: 0.95,
            leaf_p2_percentile: 0.80,
            group_p1_percentile: 0.80,
            group_p2_percentile: 0.50,
            group_top_children: 5,
        }
    }
}

impl ScoringConfig {
    fn matches(patterns: &[String], node: &Node) -> bool {
        let label = node.label.to_lowercase();
        let path = node.path.as_deref().unwrap_or("").to_lowercase();
        patterns.iter().any(|pat| {
            let pat = pat.trim().to_lowercase();
            !pat.is_empty() && (label.contains(&pat) || path.contains(&pat))
        })
    }

    pub fn is_pinned(&self, node: &Node) -> bool {
        Self::matches(&self.pinned_patterns, node)
    }

    pub fn is_secondary(&self, node: &Node) -> bool {
        Self::matches(&self.secondary_patterns, node)
    }
}

/// Value at `floor(n * p)` of an ascending slice.
fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return f32::INFINITY;
    }
    let at = ((sorted.len() as f32) * p.clamp(0.0, 1.0)).floor() as usize;
    sorted[at.min(sorted.len() - 1)]
}

fn content_degree(model: &GraphModel) -> Vec<usize> {
    let mut degree = vec![0usize; model.len()];
    for (eix, edge) in model.edges.iter().enumerate() {
        if edge.kind == EdgeKind::Membership {
            continue;
        }
        let (from, to) = model.edge_ends(eix);
        degree[from] += 1;
        if to != from {
            degree[to] += 1;
        }
    }
    degree
}

/// Assigns `importance` and `tier` to every node. Same model in, same
/// scores out.
pub fn score_graph(model: &mut GraphModel, cfg: &ScoringConfig) {
    let degree = content_degree(model);

    let mut leaf_scores = Vec::new();
    for (ix, node) in model.nodes.iter_mut().enumerate() {
        if node.is_group {
            continue;
        }
        node.importance = node.explicit_importance.unwrap_or_else(|| {
            let boost = if cfg.is_pinned(node) {
                cfg.pinned_boost
            } else if cfg.is_secondary(node) {
                cfg.secondary_boost
            } else {
                0.0
            };
            degree[ix] as f32 * cfg.degree_weight + boost
        });
        leaf_scores.push(node.importance);
    }
    leaf_scores.sort_by(f32::total_cmp);
    let p1 = percentile(&leaf_scores, cfg.leaf_p1_percentile);
    let p2 = percentile(&leaf_scores, cfg.leaf_p2_percentile);

    for node in model.nodes.iter_mut().filter(|n| !n.is_group) {
        node.tier = if cfg.is_pinned(node) {
            Tier::P0
        } else if let Some(tier) = node.explicit_tier {
            tier
        } else if node.importance >= p1 {
            Tier::P1
        } else if node.importance >= p2 {
            Tier::P2
        } else {
            Tier::P3
        };
    }

    score_groups(model, cfg);
}

fn score_groups(model: &mut GraphModel, cfg: &ScoringConfig) {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); model.len()];
    for ix in 0..model.len() {
        if let Some(parent) = model.parent_index(ix) {
            if model.nodes[parent].is_group && parent != ix {
                children[parent].push(ix);
            }
        }
    }

    let mut groups: Vec<usize> = (0..model.len()).filter(|&ix| model.nodes[ix].is_group).collect();
    if groups.is_empty() {
        return;
    }
    // Deepest first so nested groups are scored before their parents read them.
    groups.sort_by(|&a, &b| {
        let (na, nb) = (&model.nodes[a], &model.nodes[b]);
        nb.group_depth
            .cmp(&na.group_depth)
            .then_with(|| na.id.cmp(&nb.id))
    });

    let mut group_scores = Vec::with_capacity(groups.len());
    for &gix in &groups {
        let mut scores: Vec<f32> = children[gix]
            .iter()
            .map(|&c| model.nodes[c].importance)
            .collect();
        scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        let score: f32 = scores.iter().take(cfg.group_top_children.max(1)).sum();
        model.nodes[gix].importance = score;
        group_scores.push(score);
    }

    group_scores.sort_by(f32::total_cmp);
    let p1 = percentile(&group_scores, cfg.group_p1_percentile);
    let p2 = percentile(&group_scores, cfg.group_p2_percentile);
    for gix in groups {
        let node = &mut model.nodes[gix];
        node.tier = if node.importance >= p1 {
            Tier::P1
        } else if node.importance >= p2 {
            Tier::P2
        } else {
            Tier::P3
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hierarchy::derive_groups;
    use crate::graph::normalize::normalize_payload;
    use serde_json::json;

    fn sample() -> GraphModel {
        normalize_payload(&json!({
            "nodes": [
                {"id": "readme", "path": "docs/README.md"},
                {"id": "a", "path": "src/a.rs"},
                {"id": "b", "path": "src/b.rs"},
                {"id": "c", "path": "src/deep/c.rs"},
                {"id": "d", "path": "src/deep/d.rs", "tier": "Category"},
                {"id": "e", "path": "tools/e.py", "importance": 50}
            ],
            "links": [
                {"source": "a", "target": "b"},
                {"source": "a", "target": "c"},
                {"source": "a", "target": "d"},
                {"source": "b", "target": "c"}
            ]
        }))
    }

    #[test]
    fn scoring_is_deterministic() {
        let cfg = ScoringConfig::default();
        let mut first = sample();
        derive_groups(&mut first);
        score_graph(&mut first, &cfg);
        let mut second = sample();
        derive_groups(&mut second);
        score_graph(&mut second, &cfg);

        let snapshot = |m: &GraphModel| {
            m.nodes
                .iter()
                .map(|n| (n.id.clone(), n.importance.to_bits(), n.tier))
                .collect::<Vec<_>>()
        };
        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn pinned_patterns_explicit_values_and_degree() {
        let cfg = ScoringConfig::default();
        let mut model = sample();
        score_graph(&mut model, &cfg);

        let readme = model.node(&"readme".into()).expect("readme");
        assert_eq!(readme.tier, Tier::P0);
        assert_eq!(readme.importance, 12.0);

        let a = model.node(&"a".into()).expect("a");
        assert_eq!(a.importance, 3.0);

        let d = model.node(&"d".into()).expect("d");
        assert_eq!(d.tier, Tier::Category);

        let e = model.node(&"e".into()).expect("e");
        assert_eq!(e.importance, 50.0);
        assert_eq!(e.tier, Tier::P1);
    }

    #[test]
    fn membership_edges_do_not_count_as_degree() {
        let cfg = ScoringConfig::default();
        let mut plain = sample();
        score_graph(&mut plain, &cfg);
        let mut grouped = sample();
        derive_groups(&mut grouped);
        score_graph(&mut grouped, &cfg);

        for node in plain.nodes.iter() {
            let other = grouped.node(&node.id).expect("same node");
            assert_eq!(node.importance, other.importance, "{}", node.id);
        }
    }

    #[test]
    fn groups_sum_their_strongest_children() {
        let cfg = ScoringConfig {
            group_top_children: 1,
            ..ScoringConfig::default()
        };
        let mut model = sample();
        derive_groups(&mut model);
        score_graph(&mut model, &cfg);

        let deep = model.node(&"group:src/deep".into()).expect("deep group");
        let c = model.node(&"c".into()).expect("c").importance;
        let d = model.node(&"d".into()).expect("d").importance;
        assert_eq!(deep.importance, c.max(d));

        let src = model.node(&"group:src".into()).expect("src group");
        let a = model.node(&"a".into()).expect("a").importance;
        assert_eq!(src.importance, a.max(deep.importance));
    }
}
