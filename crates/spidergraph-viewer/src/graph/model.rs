use bevy::prelude::Vec2;
use smallvec::SmallVec;
use spidergraph_core::NodeId;
use std::collections::{HashMap, HashSet};

/// Discrete importance bucket. `P0` is the most prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Tier {
    P0,
    P1,
    P2,
    #[default]
    P3,
    Category,
    Other,
}

impl Tier {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let tier = match raw.to_ascii_lowercase().as_str() {
            "p0" => Self::P0,
            "p1" => Self::P1,
            "p2" => Self::P2,
            "p3" => Self::P3,
            "category" => Self::Category,
            _ => Self::Other,
        };
        Some(tier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::Category => "Category",
            Self::Other => "Other",
        }
    }

    /// Draw opacity; minor tiers fade into the background.
    pub fn opacity(self) -> f32 {
        match self {
            Self::P0 | Self::Category => 1.0,
            Self::P1 => 0.9,
            Self::P2 => 0.75,
            Self::P3 => 0.55,
            Self::Other => 0.45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EdgeKind {
    #[default]
    Generic,
    Aggregate,
    Membership,
    DocsLink,
    Link,
    Other(String),
}

impl EdgeKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" => Self::Generic,
            "aggregate" => Self::Aggregate,
            "membership" => Self::Membership,
            "docs_link" => Self::DocsLink,
            "link" => Self::Link,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Generic => "generic",
            Self::Aggregate => "aggregate",
            Self::Membership => "membership",
            Self::DocsLink => "docs_link",
            Self::Link => "link",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub display_label: String,
    pub path: Option<String>,
    pub kind: Option<String>,
    pub importance: f32,
    pub explicit_importance: Option<f32>,
    pub tier: Tier,
    pub explicit_tier: Option<Tier>,
    pub is_group: bool,
    /// Number of path segments for synthesized groups, 0 otherwise.
    pub group_depth: usize,
    pub parent: Option<NodeId>,
    pub pos: Option<Vec2>,
    pub vel: Vec2,
    pub pinned: bool,
    /// Set for nodes that only exist because an edge referenced them.
    pub synthesized: bool,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            display_label: crate::graph::label::display_label(&label),
            id,
            label,
            path: None,
            kind: None,
            importance: 0.0,
            explicit_importance: None,
            tier: Tier::default(),
            explicit_tier: None,
            is_group: false,
            group_depth: 0,
            parent: None,
            pos: None,
            vel: Vec2::ZERO,
            pinned: false,
            synthesized: false,
        }
    }

    pub fn placeholder(id: NodeId) -> Self {
        let label = id.0.clone();
        let mut node = Self::new(id, label);
        node.synthesized = true;
        node
    }

    pub fn group(id: NodeId, label: &str, path: String, depth: usize) -> Self {
        let mut node = Self::new(id, label);
        node.path = Some(path);
        node.is_group = true;
        node.group_depth = depth;
        node
    }

    pub fn is_category(&self) -> bool {
        self.tier == Tier::Category
            || self
                .kind
                .as_deref()
                .is_some_and(|kind| kind.eq_ignore_ascii_case("category"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub weight: f32,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            kind,
            weight: 1.0,
        }
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

/// Canonical node/edge set for one loaded payload.
///
/// Nodes are kept in insertion order so every derived structure iterates
/// deterministically. Nodes are never removed; a new payload replaces the
/// whole model.
#[derive(Debug, Default, Clone)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub view_name: Option<String>,
    index: HashMap<NodeId, usize>,
    ends: Vec<(usize, usize)>,
    incident: Vec<SmallVec<[usize; 8]>>,
}

impl GraphModel {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).map(|ix| &self.nodes[ix])
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let ix = self.index_of(id)?;
        Some(&mut self.nodes[ix])
    }

    /// Inserts `node` unless its id is taken; returns the index either way.
    pub fn push_node(&mut self, node: Node) -> usize {
        if let Some(ix) = self.index_of(&node.id) {
            return ix;
        }
        let ix = self.nodes.len();
        self.index.insert(node.id.clone(), ix);
        self.nodes.push(node);
        self.incident.push(SmallVec::new());
        ix
    }

    /// Adds an edge whose endpoints both exist. Returns false otherwise.
    pub fn push_edge(&mut self, edge: Edge) -> bool {
        let (Some(from), Some(to)) = (self.index_of(&edge.source), self.index_of(&edge.target))
        else {
            return false;
        };
        let eix = self.edges.len();
        self.edges.push(edge);
        self.ends.push((from, to));
        self.incident[from].push(eix);
        if to != from {
            self.incident[to].push(eix);
        }
        true
    }

    pub fn edge_ends(&self, eix: usize) -> (usize, usize) {
        self.ends[eix]
    }

    /// Undirected neighbours over every edge kind, in edge order.
    pub fn neighbors(&self, ix: usize) -> impl Iterator<Item = usize> + '_ {
        self.incident[ix].iter().filter_map(move |&eix| {
            let (from, to) = self.ends[eix];
            let other = if from == ix { to } else { from };
            (other != ix).then_some(other)
        })
    }

    pub fn parent_index(&self, ix: usize) -> Option<usize> {
        self.nodes[ix]
            .parent
            .as_ref()
            .and_then(|parent| self.index_of(parent))
    }

    /// Parent chain of `id`, nearest first. Stops on cycles.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(mut ix) = self.index_of(id) else {
            return out;
        };
        let mut seen = HashSet::new();
        seen.insert(ix);
        while let Some(parent) = self.parent_index(ix) {
            if !seen.insert(parent) {
                break;
            }
            out.push(self.nodes[parent].id.clone());
            ix = parent;
        }
        out
    }

    pub fn membership_pairs(&self) -> HashSet<(NodeId, NodeId)> {
        self.edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Membership)
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect()
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        let wanted = crate::graph::hierarchy::normalize_path(path);
        self.nodes.iter().find(|node| {
            node.path
                .as_deref()
                .is_some_and(|p| crate::graph::hierarchy::normalize_path(p) == wanted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId(s.to_string())
    }

    #[test]
    fn push_edge_requires_both_endpoints() {
        let mut model = GraphModel::default();
        model.push_node(Node::new(id("a"), "a"));
        assert!(!model.push_edge(Edge::new("e0", id("a"), id("b"), EdgeKind::Generic)));
        model.push_node(Node::new(id("b"), "b"));
        assert!(model.push_edge(Edge::new("e0", id("a"), id("b"), EdgeKind::Generic)));
        assert_eq!(model.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(model.neighbors(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn ancestors_stop_on_cycles() {
        let mut model = GraphModel::default();
        let mut a = Node::new(id("a"), "a");
        a.parent = Some(id("b"));
        let mut b = Node::new(id("b"), "b");
        b.parent = Some(id("a"));
        model.push_node(a);
        model.push_node(b);

        assert_eq!(model.ancestors(&id("a")), vec![id("b")]);
    }

    #[test]
    fn opacity_drops_with_tier() {
        let order = [Tier::P0, Tier::P1, Tier::P2, Tier::P3, Tier::Other];
        assert!(order.windows(2).all(|w| w[0].opacity() > w[1].opacity()));
        assert_eq!(Tier::Category.opacity(), 1.0);
        assert!(Tier::P3.opacity() < 0.6);
    }

    #[test]
    fn tier_parse_maps_unknown_labels_to_other() {
        assert_eq!(Tier::parse("p1"), Some(Tier::P1));
        assert_eq!(Tier::parse("Category"), Some(Tier::Category));
        assert_eq!(Tier::parse("core"), Some(Tier::Other));
        assert_eq!(Tier::parse("  "), None);
    }
}
