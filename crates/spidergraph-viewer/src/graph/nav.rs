use serde::{Deserialize, Serialize};
use spidergraph_core::NodeId;
use std::collections::BTreeMap;

use crate::graph::model::{GraphModel, Node};

/// Ids tried, in order, when no home root is configured.
pub const PREFERRED_HOME_IDS: [&str; 4] = ["dir:specs/", "specs/", "root", "ROOT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub view: Option<String>,
    pub root: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    DrillDown(NodeId),
    Back,
    Up,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved(Navigation),
    Unchanged,
}

/// Current root plus the back-stack. Transitions produce a new value and
/// leave the old one untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub root: Option<NodeId>,
    pub view: Option<String>,
    pub stack: Vec<NavEntry>,
}

impl Navigation {
    pub fn starting_at(root: Option<NodeId>, view: Option<String>) -> Self {
        Self {
            root,
            view,
            stack: Vec::new(),
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    fn current(&self) -> Option<NavEntry> {
        self.root.clone().map(|root| NavEntry {
            view: self.view.clone(),
            root,
        })
    }

    /// Moves to `root` inside `view`, remembering where we were.
    pub fn pushed(&self, root: NodeId, view: Option<String>) -> Navigation {
        let mut next = self.clone();
        next.stack.extend(self.current());
        next.root = Some(root);
        next.view = view;
        next
    }

    pub fn apply(&self, command: NavCommand, model: &GraphModel, home: Option<&NodeId>) -> Transition {
        match command {
            NavCommand::DrillDown(id) => {
                if !model.contains(&id) || self.root.as_ref() == Some(&id) {
                    return Transition::Unchanged;
                }
                Transition::Moved(self.pushed(id, self.view.clone()))
            }
            NavCommand::Back => {
                let mut next = self.clone();
                match next.stack.pop() {
                    Some(entry) => {
                        next.root = Some(entry.root);
                        next.view = entry.view;
                        Transition::Moved(next)
                    }
                    None => Transition::Unchanged,
                }
            }
            NavCommand::Up => {
                let parent = self
                    .root
                    .as_ref()
                    .and_then(|root| model.node(root))
                    .and_then(|node| node.parent.clone())
                    .filter(|parent| model.contains(parent));
                match parent {
                    Some(parent) => Transition::Moved(self.pushed(parent, self.view.clone())),
                    None => Transition::Unchanged,
                }
            }
            NavCommand::Home => {
                let next = Navigation::starting_at(home.cloned(), self.view.clone());
                if next == *self {
                    Transition::Unchanged
                } else {
                    Transition::Moved(next)
                }
            }
        }
    }
}

/// Home root for `model`: the configured id if present, then the preferred
/// ids, then the first top-level group, then the first node.
pub fn default_root(model: &GraphModel, configured: Option<&NodeId>) -> Option<NodeId> {
    if let Some(id) = configured.filter(|id| model.contains(id)) {
        return Some(id.clone());
    }
    PREFERRED_HOME_IDS
        .iter()
        .map(|id| NodeId::from(*id))
        .find(|id| model.contains(id))
        .or_else(|| {
            model
                .nodes
                .iter()
                .find(|n| n.is_group && n.parent.is_none())
                .map(|n| n.id.clone())
        })
        .or_else(|| model.nodes.first().map(|n| n.id.clone()))
}

/// Category key to view name table used when drilling into a category node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewRoutes {
    pub routes: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for ViewRoutes {
    fn default() -> Self {
        let routes = [
            ("Docs", "Docs"),
            ("Contracts", "Contracts"),
            ("Modules", "Pipeline"),
            ("Meta", "Meta"),
            ("Runs", "Runs"),
            ("Gates", "Gates"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            routes,
            fallback: "Pipeline".to_string(),
        }
    }
}

/// A view to ask the collaborator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub view: String,
    pub focus: Option<String>,
}

impl ViewRoutes {
    pub fn category_key(node: &Node) -> String {
        let id = node.id.as_str();
        let key = id
            .strip_prefix("cat.")
            .or_else(|| id.strip_prefix("category."))
            .unwrap_or(id);
        key.to_string()
    }

    pub fn request_for(&self, node: &Node) -> ViewRequest {
        let key = Self::category_key(node);
        let view = self
            .routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        ViewRequest {
            view,
            focus: Some(key).filter(|k| !k.is_empty()),
        }
    }
}
