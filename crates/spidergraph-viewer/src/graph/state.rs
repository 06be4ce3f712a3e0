use bevy::prelude::{Resource, Vec2};
use serde_json::Value;
use spidergraph_core::NodeId;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bridge::{GraphBridge, OpenRequest};
use crate::graph::bootstrap::bootstrap_payload;
use crate::graph::hierarchy::derive_groups;
use crate::graph::importance::{score_graph, ScoringConfig};
use crate::graph::layout::{layout_view, node_radius, seed_positions, Canvas, LayoutConfig, LayoutMode};
use crate::graph::model::GraphModel;
use crate::graph::nav::{default_root, NavCommand, Navigation, Transition, ViewRequest, ViewRoutes};
use crate::graph::normalize::normalize_payload;
use crate::graph::sim::ContinuousSim;
use crate::graph::view::{build_view, View, ViewParams};
use crate::interact::{LodController, TapDecision, TapTracker};
use crate::net::{Incoming, IncomingKind};
use crate::util::args::InitialFocus;
use crate::util::config::ViewerConfig;

pub const TOAST_TTL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub id: NodeId,
    pub was_pinned: bool,
}

#[derive(Default)]
pub struct SpatialState {
    pub canvas: Canvas,
    pub sim: ContinuousSim,
    pub drag: Option<DragState>,
}

pub struct UiState {
    pub hovered: Option<NodeId>,
    pub selected: Option<NodeId>,
    pub zoom: f32,

    pub search_open: bool,
    pub search_query: String,
    pub search_hits: Vec<NodeId>,

    pub show_help: bool,
    pub show_details: bool,
    pub show_settings: bool,
    /// Set on every view rebuild; the camera re-centers and clears it.
    pub fit_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            hovered: None,
            selected: None,
            zoom: 1.0,
            search_open: false,
            search_query: String::new(),
            search_hits: Vec::new(),
            show_help: false,
            show_details: true,
            show_settings: false,
            fit_requested: true,
        }
    }
}

#[derive(Default)]
pub struct PerfState {
    pub fps: f32,
    pub visible_nodes: usize,
    pub visible_edges: usize,
    pub drawn_edges: usize,
    pub rebuilds: u64,
    pub last_rebuild: Duration,
}

pub struct CfgState {
    pub view: ViewParams,
    pub scoring: ScoringConfig,
    pub layout: LayoutConfig,
    pub routes: ViewRoutes,
    pub home_root: Option<NodeId>,
    pub search_limit: usize,
    pub show_web: bool,
}

impl Default for CfgState {
    fn default() -> Self {
        Self {
            view: ViewParams::default(),
            scoring: ScoringConfig::default(),
            layout: LayoutConfig::default(),
            routes: ViewRoutes::default(),
            home_root: None,
            search_limit: 50,
            show_web: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub until: Duration,
}

/// Requests waiting to be handed to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Open(OpenRequest),
    View(ViewRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataOrigin {
    #[default]
    Bootstrap,
    Payload,
}

#[derive(Resource, Default)]
pub struct GraphState {
    pub model: GraphModel,
    pub nav: Navigation,
    pub view: View,
    pub spatial: SpatialState,
    pub ui: UiState,
    pub perf: PerfState,
    pub cfg: CfgState,
    pub lod: LodController,
    pub taps: TapTracker,

    pub toasts: VecDeque<Toast>,
    pub outbox: Vec<Outgoing>,
    pub origin: DataOrigin,
    /// Whether category drill-downs may ask the bridge for another view.
    pub remote_views: bool,
    /// Consumed by the first real payload.
    pub initial_focus: Option<InitialFocus>,

    pending_view: Option<ViewRequest>,
    view_cache: HashMap<String, Value>,
    /// View of the last payload loaded directly; Home returns to it.
    home_view: Option<String>,
}

fn prepare(model: &mut GraphModel, scoring: &ScoringConfig) {
    derive_groups(model);
    score_graph(model, scoring);
}

fn cache_key(view: Option<&str>) -> String {
    view.unwrap_or_default().to_string()
}

/// Adds `view` to an untagged payload so the normalizer filters it.
fn tag_view(payload: &mut Value, view: Option<&str>) {
    let (Some(view), Some(obj)) = (view, payload.as_object_mut()) else {
        return;
    };
    let tagged = obj.contains_key("view")
        || obj.contains_key("current_view")
        || obj.get("meta").and_then(|m| m.get("view")).is_some();
    if !tagged {
        obj.insert("view".to_string(), Value::String(view.to_string()));
    }
}

impl GraphState {
    /// Engine with `cfg` applied, showing the bootstrap graph.
    pub fn new(cfg: &ViewerConfig) -> Self {
        let mut st = Self::default();
        st.apply_viewer_config(cfg);
        st.load_bootstrap(Duration::ZERO, None);
        st
    }

    pub fn apply_viewer_config(&mut self, cfg: &ViewerConfig) {
        self.cfg.view = cfg.view;
        self.cfg.scoring = cfg.scoring.clone();
        self.cfg.layout = cfg.layout;
        self.cfg.routes = cfg.routes.clone();
        self.cfg.home_root = cfg.home_root.clone().map(NodeId);
        self.cfg.search_limit = cfg.search_limit.max(1);
        self.cfg.show_web = cfg.show_web;
        self.taps.set_config(cfg.tap);
        self.lod.set_config(cfg.lod.clone());
    }

    /// Current settings folded back into a saveable config.
    pub fn viewer_config(&self, base: &ViewerConfig) -> ViewerConfig {
        ViewerConfig {
            home_root: self.cfg.home_root.as_ref().map(|id| id.0.clone()),
            show_web: self.cfg.show_web,
            search_limit: self.cfg.search_limit,
            view: self.cfg.view,
            scoring: self.cfg.scoring.clone(),
            layout: self.cfg.layout,
            tap: self.taps.config(),
            lod: self.lod.config().clone(),
            routes: self.cfg.routes.clone(),
            source: base.source.clone(),
        }
    }

    pub fn notify(&mut self, text: impl Into<String>, now: Duration) {
        let text = text.into();
        info!(%text, "notice");
        self.toasts.push_back(Toast {
            text,
            until: now + TOAST_TTL,
        });
        while self.toasts.len() > 4 {
            self.toasts.pop_front();
        }
    }

    /// Time-driven housekeeping: deferred taps, debounced zoom, toasts.
    pub fn tick(&mut self, now: Duration) {
        if let Some(decision) = self.taps.poll(now) {
            self.apply_tap(decision, now);
        }
        self.lod.tick(now);
        self.toasts.retain(|t| t.until > now);
    }

    pub fn home_root(&self) -> Option<NodeId> {
        default_root(&self.model, self.cfg.home_root.as_ref())
    }

    // ----- Data loading -----

    pub fn apply(&mut self, inc: Incoming, now: Duration) {
        match inc.kind {
            IncomingKind::Connected => {
                self.notify(format!("Connected to {}", inc.stream), now);
            }
            IncomingKind::Disconnected => {
                self.remote_views = false;
                self.notify(format!("Disconnected from {}", inc.stream), now);
            }
            IncomingKind::Graph { view, mut payload } => {
                tag_view(&mut payload, view.as_deref());
                // Untagged frames are pushes of the default graph.
                let answers = self
                    .pending_view
                    .as_ref()
                    .is_some_and(|req| view.as_deref() == Some(req.view.as_str()));
                let pending = if answers { self.pending_view.take() } else { None };
                match pending {
                    Some(req) => self.receive_view(req, &payload, now),
                    None => {
                        self.load_payload(&payload, now);
                    }
                }
            }
            IncomingKind::Notice(text) => self.notify(text, now),
            IncomingKind::Other(msg) => debug!(?msg, stream = %inc.stream, "ignored frame"),
            IncomingKind::Error(e) => {
                warn!(stream = %inc.stream, "{e}");
                if let Some(req) = self.pending_view.take() {
                    self.load_bootstrap(now, Some(format!("View {} could not be loaded", req.view)));
                } else {
                    self.notify(e, now);
                }
            }
        }
    }

    /// Replaces the graph with `payload`. Falls back to the bootstrap graph
    /// and returns false when the payload holds no nodes.
    pub fn load_payload(&mut self, payload: &Value, now: Duration) -> bool {
        let mut model = normalize_payload(payload);
        if model.is_empty() {
            warn!("graph payload empty or malformed");
            self.load_bootstrap(now, Some("No graph data yet, showing project skeleton".to_string()));
            return false;
        }
        prepare(&mut model, &self.cfg.scoring);
        self.view_cache
            .insert(cache_key(model.view_name.as_deref()), payload.clone());

        let same_view = self.origin == DataOrigin::Payload && self.model.view_name == model.view_name;
        let previous = std::mem::replace(&mut self.model, model);
        if same_view {
            self.carry_positions(&previous);
        }
        self.origin = DataOrigin::Payload;
        self.home_view = self.model.view_name.clone();
        info!(
            nodes = self.model.len(),
            edges = self.model.edges.len(),
            view = ?self.model.view_name,
            "graph loaded"
        );

        let focus = self.initial_focus.take().and_then(|focus| self.resolve_focus(&focus));
        let keep = self
            .nav
            .root
            .clone()
            .filter(|root| same_view && self.model.contains(root));
        self.nav = match (focus, keep) {
            (Some(root), _) => Navigation::starting_at(Some(root), self.model.view_name.clone()),
            (None, Some(_)) => self.nav.clone(),
            (None, None) => Navigation::starting_at(self.home_root(), self.model.view_name.clone()),
        };
        self.ui.selected = self.nav.root.clone();
        self.rebuild_view();
        true
    }

    pub fn load_bootstrap(&mut self, now: Duration, reason: Option<String>) {
        let mut model = normalize_payload(&bootstrap_payload());
        prepare(&mut model, &self.cfg.scoring);
        self.model = model;
        self.origin = DataOrigin::Bootstrap;
        self.pending_view = None;
        self.nav = Navigation::starting_at(self.home_root(), None);
        self.ui.selected = None;
        self.rebuild_view();
        if let Some(reason) = reason {
            self.notify(reason, now);
        }
    }

    fn receive_view(&mut self, req: ViewRequest, payload: &Value, now: Duration) {
        let mut model = normalize_payload(payload);
        if model.is_empty() {
            warn!(view = %req.view, "requested view was empty");
            self.load_bootstrap(now, Some(format!("View {} is empty", req.view)));
            return;
        }
        prepare(&mut model, &self.cfg.scoring);
        self.view_cache
            .insert(cache_key(model.view_name.as_deref()), payload.clone());

        let focus = req.focus.as_deref().and_then(|focus| {
            model
                .node(&NodeId::from(focus))
                .or_else(|| model.nodes.iter().find(|n| n.label == focus))
                .map(|n| n.id.clone())
        });
        let Some(root) = focus.or_else(|| default_root(&model, self.cfg.home_root.as_ref())) else {
            return;
        };
        info!(view = %req.view, root = %root, "switched view");
        let next = self.nav.pushed(root, model.view_name.clone());
        self.model = model;
        self.origin = DataOrigin::Payload;
        self.set_nav(next);
    }

    fn resolve_focus(&self, focus: &InitialFocus) -> Option<NodeId> {
        let found = match focus {
            InitialFocus::Id(id) => self.model.node(&NodeId::from(id.as_str())),
            InitialFocus::Path(path) => self.model.find_by_path(path),
        };
        if found.is_none() {
            warn!(?focus, "initial focus not found in graph");
        }
        found.map(|n| n.id.clone())
    }

    fn carry_positions(&mut self, previous: &GraphModel) {
        for node in self.model.nodes.iter_mut() {
            if node.pos.is_some() {
                continue;
            }
            if let Some(old) = previous.node(&node.id) {
                node.pos = old.pos;
                node.pinned |= old.pinned;
            }
        }
    }

    // ----- Navigation -----

    fn set_nav(&mut self, next: Navigation) {
        if next.view != self.model.view_name {
            let key = cache_key(next.view.as_deref());
            if let Some(payload) = self.view_cache.get(&key).cloned() {
                let mut model = normalize_payload(&payload);
                prepare(&mut model, &self.cfg.scoring);
                self.model = model;
                self.origin = DataOrigin::Payload;
            }
        }
        self.nav = next;
        if self.nav.root.as_ref().map_or(true, |root| !self.model.contains(root)) {
            self.nav.root = self.home_root();
        }
        self.ui.selected = self.nav.root.clone();
        self.rebuild_view();
    }

    pub fn navigate(&mut self, command: NavCommand) -> bool {
        let home = self.home_root();
        match self.nav.apply(command.clone(), &self.model, home.as_ref()) {
            Transition::Moved(next) => {
                info!(?command, "navigate");
                self.set_nav(next);
                true
            }
            Transition::Unchanged => false,
        }
    }

    /// Drill into `id`. Category nodes of a multi-view host are routed to a
    /// view request instead.
    pub fn drill_down(&mut self, id: NodeId) {
        let Some(node) = self.model.node(&id) else {
            return;
        };
        if self.remote_views && node.is_category() {
            let req = self.cfg.routes.request_for(node);
            info!(view = %req.view, focus = ?req.focus, "requesting view");
            self.pending_view = Some(req.clone());
            self.outbox.push(Outgoing::View(req));
            return;
        }
        self.navigate(NavCommand::DrillDown(id));
    }

    pub fn go_back(&mut self) -> bool {
        self.navigate(NavCommand::Back)
    }

    pub fn go_up(&mut self) -> bool {
        self.navigate(NavCommand::Up)
    }

    /// Home root of the home view. Leaving a requested view drops the
    /// back-stack and restores the cached home payload.
    pub fn go_home(&mut self) -> bool {
        let cached = self.view_cache.contains_key(&cache_key(self.home_view.as_deref()));
        if self.model.view_name == self.home_view || !cached {
            return self.navigate(NavCommand::Home);
        }
        info!(from = ?self.model.view_name, to = ?self.home_view, "navigate home");
        self.set_nav(Navigation::starting_at(None, self.home_view.clone()));
        true
    }

    /// Rebuilds view and layout for the current root.
    pub fn rebuild_view(&mut self) {
        let started = Instant::now();
        self.view = match self.nav.root.as_ref() {
            Some(root) => build_view(&self.model, root, &self.cfg.view),
            None => View::default(),
        };
        match self.cfg.layout.mode {
            LayoutMode::Radial => layout_view(
                &mut self.model,
                &self.view,
                &self.spatial.canvas,
                &self.cfg.layout.radial,
            ),
            LayoutMode::Continuous => {
                seed_positions(
                    &mut self.model,
                    &self.view,
                    &self.spatial.canvas,
                    &self.cfg.layout.radial,
                );
                self.spatial.sim.reheat();
            }
        }
        // Named views are judged by their whole edge list, not the slice
        // around the root.
        let edge_load = match self.model.view_name {
            Some(_) => self.view.edges.len().max(self.model.edges.len()),
            None => self.view.edges.len(),
        };
        self.lod
            .on_view_rebuilt(edge_load, self.model.view_name.as_deref());

        if let Some(h) = &self.ui.hovered {
            if !self.view.contains(h) {
                self.ui.hovered = None;
            }
        }
        self.spatial.drag = None;
        self.ui.fit_requested = true;
        self.perf.visible_nodes = self.view.len();
        self.perf.visible_edges = self.view.edges.len();
        self.perf.rebuilds += 1;
        self.perf.last_rebuild = started.elapsed();
        debug!(
            root = ?self.nav.root,
            nodes = self.view.len(),
            edges = self.view.edges.len(),
            edge_focus = self.lod.state().edge_focus,
            micros = self.perf.last_rebuild.as_micros() as u64,
            "view rebuilt"
        );
    }

    pub fn breadcrumb(&self) -> Vec<NodeId> {
        let Some(root) = self.nav.root.clone() else {
            return Vec::new();
        };
        let mut chain = self.model.ancestors(&root);
        chain.reverse();
        chain.push(root);
        chain
    }

    // ----- Interaction -----

    pub fn tap_node(&mut self, id: NodeId, now: Duration) {
        if let Some(decision) = self.taps.tap(id, now) {
            self.apply_tap(decision, now);
        }
    }

    pub fn double_tap_node(&mut self, id: NodeId, now: Duration) {
        let decision = self.taps.double_tap(id);
        self.apply_tap(decision, now);
    }

    pub fn modified_tap_node(&mut self, id: NodeId, now: Duration) {
        let decision = self.taps.modified_tap(id);
        self.apply_tap(decision, now);
    }

    pub fn tap_background(&mut self, now: Duration) {
        let decision = self.taps.tap_empty();
        self.apply_tap(decision, now);
    }

    fn apply_tap(&mut self, decision: TapDecision, now: Duration) {
        match decision {
            TapDecision::Select(id) => self.ui.selected = Some(id),
            TapDecision::DrillDown(id) => self.drill_down(id),
            TapDecision::Open(id) => self.open(&id, now),
            TapDecision::ClearSelection => self.ui.selected = None,
        }
    }

    pub fn open(&mut self, id: &NodeId, now: Duration) {
        let Some(node) = self.model.node(id) else {
            self.notify(format!("Unknown node {id}"), now);
            return;
        };
        self.outbox.push(Outgoing::Open(OpenRequest {
            id: id.clone(),
            path: node.path.clone(),
        }));
    }

    /// Hands queued requests to `bridge`; failures become notices.
    pub fn dispatch_outbox(&mut self, bridge: &dyn GraphBridge, now: Duration) {
        for out in std::mem::take(&mut self.outbox) {
            match out {
                Outgoing::Open(req) => {
                    if let Err(e) = bridge.request_open(&req) {
                        warn!(open = req.target(), bridge = bridge.name(), "open failed: {e}");
                        self.notify(format!("Cannot open {}: {e}", req.target()), now);
                    }
                }
                Outgoing::View(req) => {
                    if let Err(e) = bridge.request_view(&req.view, req.focus.as_deref()) {
                        warn!(view = %req.view, bridge = bridge.name(), "view request failed: {e}");
                        self.pending_view = None;
                        self.notify(format!("View {} unavailable: {e}", req.view), now);
                    }
                }
            }
        }
    }

    pub fn pending_view(&self) -> Option<&ViewRequest> {
        self.pending_view.as_ref()
    }

    pub fn on_zoom(&mut self, zoom: f32, now: Duration) {
        self.ui.zoom = zoom;
        self.lod.on_zoom(zoom, now);
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        self.spatial.canvas.size = size;
    }

    // ----- Drag and pin -----

    pub fn begin_drag(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.model.node_mut(id) else {
            return false;
        };
        self.spatial.drag = Some(DragState {
            id: id.clone(),
            was_pinned: node.pinned,
        });
        node.pinned = true;
        true
    }

    pub fn drag_to(&mut self, pos: Vec2) {
        let Some(drag) = &self.spatial.drag else {
            return;
        };
        if let Some(node) = self.model.node_mut(&drag.id) {
            node.pos = Some(pos);
            node.vel = Vec2::ZERO;
        }
    }

    pub fn end_drag(&mut self) {
        let Some(drag) = self.spatial.drag.take() else {
            return;
        };
        if let Some(node) = self.model.node_mut(&drag.id) {
            node.pinned = drag.was_pinned;
        }
        if self.cfg.layout.mode == LayoutMode::Continuous {
            self.spatial.sim.reheat();
        }
    }

    pub fn toggle_pin(&mut self, id: &NodeId) -> Option<bool> {
        let node = self.model.node_mut(id)?;
        node.pinned = !node.pinned;
        Some(node.pinned)
    }

    // ----- Queries for render and ui -----

    /// Visible node under `world`, nearest first, within its radius plus
    /// `slop`.
    pub fn pick(&self, world: Vec2, slop: f32) -> Option<NodeId> {
        let mut best: Option<(f32, &NodeId)> = None;
        for id in &self.view.order {
            let Some(node) = self.model.node(id) else {
                continue;
            };
            let Some(pos) = node.pos else {
                continue;
            };
            let d = pos.distance(world);
            if d > node_radius(node.importance) + slop {
                continue;
            }
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, id));
            }
        }
        best.map(|(_, id)| id.clone())
    }

    pub fn edge_drawn(&self, eix: usize) -> bool {
        let edge = &self.model.edges[eix];
        self.lod.edge_visible(
            &edge.source,
            &edge.target,
            self.ui.hovered.as_ref(),
            self.ui.selected.as_ref(),
        )
    }

    pub fn label_drawn(&self, id: &NodeId) -> bool {
        self.lod.label_visible(
            id,
            &self.view.main_labels,
            self.ui.hovered.as_ref(),
            self.ui.selected.as_ref(),
        )
    }

    pub fn node_detail_lines(&self, id: &NodeId) -> Vec<String> {
        let Some(n) = self.model.node(id) else {
            return vec![id.0.clone()];
        };
        let mut out = vec![format!("{} ({})", n.label, id.0)];
        if let Some(path) = &n.path {
            out.push(format!("path: {path}"));
        }
        if let Some(kind) = &n.kind {
            out.push(format!("kind: {kind}"));
        }
        out.push(format!("tier: {}  importance: {:.1}", n.tier.as_str(), n.importance));
        if let Some(depth) = self.view.depth(id) {
            out.push(format!("depth: {depth}"));
        }
        if n.is_group {
            out.push("group".to_string());
        }
        if n.pinned {
            out.push("pinned".to_string());
        }
        out
    }

    pub fn node_label_with_id(&self, id: &NodeId) -> String {
        self.model
            .node(id)
            .map(|n| format!("{} ({})", n.display_label, id.0))
            .unwrap_or_else(|| id.0.clone())
    }

    // ---- Search helpers ----
    pub fn recompute_search_hits(&mut self, limit: usize) {
        self.ui.search_hits.clear();
        let q = self.ui.search_query.trim().to_lowercase();
        if q.is_empty() {
            return;
        }

        let mut hits: Vec<(String, NodeId)> = self
            .model
            .nodes
            .iter()
            .filter(|n| {
                n.id.0.to_lowercase().contains(&q)
                    || n.label.to_lowercase().contains(&q)
                    || n.path.as_deref().is_some_and(|p| p.to_lowercase().contains(&q))
            })
            .map(|n| (n.label.to_lowercase(), n.id.clone()))
            .collect();

        hits.sort();
        hits.truncate(limit.max(1));
        self.ui.search_hits = hits.into_iter().map(|(_, id)| id).collect();
    }

    /// Selects `id`, moving the view to it when it is not visible.
    pub fn jump_to(&mut self, id: NodeId) {
        if !self.view.contains(&id) {
            self.navigate(NavCommand::DrillDown(id.clone()));
        }
        if self.model.contains(&id) {
            self.ui.selected = Some(id);
        }
    }
}
