use bevy::prelude::{Res, ResMut, Time, Vec2};
use serde::{Deserialize, Serialize};
use spidergraph_core::NodeId;
use std::collections::{BTreeMap, HashMap};
use std::f32::consts::TAU;
use tracing::warn;

use crate::graph::model::GraphModel;
use crate::graph::sim::{SimBody, SimParams};
use crate::graph::state::GraphState;
use crate::graph::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Rings by hop depth, relaxed once per navigation transition.
    #[default]
    Radial,
    /// Free force simulation stepped every frame.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialParams {
    /// First ring radius as a fraction of the shorter canvas side.
    pub base_radius_frac: f32,
    /// Distance between consecutive rings, same unit.
    pub ring_step_frac: f32,
    /// Spring rest length, same unit.
    pub rest_length_frac: f32,
    pub repulsion: f32,
    pub spring_k: f32,
    pub radial_k: f32,
    pub damping: f32,
    pub min_iterations: usize,
    pub max_iterations: usize,
    /// Per-iteration velocity cap.
    pub max_speed: f32,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            base_radius_frac: 0.10,
            ring_step_frac: 0.16,
            rest_length_frac: 0.12,
            repulsion: 9000.0,
            spring_k: 0.010,
            radial_k: 0.030,
            damping: 0.85,
            min_iterations: 40,
            max_iterations: 90,
            max_speed: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub radial: RadialParams,
    pub sim: SimParams,
}

/// World-space rectangle the layout fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub center: Vec2,
    pub size: Vec2,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            size: Vec2::new(1280.0, 800.0),
        }
    }
}

impl Canvas {
    pub fn min_side(&self) -> f32 {
        self.size.x.min(self.size.y).max(1.0)
    }
}

impl RadialParams {
    pub fn ring_radius(&self, canvas: &Canvas, depth: usize) -> f32 {
        if depth == 0 {
            return 0.0;
        }
        let min = canvas.min_side();
        self.base_radius_frac * min + (depth - 1) as f32 * self.ring_step_frac * min
    }

    pub fn iterations_for(&self, visible: usize) -> usize {
        let lo = self.min_iterations.min(self.max_iterations);
        (visible / 2).clamp(lo, self.max_iterations.max(lo))
    }
}

/// Ring slot positions for every visible node, ordered by label then id
/// within each depth.
pub fn ring_positions(
    model: &GraphModel,
    view: &View,
    canvas: &Canvas,
    params: &RadialParams,
) -> HashMap<NodeId, Vec2> {
    let mut rings: BTreeMap<usize, Vec<&NodeId>> = BTreeMap::new();
    for id in &view.order {
        rings.entry(view.depth(id).unwrap_or(0)).or_default().push(id);
    }

    let mut out = HashMap::with_capacity(view.len());
    for (depth, mut ids) in rings {
        ids.sort_by(|a, b| {
            let la = model.node(a).map(|n| n.label.as_str()).unwrap_or("");
            let lb = model.node(b).map(|n| n.label.as_str()).unwrap_or("");
            la.cmp(lb).then_with(|| a.cmp(b))
        });
        let radius = params.ring_radius(canvas, depth);
        let n = ids.len().max(1) as f32;
        for (i, id) in ids.into_iter().enumerate() {
            let t = i as f32 / n * TAU;
            out.insert(id.clone(), canvas.center + Vec2::new(t.cos(), t.sin()) * radius);
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    target_r: f32,
    fixed: bool,
    anchored: bool,
}

fn relax(bodies: &mut [Body], springs: &[(usize, usize)], canvas: &Canvas, params: &RadialParams, iterations: usize) {
    let rest = params.rest_length_frac * canvas.min_side();
    let n = bodies.len();
    for _ in 0..iterations {
        for body in bodies.iter_mut() {
            body.vel *= params.damping;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = bodies[i].pos - bodies[j].pos;
                let d2 = delta.length_squared() + 0.01;
                let push = delta / d2.sqrt() * (params.repulsion / d2);
                bodies[i].vel += push;
                bodies[j].vel -= push;
            }
        }

        for &(a, b) in springs {
            let delta = bodies[b].pos - bodies[a].pos;
            let d = delta.length().max(0.001);
            let pull = delta / d * ((d - rest) * params.spring_k);
            bodies[a].vel += pull;
            bodies[b].vel -= pull;
        }

        for body in bodies.iter_mut().filter(|b| b.anchored) {
            let offset = body.pos - canvas.center;
            let r = offset.length().max(0.001);
            body.vel -= offset / r * ((r - body.target_r) * params.radial_k);
        }

        for body in bodies.iter_mut().filter(|b| !b.fixed) {
            body.vel = body.vel.clamp_length_max(params.max_speed);
            body.pos += body.vel;
        }
    }
}

/// Places and relaxes the visible nodes of `view`, writing positions back
/// onto the canonical nodes. Identical inputs give identical output.
pub fn layout_view(model: &mut GraphModel, view: &View, canvas: &Canvas, params: &RadialParams) {
    let Some(root) = view.root.as_ref() else {
        return;
    };
    let slots = ring_positions(model, view, canvas, params);

    let mut local: HashMap<&NodeId, usize> = HashMap::with_capacity(view.len());
    let mut bodies = Vec::with_capacity(view.len());
    for id in &view.order {
        let Some(node) = model.node(id) else {
            continue;
        };
        let is_root = id == root;
        let depth = view.depth(id).unwrap_or(0);
        let seed = node.pos.filter(|p| p.is_finite());
        let pos = if is_root && !node.pinned {
            canvas.center
        } else {
            seed.or_else(|| slots.get(id).copied()).unwrap_or(canvas.center)
        };
        local.insert(id, bodies.len());
        bodies.push(Body {
            pos,
            vel: Vec2::ZERO,
            target_r: params.ring_radius(canvas, depth),
            fixed: node.pinned,
            anchored: !is_root && depth > 0,
        });
    }

    let springs: Vec<(usize, usize)> = view
        .edges
        .iter()
        .filter_map(|&eix| {
            let edge = &model.edges[eix];
            Some((*local.get(&edge.source)?, *local.get(&edge.target)?))
        })
        .filter(|(a, b)| a != b)
        .collect();

    let iterations = params.iterations_for(bodies.len());
    relax(&mut bodies, &springs, canvas, params, iterations);

    if let Some(&r) = local.get(root).filter(|&&r| !bodies[r].fixed) {
        let shift = canvas.center - bodies[r].pos;
        for body in bodies.iter_mut().filter(|b| !b.fixed) {
            body.pos += shift;
        }
    }

    if bodies.iter().any(|b| !b.pos.is_finite()) {
        warn!(root = %root, "relaxation diverged, using ring placement");
        for (id, &ix) in &local {
            if !bodies[ix].fixed {
                bodies[ix].pos = slots.get(*id).copied().unwrap_or(canvas.center);
            }
        }
    }

    let placed: Vec<(NodeId, Vec2)> = local
        .iter()
        .map(|(id, &ix)| ((*id).clone(), bodies[ix].pos))
        .collect();
    for (id, pos) in placed {
        if let Some(node) = model.node_mut(&id) {
            node.pos = Some(pos);
            node.vel = Vec2::ZERO;
        }
    }
}

/// Gives every unplaced visible node its ring slot. Used before the
/// continuous simulation takes over.
pub fn seed_positions(model: &mut GraphModel, view: &View, canvas: &Canvas, params: &RadialParams) {
    let slots = ring_positions(model, view, canvas, params);
    for id in &view.order {
        let Some(node) = model.node_mut(id) else {
            continue;
        };
        if node.pos.map_or(true, |p| !p.is_finite()) {
            node.pos = slots.get(id).copied();
        }
    }
}

pub fn node_radius(importance: f32) -> f32 {
    (6.0 + importance.max(0.0).sqrt() * 2.0).min(22.0)
}

pub fn step_layout(time: Res<Time>, mut st: ResMut<GraphState>) {
    let dt = time.delta_seconds();
    st.perf.fps = if dt > 0.0 { 1.0 / dt } else { 0.0 };
    if st.cfg.layout.mode == LayoutMode::Continuous {
        st.sim_step(dt);
    }
}

impl GraphState {
    /// One frame of the continuous simulation over the visible nodes.
    pub fn sim_step(&mut self, dt: f32) {
        if self.spatial.sim.is_frozen() {
            return;
        }
        let params: SimParams = self.cfg.layout.sim;
        let mut ids = Vec::with_capacity(self.view.len());
        let mut bodies = Vec::with_capacity(self.view.len());
        for id in &self.view.order {
            let Some(node) = self.model.node(id) else {
                continue;
            };
            let Some(pos) = node.pos else {
                continue;
            };
            ids.push(id.clone());
            bodies.push(SimBody {
                pos,
                vel: node.vel,
                radius: node_radius(node.importance),
                fixed: node.pinned,
            });
        }

        let local: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let links: Vec<(usize, usize)> = self
            .view
            .edges
            .iter()
            .filter_map(|&eix| {
                let edge = &self.model.edges[eix];
                Some((*local.get(&edge.source)?, *local.get(&edge.target)?))
            })
            .collect();

        let center = self.spatial.canvas.center;
        self.spatial.sim.step(&mut bodies, &links, center, &params, dt);

        for (id, body) in ids.iter().zip(bodies) {
            if let Some(node) = self.model.node_mut(id) {
                if body.pos.is_finite() {
                    node.pos = Some(body.pos);
                    node.vel = body.vel;
                } else {
                    node.vel = Vec2::ZERO;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hierarchy::derive_groups;
    use crate::graph::importance::{score_graph, ScoringConfig};
    use crate::graph::normalize::normalize_payload;
    use crate::graph::view::{build_view, ViewParams};
    use serde_json::json;

    fn prepared() -> GraphModel {
        let nodes: Vec<_> = (0..30)
            .map(|i| json!({"id": format!("n{i}"), "path": format!("src/m{}/n{i}.rs", i % 3)}))
            .collect();
        let links: Vec<_> = (1..30)
            .map(|i| json!({"source": format!("n{}", i / 2), "target": format!("n{i}")}))
            .collect();
        let mut model = normalize_payload(&json!({"nodes": nodes, "links": links}));
        derive_groups(&mut model);
        score_graph(&mut model, &ScoringConfig::default());
        model
    }

    fn positions(model: &GraphModel, view: &View) -> Vec<(NodeId, u32, u32)> {
        view.order
            .iter()
            .map(|id| {
                let p = model.node(id).and_then(|n| n.pos).expect("placed");
                (id.clone(), p.x.to_bits(), p.y.to_bits())
            })
            .collect()
    }

    #[test]
    fn relaxation_is_bit_for_bit_deterministic() {
        let canvas = Canvas::default();
        let params = RadialParams::default();
        let view_params = ViewParams::default();

        let mut first = prepared();
        let view = build_view(&first, &"n0".into(), &view_params);
        layout_view(&mut first, &view, &canvas, &params);

        let mut second = prepared();
        let view2 = build_view(&second, &"n0".into(), &view_params);
        layout_view(&mut second, &view2, &canvas, &params);

        assert_eq!(positions(&first, &view), positions(&second, &view2));
    }

    #[test]
    fn root_is_centered_and_every_visible_node_is_finite() {
        let canvas = Canvas {
            center: Vec2::new(50.0, -20.0),
            size: Vec2::new(900.0, 600.0),
        };
        let mut model = prepared();
        let view = build_view(&model, &"n1".into(), &ViewParams::default());
        layout_view(&mut model, &view, &canvas, &RadialParams::default());

        let root = model.node(&"n1".into()).and_then(|n| n.pos).expect("root placed");
        assert!((root - canvas.center).length() < 1e-3);
        for id in &view.order {
            let pos = model.node(id).and_then(|n| n.pos).expect("placed");
            assert!(pos.is_finite(), "{id} not finite");
        }
    }

    #[test]
    fn pinned_nodes_do_not_move() {
        let mut model = prepared();
        let pinned = Vec2::new(123.0, 45.0);
        if let Some(node) = model.node_mut(&"n2".into()) {
            node.pinned = true;
            node.pos = Some(pinned);
        }
        let view = build_view(&model, &"n0".into(), &ViewParams::default());
        assert!(view.contains(&"n2".into()));
        layout_view(&mut model, &view, &Canvas::default(), &RadialParams::default());
        assert_eq!(model.node(&"n2".into()).and_then(|n| n.pos), Some(pinned));
    }

    #[test]
    fn ring_radius_grows_by_depth() {
        let canvas = Canvas {
            center: Vec2::ZERO,
            size: Vec2::new(1000.0, 500.0),
        };
        let params = RadialParams::default();
        assert_eq!(params.ring_radius(&canvas, 0), 0.0);
        assert!((params.ring_radius(&canvas, 1) - 50.0).abs() < 1e-4);
        assert!((params.ring_radius(&canvas, 2) - 130.0).abs() < 1e-4);
    }

    #[test]
    fn iteration_count_is_clamped() {
        let params = RadialParams::default();
        assert_eq!(params.iterations_for(10), 40);
        assert_eq!(params.iterations_for(120), 60);
        assert_eq!(params.iterations_for(1000), 90);
    }
}
