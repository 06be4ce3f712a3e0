use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::graph::layout::node_radius;
use crate::graph::model::{EdgeKind, Node, Tier};
use crate::graph::GraphState;
use crate::ui::tooltips::render_tooltip;

const WEB_COLOR: Color = Color::srgba(0.45, 0.5, 0.65, 0.18);

fn tier_color(node: &Node) -> Color {
    let alpha = node.tier.opacity();
    if node.is_group {
        return Color::srgba(0.55, 0.75, 0.6, alpha);
    }
    let (r, g, b) = match node.tier {
        Tier::P0 => (1.0, 0.8, 0.25),
        Tier::P1 => (0.95, 0.55, 0.3),
        Tier::P2 => (0.5, 0.7, 1.0),
        Tier::P3 => (0.7, 0.7, 0.78),
        Tier::Category => (0.8, 0.55, 0.95),
        Tier::Other => (0.55, 0.55, 0.6),
    };
    Color::srgba(r, g, b, alpha)
}

fn edge_color(kind: &EdgeKind) -> Color {
    match kind {
        EdgeKind::Membership => Color::srgba(0.55, 0.75, 0.6, 0.35),
        EdgeKind::Aggregate => Color::srgba(0.8, 0.55, 0.95, 0.7),
        EdgeKind::DocsLink | EdgeKind::Link => Color::srgba(0.5, 0.7, 1.0, 0.5),
        EdgeKind::Generic | EdgeKind::Other(_) => Color::srgba(0.85, 0.85, 0.95, 0.45),
    }
}

pub fn draw_graph(
    mut gizmos: Gizmos,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
) {
    let root_pos = st
        .view
        .root
        .as_ref()
        .and_then(|root| st.model.node(root))
        .and_then(|node| node.pos);

    // Spider web: one ring per visible depth around the root.
    if st.cfg.show_web {
        if let Some(center) = root_pos {
            let deepest = st.view.depth_of.values().copied().max().unwrap_or(0);
            for depth in 1..=deepest {
                let r = st.cfg.layout.radial.ring_radius(&st.spatial.canvas, depth);
                gizmos.circle_2d(center, r, WEB_COLOR);
            }
        }
    }

    let mut drawn = 0;
    for &eix in &st.view.edges {
        if !st.edge_drawn(eix) {
            continue;
        }
        let edge = &st.model.edges[eix];
        let (Some(a), Some(b)) = (
            st.model.node(&edge.source).and_then(|n| n.pos),
            st.model.node(&edge.target).and_then(|n| n.pos),
        ) else {
            continue;
        };
        gizmos.line_2d(a, b, edge_color(&edge.kind));
        drawn += 1;
    }

    for id in &st.view.order {
        let Some(node) = st.model.node(id) else {
            continue;
        };
        let Some(pos) = node.pos else {
            continue;
        };
        let r = node_radius(node.importance);
        gizmos.circle_2d(pos, r, tier_color(node));
        if st.ui.selected.as_ref() == Some(id) {
            gizmos.circle_2d(pos, r + 4.0, Color::WHITE);
        } else if st.ui.hovered.as_ref() == Some(id) {
            gizmos.circle_2d(pos, r + 3.0, Color::srgba(1.0, 1.0, 1.0, 0.6));
        }
        if node.pinned {
            gizmos.circle_2d(pos, 2.0, Color::WHITE);
        }
    }

    if st.perf.drawn_edges != drawn {
        st.perf.drawn_edges = drawn;
    }

    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let painter = ctx.layer_painter(egui::LayerId::background());
    for id in &st.view.order {
        if !st.label_drawn(id) {
            continue;
        }
        let Some(node) = st.model.node(id) else {
            continue;
        };
        let Some(pos) = node.pos else {
            continue;
        };
        let below = pos - Vec2::new(0.0, node_radius(node.importance) + 2.0);
        let Some(screen) = camera.world_to_viewport(cam_tf, below.extend(0.0)) else {
            continue;
        };
        let strong = st.view.is_root(id) || st.ui.selected.as_ref() == Some(id);
        painter.text(
            egui::pos2(screen.x, screen.y),
            egui::Align2::CENTER_TOP,
            &node.display_label,
            egui::FontId::proportional(if strong { 14.0 } else { 12.0 }),
            if strong {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_gray(200)
            },
        );
    }

    if let Some(hid) = st.ui.hovered.as_ref() {
        let pos = ctx
            .input(|i| i.pointer.hover_pos().unwrap_or(egui::pos2(0.0, 0.0)))
            + egui::vec2(14.0, 14.0);
        render_tooltip(ctx, "tooltip_node", pos, st.node_detail_lines(hid));
    }
}
