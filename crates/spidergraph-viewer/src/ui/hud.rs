use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;
use crate::ui::{UiLayout, HUD_EDGE_PADDING, HUD_PANEL_GAP};

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<GraphState>, layout: Res<UiLayout>) {
    let ctx = contexts.ctx_mut();
    let content = layout.content_or(ctx.screen_rect());
    let x = content.min.x + HUD_PANEL_GAP;
    let y = content.min.y + HUD_EDGE_PADDING;

    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", st.perf.fps));
                ui.label(format!(
                    "Visible: {} nodes / {} edges ({} drawn)",
                    st.perf.visible_nodes, st.perf.visible_edges, st.perf.drawn_edges
                ));
                ui.label(format!(
                    "Rebuild: {:.1} ms (#{})",
                    st.perf.last_rebuild.as_secs_f64() * 1000.0,
                    st.perf.rebuilds
                ));
                let lod = st.lod.state();
                ui.label(format!("Zoom: {:.2} (LOD at {:.2})", st.ui.zoom, st.lod.zoom()));
                if lod.edge_focus {
                    ui.label("Edge focus: hover or select to see edges");
                }
                if lod.edges_hidden {
                    ui.label("Edges hidden at this zoom");
                }
                if lod.labels_hidden {
                    ui.label("Minor labels hidden at this zoom");
                }
                if let Some(root) = st.nav.root.as_ref() {
                    ui.label(format!("Root: {}", st.node_label_with_id(root)));
                }
            });
        });
}
