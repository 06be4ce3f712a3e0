use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use spidergraph_core::NodeId;

use crate::graph::GraphState;

// Ctrl+F search overlay
pub fn search_overlay(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let ctx = contexts.ctx_mut();

    if !st.ui.search_open {
        return;
    }

    let limit = st.cfg.search_limit;
    let mut open = true;
    egui::Window::new("Search / Jump (Ctrl+F)")
        .collapsible(false)
        .resizable(true)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Query:");
                let resp = ui.text_edit_singleline(&mut st.ui.search_query);
                resp.request_focus();
                if resp.changed() {
                    st.recompute_search_hits(limit);
                }
            });

            ui.separator();
            ui.label(format!("Hits: {}", st.ui.search_hits.len()));
            ui.add_space(4.0);

            let mut picked: Option<NodeId> = None;
            egui::ScrollArea::vertical()
                .max_height(260.0)
                .show(ui, |ui| {
                    for id in st.ui.search_hits.iter() {
                        let label = match st.model.node(id) {
                            Some(node) => match &node.path {
                                Some(path) => format!("{} ({path})", node.label),
                                None => format!("{} ({})", node.label, id.0),
                            },
                            None => id.0.clone(),
                        };
                        if ui.selectable_label(false, label).clicked() {
                            picked = Some(id.clone());
                        }
                    }
                });

            if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
                if let Some(first) = st.ui.search_hits.first() {
                    picked = Some(first.clone());
                }
            }

            if let Some(id) = picked {
                st.jump_to(id);
                st.ui.search_open = false;
            }
        });
    if !open {
        st.ui.search_open = false;
    }
}
