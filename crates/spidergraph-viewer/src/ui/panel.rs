use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::{AppClock, Bridge};
use crate::graph::nav::NavCommand;
use crate::graph::state::DataOrigin;
use crate::graph::GraphState;
use crate::ui::{UiLayout, PANEL_W};

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
    mut layout: ResMut<UiLayout>,
    bridge: Res<Bridge>,
    clock: Res<AppClock>,
) {
    let ctx = contexts.ctx_mut();
    let now = clock.now();
    let resp = egui::SidePanel::left("left")
        .exact_width(PANEL_W)
        .show(ctx, |ui| {
            ui.heading("SpiderGraph");
            ui.label(format!("source: {}", bridge.0.name()));
            ui.label(format!(
                "view: {}",
                st.model.view_name.as_deref().unwrap_or("(default)")
            ));
            ui.label(format!(
                "nodes: {}  edges: {}",
                st.model.len(),
                st.model.edges.len()
            ));
            if st.origin == DataOrigin::Bootstrap {
                ui.label("Showing project skeleton until a graph arrives.");
            }
            if let Some(req) = st.pending_view() {
                ui.label(format!("Loading view {}…", req.view));
            }
            ui.separator();

            ui.horizontal(|ui| {
                let can_back = st.nav.can_go_back();
                if ui.add_enabled(can_back, egui::Button::new("Back")).clicked() {
                    st.go_back();
                }
                if ui.button("Up").clicked() {
                    st.go_up();
                }
                if ui.button("Home").clicked() {
                    st.go_home();
                }
            });

            let crumbs = st.breadcrumb();
            let mut jump = None;
            ui.horizontal_wrapped(|ui| {
                for (i, id) in crumbs.iter().enumerate() {
                    if i > 0 {
                        ui.label("›");
                    }
                    let label = st
                        .model
                        .node(id)
                        .map_or(id.as_str(), |n| n.display_label.as_str());
                    if ui.link(label).clicked() {
                        jump = Some(id.clone());
                    }
                }
            });
            if let Some(id) = jump {
                st.navigate(NavCommand::DrillDown(id));
            }

            ui.add_space(8.0);
            ui.separator();
            ui.checkbox(&mut st.ui.show_details, "Details");
            if st.ui.show_details {
                match st.ui.selected.clone() {
                    Some(id) => {
                        for line in st.node_detail_lines(&id) {
                            ui.label(line);
                        }
                        let pinned = st.model.node(&id).is_some_and(|n| n.pinned);
                        ui.horizontal(|ui| {
                            if ui.button("Drill down").clicked() {
                                st.drill_down(id.clone());
                            }
                            if ui.button("Open").clicked() {
                                st.open(&id, now);
                            }
                            if ui.button(if pinned { "Unpin" } else { "Pin" }).clicked() {
                                st.toggle_pin(&id);
                            }
                        });
                    }
                    None => {
                        ui.label("Click a node to select it.");
                    }
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Search").clicked() {
                    st.ui.search_open = true;
                }
                if ui.button("Settings").clicked() {
                    st.ui.show_settings = true;
                }
                if ui.button("Help").clicked() {
                    st.ui.show_help = true;
                }
            });
        });

    layout.panel_rect = resp.response.rect;
    layout.content_rect = ctx.available_rect();
}
