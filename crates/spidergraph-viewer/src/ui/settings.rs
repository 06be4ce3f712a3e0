use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use tracing::warn;

use crate::app::resources::{ActiveConfig, AppClock};
use crate::graph::layout::LayoutMode;
use crate::graph::GraphState;
use crate::ui::UiLayout;
use crate::util::config::{self, ViewerConfig};

pub fn settings_window(
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
    layout: Res<UiLayout>,
    mut active: ResMut<ActiveConfig>,
    clock: Res<AppClock>,
) {
    if !st.ui.show_settings {
        return;
    }
    let ctx = contexts.ctx_mut();
    let content_rect = layout.content_or(ctx.screen_rect());
    let default_size = egui::vec2(
        content_rect.width().clamp(320.0, 460.0),
        content_rect.height().clamp(260.0, 520.0),
    );

    let mut open = st.ui.show_settings;
    let mut rebuild = false;
    let mut save = false;
    let mut reset = false;
    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(true)
        .default_size(default_size)
        .default_pos(content_rect.center() - default_size / 2.0)
        .constrain_to(content_rect)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.heading("View");
            rebuild |= ui
                .add(egui::Slider::new(&mut st.cfg.view.max_depth, 1..=6).text("max depth"))
                .changed();
            rebuild |= ui
                .add(egui::Slider::new(&mut st.cfg.view.max_nodes, 20..=2000).text("max nodes"))
                .changed();
            rebuild |= ui
                .add(egui::Slider::new(&mut st.cfg.view.main_labels, 0..=200).text("main labels"))
                .changed();
            ui.checkbox(&mut st.cfg.show_web, "Spider web rings");
            if ui.button("Use current root as home").clicked() {
                st.cfg.home_root = st.nav.root.clone();
            }

            ui.add_space(6.0);
            ui.separator();
            ui.heading("Layout");
            ui.horizontal(|ui| {
                rebuild |= ui
                    .selectable_value(&mut st.cfg.layout.mode, LayoutMode::Radial, "Radial")
                    .changed();
                rebuild |= ui
                    .selectable_value(&mut st.cfg.layout.mode, LayoutMode::Continuous, "Continuous")
                    .changed();
            });
            match st.cfg.layout.mode {
                LayoutMode::Radial => {
                    rebuild |= ui
                        .add(
                            egui::Slider::new(&mut st.cfg.layout.radial.ring_step_frac, 0.05..=0.4)
                                .text("ring spacing"),
                        )
                        .changed();
                    rebuild |= ui
                        .add(
                            egui::Slider::new(&mut st.cfg.layout.radial.repulsion, 0.0..=30000.0)
                                .text("repulsion"),
                        )
                        .changed();
                }
                LayoutMode::Continuous => {
                    ui.add(egui::Slider::new(&mut st.cfg.layout.sim.charge, 0.0..=2000.0).text("charge"));
                    ui.add(
                        egui::Slider::new(&mut st.cfg.layout.sim.link_distance, 20.0..=400.0)
                            .text("link distance"),
                    );
                    if ui.button("Reheat").clicked() {
                        st.spatial.sim.reheat();
                    }
                }
            }

            ui.add_space(6.0);
            ui.separator();
            ui.heading("Level of detail");
            let mut lod = st.lod.config().clone();
            let mut lod_changed = ui
                .add(
                    egui::Slider::new(&mut lod.edge_focus_threshold, 50..=5000)
                        .text("edge focus above"),
                )
                .changed();
            lod_changed |= ui
                .add(egui::Slider::new(&mut lod.label_hide_zoom, 0.05..=1.0).text("hide labels below zoom"))
                .changed();
            if lod_changed {
                st.lod.set_config(lod);
                rebuild = true;
            }

            ui.add_space(6.0);
            ui.separator();
            ui.heading("Taps");
            let mut tap = st.taps.config();
            let mut window_ms = tap.window_ms as u32;
            let mut tap_changed = ui
                .add(egui::Slider::new(&mut window_ms, 150..=600).text("double tap ms"))
                .changed();
            tap_changed |= ui.checkbox(&mut tap.defer_single, "Wait before selecting").changed();
            if tap_changed {
                tap.window_ms = u64::from(window_ms);
                st.taps.set_config(tap);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset to defaults").clicked() {
                    reset = true;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                });
            });
        });

    st.ui.show_settings = open;
    let now = clock.now();
    if reset {
        let defaults = ViewerConfig {
            source: active.0.source.clone(),
            ..ViewerConfig::default()
        };
        st.apply_viewer_config(&defaults);
        rebuild = true;
    }
    if rebuild {
        st.rebuild_view();
    }
    if save {
        let cfg = st.viewer_config(&active.0);
        match config::save(&cfg) {
            Ok(()) => {
                active.0 = cfg;
                st.notify("Settings saved", now);
            }
            Err(err) => {
                warn!("failed to save settings: {err:#}");
                st.notify(format!("Could not save settings: {err}"), now);
            }
        }
    }
}
