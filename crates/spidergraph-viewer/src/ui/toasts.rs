use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;
use crate::ui::HUD_EDGE_PADDING;

/// Stacks live notices in the bottom-right corner.
pub fn toast_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    if st.toasts.is_empty() {
        return;
    }
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    let anchor = egui::pos2(
        screen.max.x - HUD_EDGE_PADDING,
        screen.max.y - HUD_EDGE_PADDING,
    );

    egui::Area::new("toasts".into())
        .order(egui::Order::Foreground)
        .pivot(egui::Align2::RIGHT_BOTTOM)
        .fixed_pos(anchor)
        .interactable(false)
        .show(ctx, |ui| {
            for toast in st.toasts.iter() {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(&toast.text);
                });
            }
        });
}
