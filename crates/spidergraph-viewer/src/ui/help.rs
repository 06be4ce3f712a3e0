use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;

const SHORTCUTS: [(&str, &str); 11] = [
    ("Click", "Select node"),
    ("Double click", "Drill into node"),
    ("Ctrl+Click", "Open node"),
    ("Drag", "Move node (pinned while held)"),
    ("Right drag / wheel", "Pan / zoom"),
    ("Backspace", "Back"),
    ("U / H", "Up to parent / Home"),
    ("Enter / O / P", "Drill / open / pin selected"),
    ("Ctrl+F or /", "Search"),
    ("Esc", "Close overlays, clear selection"),
    ("F1 or ?", "Toggle help"),
];

pub fn help_overlay(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    if !st.ui.show_help {
        return;
    }

    let mut open = true;
    egui::Window::new("Help / Shortcuts")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(contexts.ctx_mut(), |ui| {
            egui::Grid::new("shortcuts").striped(true).show(ui, |ui| {
                for (keys, action) in SHORTCUTS {
                    ui.strong(keys);
                    ui.label(action);
                    ui.end_row();
                }
            });
        });
    if !open {
        st.ui.show_help = false;
    }
}
