use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::AppClock;
use crate::graph::GraphState;

pub fn handle_shortcuts(
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
    clock: Res<AppClock>,
) {
    let ctx = contexts.ctx_mut();
    let esc_pressed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
    let wants_keyboard = ctx.wants_keyboard_input();

    if esc_pressed {
        if st.ui.search_open || st.ui.show_help || st.ui.show_settings {
            st.ui.search_open = false;
            st.ui.show_help = false;
            st.ui.show_settings = false;
        } else if st.ui.selected.is_some() {
            st.tap_background(clock.now());
        }
    }

    if wants_keyboard {
        return;
    }

    let pressed = |key: egui::Key| ctx.input(|i| i.key_pressed(key));
    let ctrl = ctx.input(|i| i.modifiers.command);

    if (ctrl && pressed(egui::Key::F)) || pressed(egui::Key::Slash) {
        st.ui.search_open = true;
    }
    if pressed(egui::Key::F1) || pressed(egui::Key::Questionmark) {
        st.ui.show_help = !st.ui.show_help;
    }
    if pressed(egui::Key::Backspace) {
        st.go_back();
    }
    if pressed(egui::Key::U) {
        st.go_up();
    }
    if pressed(egui::Key::H) {
        st.go_home();
    }

    let Some(selected) = st.ui.selected.clone() else {
        return;
    };
    if pressed(egui::Key::Enter) {
        st.drill_down(selected.clone());
    }
    if pressed(egui::Key::O) {
        st.open(&selected, clock.now());
    }
    if pressed(egui::Key::P) {
        st.toggle_pin(&selected);
    }
}
