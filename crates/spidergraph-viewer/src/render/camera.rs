use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::app::resources::AppClock;
use crate::graph::GraphState;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 8.0;
const WHEEL_STEP: f32 = 0.1;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// Keeps the layout canvas the size of the window.
pub fn sync_canvas(windows: Query<&Window>, mut st: ResMut<GraphState>) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size.min_element() < 1.0 || size.distance(st.spatial.canvas.size) < 0.5 {
        return;
    }
    st.set_canvas_size(size);
}

pub fn zoom_camera(
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    clock: Res<AppClock>,
    mut st: ResMut<GraphState>,
    mut cam_q: Query<&mut OrthographicProjection, With<Camera2d>>,
) {
    let delta: f32 = wheel
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        })
        .sum();
    if delta == 0.0 || contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok(mut proj) = cam_q.get_single_mut() else {
        return;
    };
    proj.scale = (proj.scale * (1.0 - delta * WHEEL_STEP)).clamp(MIN_SCALE, MAX_SCALE);
    st.on_zoom(1.0 / proj.scale, clock.now());
}

/// Right or middle drag pans.
pub fn pan_camera(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut contexts: EguiContexts,
    mut cam_q: Query<(&mut Transform, &OrthographicProjection), With<Camera2d>>,
) {
    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if !buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) || delta == Vec2::ZERO {
        return;
    }
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok((mut tf, proj)) = cam_q.get_single_mut() else {
        return;
    };
    tf.translation.x -= delta.x * proj.scale;
    tf.translation.y += delta.y * proj.scale;
}

/// Re-centers on the root after every view rebuild.
pub fn fit_on_rebuild(
    mut st: ResMut<GraphState>,
    mut cam_q: Query<&mut Transform, With<Camera2d>>,
) {
    if !st.ui.fit_requested {
        return;
    }
    st.ui.fit_requested = false;
    let center = st
        .view
        .root
        .as_ref()
        .and_then(|root| st.model.node(root))
        .and_then(|node| node.pos)
        .unwrap_or(st.spatial.canvas.center);
    let Ok(mut tf) = cam_q.get_single_mut() else {
        return;
    };
    tf.translation.x = center.x;
    tf.translation.y = center.y;
}
