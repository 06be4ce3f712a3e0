use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use spidergraph_core::NodeId;

use crate::app::resources::AppClock;
use crate::graph::GraphState;

/// Screen pixels of slack around a node when picking.
const PICK_SLOP_PX: f32 = 6.0;
/// Pointer travel that turns a press into a drag.
const DRAG_START_PX: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Press {
    node: Option<NodeId>,
    at: Vec2,
    dragging: bool,
}

fn cursor_world(
    windows: &Query<&Window>,
    cam_q: &Query<(&Camera, &GlobalTransform, &OrthographicProjection)>,
) -> Option<(Vec2, Vec2, f32)> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, cam_tf, proj) = cam_q.get_single().ok()?;
    let world = camera.viewport_to_world_2d(cam_tf, cursor)?;
    Some((cursor, world, proj.scale))
}

pub fn hover_detection(
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform, &OrthographicProjection)>,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
) {
    if st.spatial.drag.is_some() {
        return;
    }
    let picked = if contexts.ctx_mut().wants_pointer_input() {
        None
    } else {
        cursor_world(&windows, &cam_q)
            .and_then(|(_, world, scale)| st.pick(world, PICK_SLOP_PX * scale))
    };
    if st.ui.hovered != picked {
        st.ui.hovered = picked;
    }
}

/// Left button: click selects, a second click or a double-click drills,
/// modifier-click opens, drag moves and temporarily pins the node.
pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform, &OrthographicProjection)>,
    mut contexts: EguiContexts,
    clock: Res<AppClock>,
    mut press: Local<Option<Press>>,
    mut st: ResMut<GraphState>,
) {
    let cursor = cursor_world(&windows, &cam_q);

    if buttons.just_pressed(MouseButton::Left) {
        if contexts.ctx_mut().wants_pointer_input() {
            return;
        }
        let Some((screen, world, scale)) = cursor else {
            return;
        };
        let node = st.pick(world, PICK_SLOP_PX * scale);
        let modifier = keys.any_pressed([
            KeyCode::ControlLeft,
            KeyCode::ControlRight,
            KeyCode::SuperLeft,
            KeyCode::SuperRight,
        ]);
        if modifier {
            if let Some(id) = node {
                st.modified_tap_node(id, clock.now());
            }
            return;
        }
        *press = Some(Press {
            node,
            at: screen,
            dragging: false,
        });
        return;
    }

    let Some(current) = press.as_mut() else {
        return;
    };

    if buttons.pressed(MouseButton::Left) {
        let Some((screen, world, _)) = cursor else {
            return;
        };
        if !current.dragging && screen.distance(current.at) > DRAG_START_PX {
            if let Some(id) = current.node.as_ref() {
                current.dragging = st.begin_drag(id);
            }
        }
        if current.dragging {
            st.drag_to(world);
        }
        return;
    }

    // Released.
    let Some(done) = press.take() else {
        return;
    };
    let now = clock.now();
    let double = contexts
        .ctx_mut()
        .input(|i| i.pointer.button_double_clicked(egui::PointerButton::Primary));
    match (done.node, done.dragging) {
        (Some(_), true) => st.end_drag(),
        (Some(id), false) if double => st.double_tap_node(id, now),
        (Some(id), false) => st.tap_node(id, now),
        (None, _) => st.tap_background(now),
    }
}
