use bevy::prelude::*;
use tracing::info;

use crate::app::resources::{ActiveConfig, AppClock, Bridge, NetRx};
use crate::bridge::{FileBridge, GraphBridge, NullBridge, SocketBridge};
use crate::graph::GraphState;
use crate::util::args::LaunchArgs;
use crate::util::config;

pub mod resources;

pub struct SpiderGraphViewerPlugin {
    args: LaunchArgs,
}

impl SpiderGraphViewerPlugin {
    pub fn new(args: LaunchArgs) -> Self {
        Self { args }
    }
}

impl Plugin for SpiderGraphViewerPlugin {
    fn build(&self, app: &mut App) {
        let mut cfg = config::load_or_default();
        self.args.apply_to(&mut cfg);

        let clock = AppClock::default();
        let mut st = GraphState::new(&cfg);
        st.initial_focus = self.args.initial_focus();

        let (tx, rx) = crossbeam_channel::unbounded();
        let bridge: Box<dyn GraphBridge> = if cfg.source.auto_connect {
            Box::new(SocketBridge::connect(cfg.source.socket_path.clone(), tx))
        } else if let Some(path) = cfg.source.graph_file.clone() {
            Box::new(FileBridge::new(path))
        } else {
            Box::new(NullBridge)
        };
        info!(bridge = bridge.name(), "data source selected");

        if let Some(payload) = bridge.provide_graph() {
            st.load_payload(&payload, clock.now());
        }
        st.remote_views = bridge.supports_views();

        app.insert_resource(st)
            .insert_resource(clock)
            .insert_resource(NetRx(rx))
            .insert_resource(Bridge(bridge))
            .insert_resource(ActiveConfig(cfg))
            .init_resource::<crate::ui::UiLayout>()
            .add_systems(Startup, crate::render::setup_camera)
            .add_systems(
                Update,
                (
                    pump_network,
                    tick_state,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::settings_window,
                    crate::ui::search_overlay,
                    crate::ui::help_overlay,
                    crate::ui::hud_overlay,
                    crate::ui::toast_overlay,
                    crate::render::sync_canvas,
                    crate::render::zoom_camera,
                    crate::render::pan_camera,
                    crate::render::fit_on_rebuild,
                    crate::render::hover_detection,
                    crate::render::pointer_input,
                    dispatch_requests,
                    crate::graph::step_layout,
                    crate::render::draw_graph,
                )
                    .chain(),
            );
    }
}

fn pump_network(mut st: ResMut<GraphState>, rx: Res<NetRx>, clock: Res<AppClock>) {
    for msg in rx.0.try_iter().take(64) {
        st.apply(msg, clock.now());
    }
}

fn tick_state(mut st: ResMut<GraphState>, clock: Res<AppClock>) {
    st.tick(clock.now());
}

fn dispatch_requests(mut st: ResMut<GraphState>, bridge: Res<Bridge>, clock: Res<AppClock>) {
    let supports = bridge.0.supports_views();
    if st.remote_views != supports {
        st.remote_views = supports;
    }
    if !st.outbox.is_empty() {
        st.dispatch_outbox(bridge.0.as_ref(), clock.now());
    }
}
