mod app;
mod bridge;
mod graph;
mod interact;
mod net;
mod render;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::app::SpiderGraphViewerPlugin;

fn main() -> anyhow::Result<()> {
    let args = util::args::parse_args()?;

    let exit = App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "SpiderGraph".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins(SpiderGraphViewerPlugin::new(args))
        .run();
    if let AppExit::Error(code) = exit {
        anyhow::bail!("viewer exited with code {code}");
    }
    Ok(())
}
