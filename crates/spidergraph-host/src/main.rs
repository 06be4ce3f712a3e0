mod config;
mod server;
mod views;
mod watch;

use anyhow::Result;
use spidergraph_core::Msg;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::parse_args;
use crate::server::Shared;
use crate::views::GraphStore;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = parse_args()?;
    tracing::info!(
        graph = ?config.graph,
        views = ?config.views_dir,
        open_cmd = ?config.open_cmd,
        "host configured"
    );

    let store = Arc::new(GraphStore::new(config.graph, config.views_dir));

    // Broadcast so every connected viewer gets file updates.
    let (bus, _bus_rx) = broadcast::channel::<Msg>(64);
    let _watcher = watch::spawn(Arc::clone(&store), bus.clone())?;

    let listener = server::bind(&config.socket)?;
    server::serve(
        listener,
        Shared {
            store,
            open_cmd: config.open_cmd,
            bus,
        },
    )
    .await
}
