use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use spidergraph_core::Msg;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::views::GraphStore;

/// Quiet period before a changed graph file is re-read.
const SETTLE: Duration = Duration::from_millis(250);

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}

fn touches(event: &notify::Event, file: &Path) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|name| Some(name) == file.file_name()))
}

/// Watches the default graph file and pushes it to every viewer after it
/// changes. The returned watcher must be kept alive.
pub fn spawn(
    store: Arc<GraphStore>,
    bus: broadcast::Sender<Msg>,
) -> Result<Option<RecommendedWatcher>> {
    let Some(file) = store.graph_path().map(Path::to_path_buf) else {
        return Ok(None);
    };
    // Editors often replace the file, so watch its directory.
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // notify callback thread -> tokio channel
    let (raw_tx, mut raw_rx) = mpsc::channel::<()>(64);
    let watched = file.clone();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: std::result::Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                if is_change(&event.kind) && touches(&event, &watched) {
                    let _ = raw_tx.try_send(());
                }
            }
        },
        notify::Config::default(),
    )?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    tracing::info!(file = %file.display(), "watching graph file");

    tokio::spawn(async move {
        while raw_rx.recv().await.is_some() {
            // Coalesce bursts of writes.
            tokio::time::sleep(SETTLE).await;
            while raw_rx.try_recv().is_ok() {}

            match store.default_graph() {
                Ok(payload) => {
                    tracing::info!(file = %file.display(), "graph file changed");
                    // No receivers just means no viewer is connected.
                    let _ = bus.send(Msg::Graph {
                        view: None,
                        payload,
                    });
                }
                Err(err) => tracing::warn!("changed graph file not reloaded: {err:#}"),
            }
        }
    });

    Ok(Some(watcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_changes_to_the_graph_file_count() {
        let file = Path::new("/data/graph.json");
        let modified = event(EventKind::Modify(ModifyKind::Any), "/data/graph.json");
        assert!(is_change(&modified.kind) && touches(&modified, file));

        let sibling = event(EventKind::Create(CreateKind::File), "/data/other.json");
        assert!(!touches(&sibling, file));

        let removed = event(EventKind::Remove(RemoveKind::File), "/data/graph.json");
        assert!(!is_change(&removed.kind));
    }

    #[test]
    fn no_graph_means_no_watcher() {
        let (bus, _) = broadcast::channel(1);
        let watcher = spawn(Arc::new(GraphStore::default()), bus).expect("spawn");
        assert!(watcher.is_none());
    }
}
