use anyhow::{Context, Result};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use spidergraph_core::Msg;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::views::GraphStore;

/// Per-connection context shared by every client task.
#[derive(Debug, Clone)]
pub struct Shared {
    pub store: Arc<GraphStore>,
    pub open_cmd: Option<String>,
    pub bus: broadcast::Sender<Msg>,
}

pub fn bind(sock_path: &str) -> Result<UnixListener> {
    // Clean stale socket
    let _ = std::fs::remove_file(sock_path);
    let listener =
        UnixListener::bind(sock_path).with_context(|| format!("failed to bind {sock_path}"))?;
    tracing::info!(socket = sock_path, "spidergraph-host listening");
    Ok(listener)
}

pub async fn serve(listener: UnixListener, shared: Shared) -> Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        let shared = shared.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_client(stream, shared).await {
                tracing::warn!("viewer connection ended: {err:#}");
            }
        });
    }
}

async fn send(framed: &mut Framed<UnixStream, LengthDelimitedCodec>, msg: &Msg) -> Result<()> {
    framed.send(Bytes::from(serde_json::to_vec(msg)?)).await?;
    Ok(())
}

async fn serve_client(stream: UnixStream, shared: Shared) -> Result<()> {
    tracing::info!("viewer connected");
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
    let mut bus_rx = shared.bus.subscribe();

    send(&mut framed, &Msg::hello()).await?;
    match shared.store.default_graph() {
        Ok(payload) => send(&mut framed, &Msg::Graph { view: None, payload }).await?,
        Err(err) => {
            tracing::warn!("default graph unavailable: {err:#}");
            send(&mut framed, &Msg::notice(format!("Host has no graph: {err}"))).await?;
        }
    }

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else {
                    tracing::info!("viewer disconnected");
                    return Ok(());
                };
                let msg: Msg = match serde_json::from_slice(&frame?) {
                    Ok(msg) => msg,
                    Err(err) => {
                        tracing::warn!("ignoring malformed frame: {err}");
                        continue;
                    }
                };
                for reply in handle(msg, &shared) {
                    send(&mut framed, &reply).await?;
                }
            }
            pushed = bus_rx.recv() => match pushed {
                Ok(msg) => send(&mut framed, &msg).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "viewer lagging behind graph updates");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
        }
    }
}

/// Replies owed for one viewer frame.
fn handle(msg: Msg, shared: &Shared) -> Vec<Msg> {
    match msg {
        Msg::Hello { version } => {
            tracing::debug!(%version, "viewer hello");
            Vec::new()
        }
        Msg::RequestGraph { view, focus } => {
            tracing::info!(?view, ?focus, "graph requested");
            let loaded = match view.as_deref() {
                Some(name) => shared.store.load_view(name),
                None => shared.store.default_graph(),
            };
            match loaded {
                Ok(payload) => vec![Msg::Graph { view, payload }],
                Err(err) => {
                    tracing::warn!(?view, "view unavailable: {err:#}");
                    // The empty graph tells the viewer the request failed.
                    vec![
                        Msg::notice(format!("View unavailable: {err}")),
                        Msg::Graph {
                            view,
                            payload: Value::Null,
                        },
                    ]
                }
            }
        }
        Msg::Open { id, path } => {
            let target = path.unwrap_or(id);
            match open_target(shared.open_cmd.as_deref(), &target) {
                Ok(()) => Vec::new(),
                Err(err) => {
                    tracing::warn!(%target, "open failed: {err:#}");
                    vec![Msg::notice(format!("Cannot open {target}: {err}"))]
                }
            }
        }
        Msg::Ping => vec![Msg::Pong],
        other => {
            tracing::debug!(?other, "ignoring frame");
            Vec::new()
        }
    }
}

fn open_target(open_cmd: Option<&str>, target: &str) -> Result<()> {
    let Some(cmd) = open_cmd else {
        tracing::info!(%target, "open requested (no --open-cmd configured)");
        return Ok(());
    };
    let mut child = Command::new(cmd)
        .arg(target)
        .spawn()
        .with_context(|| format!("failed to run {cmd}"))?;
    tracing::info!(%target, cmd, "opened");
    tokio::spawn(async move {
        let _ = child.wait().await;
    });
    Ok(())
}
