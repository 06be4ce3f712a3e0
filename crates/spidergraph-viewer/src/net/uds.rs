use crate::net::Incoming;
use anyhow::{Context, Result};
use bytes::Bytes;
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use spidergraph_core::Msg;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, warn};

/// Write side of a running connection. Dropping it closes the socket.
#[derive(Debug, Clone)]
pub struct ReaderHandle {
    outgoing: mpsc::UnboundedSender<Msg>,
}

impl ReaderHandle {
    /// Queues `msg` for the socket. Fails once the connection is gone.
    pub fn send(&self, msg: Msg) -> Result<()> {
        self.outgoing
            .send(msg)
            .map_err(|_| anyhow::anyhow!("connection closed"))
    }

    pub fn is_closed(&self) -> bool {
        self.outgoing.is_closed()
    }
}

pub fn spawn_reader(sock_path: String, tx: Sender<Incoming>) -> ReaderHandle {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                let _ = tx.send(Incoming::error(sock_path.clone(), format!("tokio runtime: {e}")));
                return;
            }
        };
        rt.block_on(async move {
            if let Err(e) = run(sock_path.clone(), tx.clone(), out_rx).await {
                warn!(socket = %sock_path, "graph host connection failed: {e:#}");
                let _ = tx.send(Incoming::error(sock_path.clone(), format!("{e:#}")));
                let _ = tx.send(Incoming::disconnected(sock_path.clone()));
            }
        });
    });
    ReaderHandle { outgoing: out_tx }
}

async fn run(
    sock_path: String,
    tx: Sender<Incoming>,
    mut out_rx: mpsc::UnboundedReceiver<Msg>,
) -> Result<()> {
    let stream = UnixStream::connect(&sock_path)
        .await
        .with_context(|| format!("connect UDS {sock_path}"))?;

    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
    let _ = tx.send(Incoming::connected(sock_path.clone()));

    framed.send(Bytes::from(serde_json::to_vec(&Msg::hello())?)).await?;

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else { break };
                let bytes = frame?;
                match serde_json::from_slice::<Msg>(&bytes) {
                    Ok(Msg::Ping) => {
                        framed.send(Bytes::from(serde_json::to_vec(&Msg::Pong)?)).await?;
                    }
                    Ok(m) => {
                        let _ = tx.send(Incoming::from_msg(sock_path.clone(), m));
                    }
                    Err(e) => {
                        let _ = tx.send(Incoming::error(
                            sock_path.clone(),
                            format!("decode error: {e}"),
                        ));
                    }
                }
            }
            out = out_rx.recv() => {
                let Some(msg) = out else { break };
                debug!(?msg, "sending to graph host");
                framed.send(Bytes::from(serde_json::to_vec(&msg)?)).await?;
            }
        }
    }

    let _ = tx.send(Incoming::disconnected(sock_path.clone()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::IncomingKind;
    use tempfile::tempdir;
    use tokio::net::UnixListener;

    async fn next_msg(framed: &mut Framed<UnixStream, LengthDelimitedCodec>) -> Msg {
        let frame = framed
            .next()
            .await
            .expect("frame")
            .expect("frame readable");
        serde_json::from_slice(&frame).expect("valid msg")
    }

    #[tokio::test]
    async fn greets_answers_pings_and_forwards_requests() {
        let dir = tempdir().expect("tempdir");
        let sock = dir.path().join("host.sock").to_string_lossy().into_owned();
        let listener = UnixListener::bind(&sock).expect("bind");
        let (tx, rx) = crossbeam_channel::unbounded();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let client = tokio::spawn(run(sock.clone(), tx, out_rx));

        let (stream, _) = listener.accept().await.expect("accept");
        let mut host = Framed::new(stream, LengthDelimitedCodec::new());
        assert!(matches!(next_msg(&mut host).await, Msg::Hello { .. }));

        host.send(Bytes::from(serde_json::to_vec(&Msg::Ping).expect("encode")))
            .await
            .expect("send");
        assert_eq!(next_msg(&mut host).await, Msg::Pong);

        out_tx.send(Msg::Ping).expect("queued");
        assert_eq!(next_msg(&mut host).await, Msg::Ping);

        drop(host);
        client.await.expect("join").expect("clean shutdown");
        let kinds: Vec<_> = rx.try_iter().map(|inc| inc.kind).collect();
        assert!(matches!(kinds.first(), Some(IncomingKind::Connected)));
        assert!(matches!(kinds.last(), Some(IncomingKind::Disconnected)));
    }
}
