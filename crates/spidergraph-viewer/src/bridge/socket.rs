use crossbeam_channel::Sender;
use serde_json::Value;
use spidergraph_core::Msg;

use crate::bridge::{BridgeError, GraphBridge, OpenRequest};
use crate::net::{spawn_reader, Incoming, ReaderHandle};

/// Talks to a graph host over a Unix socket. Graphs arrive asynchronously
/// through the incoming channel, never through `provide_graph`.
#[derive(Debug)]
pub struct SocketBridge {
    handle: ReaderHandle,
}

impl SocketBridge {
    pub fn connect(path: String, tx: Sender<Incoming>) -> Self {
        Self {
            handle: spawn_reader(path, tx),
        }
    }

    fn send(&self, msg: Msg) -> Result<(), BridgeError> {
        if self.handle.is_closed() {
            return Err(BridgeError::Unavailable);
        }
        self.handle
            .send(msg)
            .map_err(|e| BridgeError::Send(e.to_string()))
    }
}

impl GraphBridge for SocketBridge {
    fn name(&self) -> &str {
        "socket"
    }

    fn provide_graph(&self) -> Option<Value> {
        None
    }

    fn request_open(&self, req: &OpenRequest) -> Result<(), BridgeError> {
        self.send(Msg::Open {
            id: req.id.0.clone(),
            path: req.path.clone(),
        })
    }

    fn request_view(&self, view: &str, focus: Option<&str>) -> Result<(), BridgeError> {
        self.send(Msg::RequestGraph {
            view: Some(view.to_string()),
            focus: focus.map(str::to_string),
        })
    }

    fn supports_views(&self) -> bool {
        !self.handle.is_closed()
    }
}
