//! Capabilities the viewer can ask of whatever is hosting it.
//!
//! A bridge may deliver a graph synchronously, forward open requests and
//! view changes, or do none of these. The engine never asks which kind it
//! is talking to; it calls the trait and reports failures as notices.

use serde_json::Value;
use spidergraph_core::NodeId;
use thiserror::Error;

pub mod file;
pub mod socket;

pub use file::FileBridge;
pub use socket::SocketBridge;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no graph host is available")]
    Unavailable,
    #[error("{0} is not supported by this data source")]
    Unsupported(&'static str),
    #[error("failed to reach graph host: {0}")]
    Send(String),
}

/// "Open this entity" request handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub id: NodeId,
    pub path: Option<String>,
}

impl OpenRequest {
    /// Path when the node has one, id otherwise.
    pub fn target(&self) -> &str {
        self.path.as_deref().unwrap_or(self.id.as_str())
    }
}

pub trait GraphBridge: Send + Sync {
    fn name(&self) -> &str;

    /// Graph available right now, if any.
    fn provide_graph(&self) -> Option<Value>;

    fn request_open(&self, req: &OpenRequest) -> Result<(), BridgeError>;

    /// Asks for another view. The reply arrives later as an incoming graph.
    fn request_view(&self, view: &str, focus: Option<&str>) -> Result<(), BridgeError>;

    fn supports_views(&self) -> bool {
        false
    }
}

/// Nothing attached.
#[derive(Debug, Default)]
pub struct NullBridge;

impl GraphBridge for NullBridge {
    fn name(&self) -> &str {
        "none"
    }

    fn provide_graph(&self) -> Option<Value> {
        None
    }

    fn request_open(&self, _req: &OpenRequest) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable)
    }

    fn request_view(&self, _view: &str, _focus: Option<&str>) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_bridge_refuses_everything() {
        let bridge = NullBridge;
        assert!(bridge.provide_graph().is_none());
        assert!(!bridge.supports_views());
        let req = OpenRequest {
            id: "a".into(),
            path: None,
        };
        assert!(matches!(bridge.request_open(&req), Err(BridgeError::Unavailable)));
        assert!(matches!(
            bridge.request_view("Docs", None),
            Err(BridgeError::Unavailable)
        ));
    }

    #[test]
    fn open_target_prefers_path() {
        let with_path = OpenRequest {
            id: "a".into(),
            path: Some("docs/a.md".into()),
        };
        assert_eq!(with_path.target(), "docs/a.md");
        let bare = OpenRequest {
            id: "a".into(),
            path: None,
        };
        assert_eq!(bare.target(), "a");
    }
}
