use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::bridge::{BridgeError, GraphBridge, OpenRequest};

/// Serves one JSON file. Cannot open entities or switch views.
#[derive(Debug, Clone)]
pub struct FileBridge {
    path: PathBuf,
}

impl FileBridge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> anyhow::Result<Value> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read graph file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("graph file {} is not valid JSON", self.path.display()))
    }
}

impl GraphBridge for FileBridge {
    fn name(&self) -> &str {
        "file"
    }

    fn provide_graph(&self) -> Option<Value> {
        match self.read() {
            Ok(value) => {
                info!(path = %self.path.display(), "loaded graph file");
                Some(value)
            }
            Err(e) => {
                warn!("{e:#}");
                None
            }
        }
    }

    fn request_open(&self, _req: &OpenRequest) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("opening entities"))
    }

    fn request_view(&self, _view: &str, _focus: Option<&str>) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("switching views"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_json_and_tolerates_bad_files() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("graph.json");
        fs::write(&good, r#"{"nodes": [{"id": "a"}]}"#).expect("write graph");
        let payload = FileBridge::new(&good).provide_graph().expect("payload");
        assert_eq!(payload["nodes"][0]["id"], "a");

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{nodes").expect("write graph");
        assert!(FileBridge::new(&bad).provide_graph().is_none());
        assert!(FileBridge::new(dir.path().join("missing.json"))
            .provide_graph()
            .is_none());
    }

    #[test]
    fn open_and_view_requests_are_unsupported() {
        let bridge = FileBridge::new("/nonexistent.json");
        let req = OpenRequest {
            id: "a".into(),
            path: None,
        };
        assert!(matches!(bridge.request_open(&req), Err(BridgeError::Unsupported(_))));
        assert!(matches!(
            bridge.request_view("Docs", None),
            Err(BridgeError::Unsupported(_))
        ));
    }
}
