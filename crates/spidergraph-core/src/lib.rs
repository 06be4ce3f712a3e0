use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTOCOL_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Frames exchanged between a viewer and a graph host.
///
/// `Graph` payloads are deliberately untyped: hosts send whatever shape they
/// have and the viewer normalizes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Msg {
    Hello {
        version: String,
    },
    RequestGraph {
        view: Option<String>,
        focus: Option<String>,
    },
    Graph {
        view: Option<String>,
        payload: serde_json::Value,
    },
    Open {
        id: String,
        path: Option<String>,
    },
    Notice {
        text: String,
    },
    Ping,
    Pong,
}

impl Msg {
    pub fn hello() -> Self {
        Msg::Hello {
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Msg::Notice { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_uses_tagged_json() {
        let msg = Msg::RequestGraph {
            view: Some("Docs".to_string()),
            focus: None,
        };
        let encoded = serde_json::to_value(&msg).expect("encode");
        assert_eq!(encoded["type"], "RequestGraph");
        assert_eq!(encoded["data"]["view"], "Docs");

        let decoded: Msg = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn graph_payload_is_passed_through_untouched() {
        let payload = serde_json::json!({"nodes": [{"name": "a"}], "links": []});
        let msg = Msg::Graph {
            view: None,
            payload: payload.clone(),
        };
        let bytes = serde_json::to_vec(&msg).expect("encode");
        let decoded: Msg = serde_json::from_slice(&bytes).expect("decode");
        let Msg::Graph { payload: got, .. } = decoded else {
            panic!("expected graph frame");
        };
        assert_eq!(got, payload);
    }
}
