use serde_json::Value;
use spidergraph_core::Msg;

/// What the network thread hands to the frame loop.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub stream: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    Connected,
    Disconnected,
    Graph {
        view: Option<String>,
        payload: Value,
    },
    Notice(String),
    Other(Msg),
    Error(String),
}

impl Incoming {
    pub fn connected(stream: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Connected,
        }
    }

    pub fn disconnected(stream: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Disconnected,
        }
    }

    pub fn graph(stream: String, view: Option<String>, payload: Value) -> Self {
        Self {
            stream,
            kind: IncomingKind::Graph { view, payload },
        }
    }

    pub fn error(stream: String, msg: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Error(msg),
        }
    }

    /// Sorts a decoded frame into the kinds the engine reacts to.
    pub fn from_msg(stream: String, msg: Msg) -> Self {
        let kind = match msg {
            Msg::Graph { view, payload } => IncomingKind::Graph { view, payload },
            Msg::Notice { text } => IncomingKind::Notice(text),
            other => IncomingKind::Other(other),
        };
        Self { stream, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_and_notice_frames_are_unwrapped() {
        let inc = Incoming::from_msg(
            "s".into(),
            Msg::Graph {
                view: Some("Docs".into()),
                payload: serde_json::json!({"nodes": []}),
            },
        );
        assert!(matches!(inc.kind, IncomingKind::Graph { view: Some(ref v), .. } if v == "Docs"));

        let inc = Incoming::from_msg("s".into(), Msg::notice("hi"));
        assert!(matches!(inc.kind, IncomingKind::Notice(ref t) if t == "hi"));

        let inc = Incoming::from_msg("s".into(), Msg::Pong);
        assert!(matches!(inc.kind, IncomingKind::Other(Msg::Pong)));
    }
}
