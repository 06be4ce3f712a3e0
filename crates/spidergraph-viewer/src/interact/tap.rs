use serde::{Deserialize, Serialize};
use spidergraph_core::NodeId;
use std::time::{Duration, Instant};

/// Monotonic time source for the disambiguator.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    /// Two taps on one node within this window drill down.
    pub window_ms: u64,
    /// Hold the select back until the window has passed.
    pub defer_single: bool,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            window_ms: 260,
            defer_single: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapDecision {
    Select(NodeId),
    DrillDown(NodeId),
    Open(NodeId),
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum TapState {
    #[default]
    Idle,
    PendingSingle {
        id: NodeId,
        at: Duration,
        emitted: bool,
    },
}

#[derive(Debug, Default)]
pub struct TapTracker {
    cfg: TapConfig,
    state: TapState,
}

impl TapTracker {
    pub fn new(cfg: TapConfig) -> Self {
        Self {
            cfg,
            state: TapState::Idle,
        }
    }

    pub fn set_config(&mut self, cfg: TapConfig) {
        self.cfg = cfg;
    }

    pub fn config(&self) -> TapConfig {
        self.cfg
    }

    fn window(&self) -> Duration {
        Duration::from_millis(self.cfg.window_ms)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TapState::PendingSingle { .. })
    }

    /// Plain tap on a node. Returns the decision to act on now, if any.
    pub fn tap(&mut self, id: NodeId, now: Duration) -> Option<TapDecision> {
        if let TapState::PendingSingle { id: pending, at, .. } = &self.state {
            if *pending == id && now.saturating_sub(*at) <= self.window() {
                self.state = TapState::Idle;
                return Some(TapDecision::DrillDown(id));
            }
        }

        let emitted = !self.cfg.defer_single;
        self.state = TapState::PendingSingle {
            id: id.clone(),
            at: now,
            emitted,
        };
        emitted.then_some(TapDecision::Select(id))
    }

    /// Resolves a pending tap once its window has passed.
    pub fn poll(&mut self, now: Duration) -> Option<TapDecision> {
        let TapState::PendingSingle { id, at, emitted } = &self.state else {
            return None;
        };
        if now.saturating_sub(*at) <= self.window() {
            return None;
        }
        let decision = (!*emitted).then(|| TapDecision::Select(id.clone()));
        self.state = TapState::Idle;
        decision
    }

    /// Device-level double activation.
    pub fn double_tap(&mut self, id: NodeId) -> TapDecision {
        self.state = TapState::Idle;
        TapDecision::DrillDown(id)
    }

    /// Tap with a modifier held. Leaves pending state alone.
    pub fn modified_tap(&mut self, id: NodeId) -> TapDecision {
        TapDecision::Open(id)
    }

    pub fn tap_empty(&mut self) -> TapDecision {
        self.state = TapState::Idle;
        TapDecision::ClearSelection
    }
}
