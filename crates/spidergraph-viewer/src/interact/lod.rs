use serde::{Deserialize, Serialize};
use spidergraph_core::NodeId;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Above this many visible edges only edges touching the hovered or
    /// selected node are drawn.
    pub edge_focus_threshold: usize,
    pub edge_hide_zoom: f32,
    pub label_hide_zoom: f32,
    pub zoom_debounce_ms: u64,
    /// View name exempt from edge focus.
    pub overview_view: String,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            edge_focus_threshold: 420,
            edge_hide_zoom: 0.38,
            label_hide_zoom: 0.28,
            zoom_debounce_ms: 70,
            overview_view: "Summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LodState {
    pub edge_focus: bool,
    pub edges_hidden: bool,
    pub labels_hidden: bool,
}

#[derive(Debug)]
pub struct LodController {
    cfg: LodConfig,
    state: LodState,
    zoom: f32,
    pending: Option<(f32, Duration)>,
}

impl Default for LodController {
    fn default() -> Self {
        Self::new(LodConfig::default())
    }
}

impl LodController {
    pub fn new(cfg: LodConfig) -> Self {
        Self {
            cfg,
            state: LodState::default(),
            zoom: 1.0,
            pending: None,
        }
    }

    pub fn set_config(&mut self, cfg: LodConfig) {
        self.cfg = cfg;
        self.apply_zoom();
    }

    pub fn config(&self) -> &LodConfig {
        &self.cfg
    }

    pub fn state(&self) -> LodState {
        self.state
    }

    /// Zoom the current state was evaluated at.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn apply_zoom(&mut self) {
        self.state.edges_hidden = self.zoom < self.cfg.edge_hide_zoom;
        self.state.labels_hidden = self.zoom < self.cfg.label_hide_zoom;
    }

    /// Immediate re-evaluation after a view rebuild. Any pending zoom is
    /// applied as well.
    pub fn on_view_rebuilt(&mut self, visible_edges: usize, view_name: Option<&str>) {
        let overview = view_name == Some(self.cfg.overview_view.as_str());
        self.state.edge_focus = visible_edges > self.cfg.edge_focus_threshold && !overview;
        if let Some((zoom, _)) = self.pending.take() {
            self.zoom = zoom;
        }
        self.apply_zoom();
    }

    /// Records a zoom change. The first change arms the debounce deadline;
    /// later ones only update the value.
    pub fn on_zoom(&mut self, zoom: f32, now: Duration) {
        match &mut self.pending {
            Some((latest, _)) => *latest = zoom,
            None => {
                let deadline = now + Duration::from_millis(self.cfg.zoom_debounce_ms);
                self.pending = Some((zoom, deadline));
            }
        }
    }

    /// Applies the latest zoom once the deadline passed. Returns true when
    /// the state changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some((zoom, deadline)) = self.pending else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.pending = None;
        let before = self.state;
        self.zoom = zoom;
        self.apply_zoom();
        before != self.state
    }

    pub fn edge_visible(
        &self,
        source: &NodeId,
        target: &NodeId,
        hovered: Option<&NodeId>,
        selected: Option<&NodeId>,
    ) -> bool {
        if self.state.edges_hidden {
            return false;
        }
        if !self.state.edge_focus {
            return true;
        }
        [hovered, selected]
            .into_iter()
            .flatten()
            .any(|focus| focus == source || focus == target)
    }

    pub fn label_visible(
        &self,
        id: &NodeId,
        main_labels: &HashSet<NodeId>,
        hovered: Option<&NodeId>,
        selected: Option<&NodeId>,
    ) -> bool {
        if hovered == Some(id) || selected == Some(id) {
            return true;
        }
        if self.state.labels_hidden {
            return main_labels.contains(id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn edge_focus_needs_many_edges_outside_overview() {
        let mut lod = LodController::default();
        lod.on_view_rebuilt(2000, Some("Pipeline"));
        assert!(lod.state().edge_focus);
        lod.on_view_rebuilt(2000, Some("Summary"));
        assert!(!lod.state().edge_focus);
        lod.on_view_rebuilt(420, None);
        assert!(!lod.state().edge_focus);
        lod.on_view_rebuilt(421, None);
        assert!(lod.state().edge_focus);
    }

    #[test]
    fn focused_edges_follow_hover_and_selection() {
        let mut lod = LodController::default();
        lod.on_view_rebuilt(1000, None);
        let (a, b, c) = (NodeId::from("a"), NodeId::from("b"), NodeId::from("c"));
        assert!(!lod.edge_visible(&a, &b, None, None));
        assert!(lod.edge_visible(&a, &b, Some(&b), None));
        assert!(lod.edge_visible(&a, &b, None, Some(&a)));
        assert!(!lod.edge_visible(&a, &b, Some(&c), Some(&c)));
    }

    #[test]
    fn zoom_is_debounced_from_the_first_change() {
        let mut lod = LodController::default();
        lod.on_zoom(0.5, ms(0));
        lod.on_zoom(0.2, ms(50));
        assert!(!lod.tick(ms(60)));
        assert!(!lod.state().labels_hidden);

        assert!(lod.tick(ms(70)));
        let state = lod.state();
        assert!(state.edges_hidden);
        assert!(state.labels_hidden);
        assert_eq!(lod.zoom(), 0.2);
        assert!(!lod.tick(ms(200)));
    }

    #[test]
    fn rebuild_applies_pending_zoom_immediately() {
        let mut lod = LodController::default();
        lod.on_zoom(0.3, ms(0));
        lod.on_view_rebuilt(10, None);
        assert!(lod.state().edges_hidden);
        assert!(!lod.state().labels_hidden);
    }

    #[test]
    fn hidden_labels_keep_main_hovered_and_selected() {
        let mut lod = LodController::default();
        lod.on_zoom(0.1, ms(0));
        lod.tick(ms(100));

        let main: HashSet<NodeId> = [NodeId::from("m")].into_iter().collect();
        let (m, h, s, x) = (
            NodeId::from("m"),
            NodeId::from("h"),
            NodeId::from("s"),
            NodeId::from("x"),
        );
        assert!(lod.label_visible(&m, &main, None, None));
        assert!(lod.label_visible(&h, &main, Some(&h), None));
        assert!(lod.label_visible(&s, &main, None, Some(&s)));
        assert!(!lod.label_visible(&x, &main, Some(&h), Some(&s)));
    }
}
