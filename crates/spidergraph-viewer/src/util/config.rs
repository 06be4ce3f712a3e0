use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

use crate::graph::importance::ScoringConfig;
use crate::graph::layout::LayoutConfig;
use crate::graph::nav::ViewRoutes;
use crate::graph::view::ViewParams;
use crate::interact::{LodConfig, TapConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Graph host socket. Only dialled when `auto_connect` is set.
    pub socket_path: String,
    pub auto_connect: bool,
    /// JSON payload read at startup when no host is used.
    pub graph_file: Option<PathBuf>,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            socket_path: default_uds_path(),
            auto_connect: false,
            graph_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Node id navigation returns to on Home.
    pub home_root: Option<String>,
    pub show_web: bool,
    pub search_limit: usize,
    pub view: ViewParams,
    pub scoring: ScoringConfig,
    pub layout: LayoutConfig,
    pub tap: TapConfig,
    pub lod: LodConfig,
    pub routes: ViewRoutes,
    pub source: DataSource,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            home_root: None,
            show_web: true,
            search_limit: 50,
            view: ViewParams::default(),
            scoring: ScoringConfig::default(),
            layout: LayoutConfig::default(),
            tap: TapConfig::default(),
            lod: LodConfig::default(),
            routes: ViewRoutes::default(),
            source: DataSource::default(),
        }
    }
}

pub fn default_uds_path() -> String {
    static CACHED: OnceLock<String> = OnceLock::new();
    CACHED
        .get_or_init(|| {
            if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
                format!("{dir}/spidergraph.sock")
            } else {
                "/tmp/spidergraph.sock".to_string()
            }
        })
        .clone()
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "spidergraph")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), "ignoring invalid viewer config: {e}");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::LayoutMode;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let mut cfg = ViewerConfig::default();
        cfg.home_root = Some("dir:specs/".to_string());
        cfg.layout.mode = LayoutMode::Continuous;
        cfg.source.graph_file = Some(PathBuf::from("/tmp/graph.json"));

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(
            &path,
            r#"
home_root = "ROOT"

[view]
max_depth = 3

[lod]
edge_focus_threshold = 100

[layout]
mode = "continuous"
"#,
        )
        .expect("write config");

        let cfg = load_or_default_from_path(&path);
        assert_eq!(cfg.home_root.as_deref(), Some("ROOT"));
        assert_eq!(cfg.view.max_depth, 3);
        assert_eq!(cfg.view.max_nodes, ViewParams::default().max_nodes);
        assert_eq!(cfg.lod.edge_focus_threshold, 100);
        assert_eq!(cfg.lod.zoom_debounce_ms, 70);
        assert_eq!(cfg.layout.mode, LayoutMode::Continuous);
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn invalid_or_missing_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());

        fs::write(&path, "view = [not toml").expect("write config");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }
}
