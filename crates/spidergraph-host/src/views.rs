use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Graph payloads on disk: one default graph plus optional named views.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Option<PathBuf>,
    views_dir: Option<PathBuf>,
}

impl GraphStore {
    pub fn new(graph: Option<PathBuf>, views_dir: Option<PathBuf>) -> Self {
        Self { graph, views_dir }
    }

    pub fn graph_path(&self) -> Option<&Path> {
        self.graph.as_deref()
    }

    pub fn default_graph(&self) -> Result<Value> {
        let Some(path) = &self.graph else {
            anyhow::bail!("no default graph configured");
        };
        read_json(path)
    }

    pub fn load_view(&self, name: &str) -> Result<Value> {
        let Some(dir) = &self.views_dir else {
            anyhow::bail!("no views directory configured");
        };
        read_json(&view_file(dir, name)?)
    }
}

/// `<dir>/<name>.json`. Names are plain file stems.
pub fn view_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if !plain {
        anyhow::bail!("invalid view name: {name:?}");
    }
    Ok(dir.join(format!("{name}.json")))
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}
