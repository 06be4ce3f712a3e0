use serde_json::{json, Value};

pub const BOOTSTRAP_ROOT: &str = "ROOT";

const TOP_DIRS: [(&str, f64); 12] = [
    ("src", 1.00),
    ("include", 0.95),
    ("web", 0.90),
    ("specs", 0.75),
    ("docs", 0.70),
    ("scripts", 0.68),
    ("ai_context", 0.64),
    ("ai", 0.60),
    ("meta", 0.50),
    ("third_party", 0.45),
    ("resources", 0.42),
    (".codex", 0.40),
];

const CROSS_LINKS: [(&str, &str); 6] = [
    ("specs", "src"),
    ("docs", "specs"),
    ("scripts", "src"),
    ("ai_context", "docs"),
    ("ai", "ai_context"),
    ("meta", "docs"),
];

/// Project skeleton shown while no usable graph has been delivered.
pub fn bootstrap_payload() -> Value {
    let mut nodes = vec![json!({
        "id": BOOTSTRAP_ROOT,
        "label": "workspace",
        "kind": "root",
        "importance": 1.2,
    })];
    nodes.extend(TOP_DIRS.iter().map(|(dir, importance)| {
        json!({
            "id": dir,
            "label": dir,
            "kind": "dir",
            "path": format!("{dir}/"),
            "importance": importance,
        })
    }));

    let mut links: Vec<Value> = TOP_DIRS
        .iter()
        .map(|(dir, _)| json!({"source": BOOTSTRAP_ROOT, "target": dir}))
        .collect();
    links.extend(
        CROSS_LINKS
            .iter()
            .map(|(source, target)| json!({"source": source, "target": target})),
    );

    json!({"nodes": nodes, "links": links})
}
