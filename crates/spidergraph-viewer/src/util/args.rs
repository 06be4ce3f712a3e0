use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::util::config::ViewerConfig;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    pub graph: Option<PathBuf>,
    pub socket: Option<String>,
    pub focus: Option<String>,
    pub path: Option<String>,
}

/// Node the first real payload should open on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialFocus {
    Id(String),
    Path(String),
}

impl LaunchArgs {
    pub fn initial_focus(&self) -> Option<InitialFocus> {
        self.focus
            .clone()
            .map(InitialFocus::Id)
            .or_else(|| self.path.clone().map(InitialFocus::Path))
    }

    pub fn apply_to(&self, cfg: &mut ViewerConfig) {
        if let Some(graph) = &self.graph {
            cfg.source.graph_file = Some(graph.clone());
        }
        if let Some(socket) = &self.socket {
            cfg.source.socket_path = socket.clone();
            cfg.source.auto_connect = true;
        }
    }
}

pub fn parse_args() -> Result<LaunchArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<LaunchArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = LaunchArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--graph" {
            let Some(path) = args.next() else {
                anyhow::bail!("--graph expects a file");
            };
            out.graph = Some(PathBuf::from(path));
        } else if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            out.socket = Some(path.to_string_lossy().into_owned());
        } else if arg == "--focus" {
            let Some(id) = args.next() else {
                anyhow::bail!("--focus expects a node id");
            };
            out.focus = Some(id.to_string_lossy().into_owned());
        } else if arg == "--path" {
            let Some(path) = args.next() else {
                anyhow::bail!("--path expects a node path");
            };
            out.path = Some(path.to_string_lossy().into_owned());
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_all_flags() {
        let parsed = parse_args_from(args(&[
            "--graph", "g.json", "--socket", "/tmp/s.sock", "--path", "specs/",
        ]))
        .expect("args parsed");
        assert_eq!(parsed.graph, Some(PathBuf::from("g.json")));
        assert_eq!(parsed.socket.as_deref(), Some("/tmp/s.sock"));
        assert_eq!(parsed.initial_focus(), Some(InitialFocus::Path("specs/".into())));
    }

    #[test]
    fn focus_wins_over_path() {
        let parsed = parse_args_from(args(&["--path", "a/", "--focus", "n1"])).expect("args parsed");
        assert_eq!(parsed.initial_focus(), Some(InitialFocus::Id("n1".into())));
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(parse_args_from(args(&["--zoom"])).is_err());
        assert!(parse_args_from(args(&["--focus"])).is_err());
    }

    #[test]
    fn socket_flag_enables_auto_connect() {
        let parsed = parse_args_from(args(&["--socket", "/run/x.sock"])).expect("args parsed");
        let mut cfg = ViewerConfig::default();
        parsed.apply_to(&mut cfg);
        assert!(cfg.source.auto_connect);
        assert_eq!(cfg.source.socket_path, "/run/x.sock");
    }
}
