use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Payload sent to every viewer on connect and re-sent when it changes.
    pub graph: Option<PathBuf>,
    /// Directory holding one `<view>.json` per named view.
    pub views_dir: Option<PathBuf>,
    pub socket: String,
    /// Program handed the path of every open request.
    pub open_cmd: Option<String>,
}

pub fn runtime_sock_path() -> String {
    // Wayland-friendly: prefer XDG_RUNTIME_DIR
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        format!("{dir}/spidergraph.sock")
    } else {
        "/tmp/spidergraph.sock".to_string()
    }
}

pub fn parse_args() -> Result<HostConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<HostConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut graph = None;
    let mut views_dir = None;
    let mut socket = None;
    let mut open_cmd = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--graph" {
            let Some(path) = args.next() else {
                anyhow::bail!("--graph expects a file");
            };
            graph = Some(PathBuf::from(path));
        } else if arg == "--views" {
            let Some(path) = args.next() else {
                anyhow::bail!("--views expects a directory");
            };
            views_dir = Some(PathBuf::from(path));
        } else if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            socket = Some(path.to_string_lossy().into_owned());
        } else if arg == "--open-cmd" {
            let Some(cmd) = args.next() else {
                anyhow::bail!("--open-cmd expects a program");
            };
            let cmd = cmd.to_string_lossy().trim().to_string();
            open_cmd = Some(cmd).filter(|c| !c.is_empty());
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(HostConfig {
        graph,
        views_dir,
        socket: socket.unwrap_or_else(runtime_sock_path),
        open_cmd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_all_flags() {
        let config = parse_args_from(args(&[
            "--graph",
            "graph.json",
            "--views",
            "views",
            "--socket",
            "/tmp/test.sock",
            "--open-cmd",
            "xdg-open",
        ]))
        .expect("config parsed");
        assert_eq!(config.graph, Some(PathBuf::from("graph.json")));
        assert_eq!(config.views_dir, Some(PathBuf::from("views")));
        assert_eq!(config.socket, "/tmp/test.sock");
        assert_eq!(config.open_cmd.as_deref(), Some("xdg-open"));
    }

    #[test]
    fn defaults_to_runtime_socket() {
        let config = parse_args_from(Vec::<OsString>::new()).expect("config parsed");
        assert_eq!(config.socket, runtime_sock_path());
        assert!(config.graph.is_none());
        assert!(config.open_cmd.is_none());
    }

    #[test]
    fn blank_open_cmd_is_ignored() {
        let config = parse_args_from(args(&["--open-cmd", "  "])).expect("config parsed");
        assert!(config.open_cmd.is_none());
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(parse_args_from(args(&["--mode", "user"])).is_err());
        assert!(parse_args_from(args(&["--views"])).is_err());
    }
}
