use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use clap::Parser;

pub const DEFAULT_PORT: u16 = 3500;

/// Serve a directory of markdown files as a browsable, searchable document set.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Directory whose markdown files are served.
    #[arg(long, env = "WORKSPACE_ROOT", default_value_os_t = default_root())]
    pub root: PathBuf,

    /// Address to bind to.
    #[arg(long, env = "WORKSPACE_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub address: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "WORKSPACE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// The directory above the one holding the executable.
fn default_root() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|executable| executable.parent()?.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config =
            Config::try_parse_from(["workspace-viewer", "--root", "/srv/notes", "--port", "8080"])
                .unwrap();

        assert_eq!(config.root, Path::new("/srv/notes"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        assert!(Config::try_parse_from(["workspace-viewer", "--address", "nowhere"]).is_err());
    }
}
