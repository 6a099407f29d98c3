//! Command-line and environment configuration.
//!
//! Every flag can also be set through a `USERDIR_*` environment variable.
//! Theme and keybinding files are looked up in the explicit path first, then
//! in the per-user config directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::api::DEFAULT_BASE_URL;
use crate::app::Screen;
use crate::query::QueryOptions;

#[derive(Debug, Clone, Parser)]
#[command(name = "userdir", version, about = "Browse, search and inspect users served by a REST API")]
pub struct Cli {
    /// Base URL of the user API (`{base}/users`, `{base}/users/{id}`).
    #[arg(long, env = "USERDIR_API_BASE_URL", default_value = DEFAULT_BASE_URL, value_parser = parse_base_url)]
    pub base_url: String,

    /// Open the detail view of this user id on start.
    #[arg(long, env = "USERDIR_USER", value_name = "ID")]
    pub user: Option<String>,

    /// Start on the user list instead of the home screen.
    #[arg(long, env = "USERDIR_SKIP_HOME")]
    pub skip_home: bool,

    /// Seconds cached data stays fresh before it is revalidated.
    #[arg(long, env = "USERDIR_STALE_SECS", default_value_t = 0)]
    pub stale_secs: u64,

    /// Seconds an unused cache entry is kept.
    #[arg(long, env = "USERDIR_GC_SECS", default_value_t = 300)]
    pub gc_secs: u64,

    /// Theme file (`key = #RRGGBB` lines).
    #[arg(long, env = "USERDIR_THEME", value_name = "PATH")]
    pub theme: Option<PathBuf>,

    /// Keybinding file (`Action = KeySpec` lines).
    #[arg(long, env = "USERDIR_KEYBINDS", value_name = "PATH")]
    pub keybinds: Option<PathBuf>,

    /// Write logs here; filtered by `RUST_LOG` (default `info`).
    #[arg(long, env = "USERDIR_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(self.stale_secs),
            gc_time: Duration::from_secs(self.gc_secs),
        }
    }

    pub fn start_screen(&self) -> Screen {
        match &self.user {
            Some(id) => Screen::Detail { id: id.clone() },
            None if self.skip_home => Screen::List,
            None => Screen::Home,
        }
    }

    /// Where to read (or create) the theme file.
    pub fn theme_path(&self) -> Option<PathBuf> {
        self.theme.clone().or_else(|| config_file_path("theme.conf"))
    }

    /// Where to read (or create) the keybinding file.
    pub fn keybinds_path(&self) -> Option<PathBuf> {
        self.keybinds.clone().or_else(|| config_file_path("keybinds.conf"))
    }
}

fn parse_base_url(s: &str) -> Result<String, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid URL '{s}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(s.trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme '{other}', expected http or https")),
    }
}

/// `$XDG_CONFIG_HOME/userdir`, falling back to `~/.config/userdir`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("userdir"));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("userdir"))
}

/// Path of `name` in the config dir, whether or not it exists.
pub fn config_file_path(name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(name))
}
