//! Daemon configuration (command line with environment fallbacks)

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use pprofit_api_http::HttpServerConfig;
use pprofit_core::application::supervisor::constants::{DEFAULT_GO_BIN, DEFAULT_LIVENESS_WINDOW};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "~/.pprofit";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, with colors
    Pretty,
    /// One JSON object per line
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pprofit")]
#[command(about = "Fetch, store and view profile snapshots", long_about = None)]
#[command(version)]
pub struct Config {
    /// Address to serve on as host:port. An empty host means localhost, an empty port picks a free one.
    #[arg(default_value = ":")]
    pub addr: String,

    /// Directory holding saved profiles
    #[arg(long, env = "PPROFIT_HOME", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Toolchain binary providing `tool pprof` and `tool trace`
    #[arg(long, env = "PPROFIT_GO_BIN", default_value = DEFAULT_GO_BIN)]
    pub go_bin: String,

    /// How long a viewer must stay up before it counts as started
    #[arg(long, env = "PPROFIT_LIVENESS_WINDOW_MS", default_value_t = DEFAULT_LIVENESS_WINDOW.as_millis() as u64)]
    pub liveness_window_ms: u64,

    /// Timeout for fetching a profile
    #[arg(long, env = "PPROFIT_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Do not try to open a browser on startup
    #[arg(long, env = "PPROFIT_NO_BROWSER")]
    pub no_browser: bool,

    #[arg(long, env = "PPROFIT_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        shellexpand::tilde(&self.data_dir).into_owned().into()
    }

    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.liveness_window_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn listen(&self) -> Result<HttpServerConfig> {
        let (host, port) = parse_listen_addr(&self.addr)?;
        Ok(HttpServerConfig { host, port })
    }
}

/// Split `host:port`; an empty host becomes localhost and an empty port becomes 0
pub fn parse_listen_addr(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("could not split http address `{}`: missing port", addr))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { DEFAULT_HOST } else { host };

    let port = if port.is_empty() {
        0
    } else {
        port.parse::<u16>()
            .with_context(|| format!("invalid port number `{}`", port))?
    };

    Ok((host.to_string(), port))
}
