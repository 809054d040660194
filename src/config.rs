//! Command-line settings.
//!
//! Only runtime knobs live here.  The provider list itself is static and is
//! edited in [`crate::registry`].

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Per-request timeout for vendor fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
/// Dashboard refresh interval.
pub const DEFAULT_REFRESH_SECS: u64 = 60;
/// How long a fetched body is reused.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_PORT: u16 = 8501;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Refresh interval in seconds (browser auto-refresh / terminal timer).
    #[arg(long, global = true, default_value_t = DEFAULT_REFRESH_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_secs: u64,

    /// Response cache TTL in seconds; 0 disables the cache.
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Concurrent fetches per poll pass.
    #[arg(long, global = true, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Serve the web dashboard (default).
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        bind: IpAddr,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Show the dashboard in the terminal.
    Tui {
        /// Write logs here; the terminal view itself never shows log lines.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

impl Cli {
    /// The selected mode, defaulting to `serve` on localhost.
    pub fn mode(&self) -> Mode {
        self.command.clone().unwrap_or(Mode::Serve {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_on_localhost() {
        let cli = Cli::try_parse_from(["outage-watch"]).unwrap();
        assert_eq!(cli.timeout(), Duration::from_secs(12));
        assert_eq!(cli.refresh(), Duration::from_secs(60));
        assert_eq!(cli.cache_ttl(), Duration::from_secs(60));
        assert_eq!(cli.workers, 8);
        assert_eq!(
            cli.mode(),
            Mode::Serve { bind: "127.0.0.1".parse().unwrap(), port: 8501 }
        );
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "outage-watch", "serve", "--bind", "0.0.0.0", "--port", "9000", "--workers", "2",
        ])
        .unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Serve { bind: "0.0.0.0".parse().unwrap(), port: 9000 }
        );
        assert_eq!(cli.workers, 2);
    }

    #[test]
    fn parses_tui_with_log_file() {
        let cli = Cli::try_parse_from([
            "outage-watch", "tui", "--log-file", "/tmp/ow.log", "--refresh-secs", "15",
        ])
        .unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Tui { log_file: Some(PathBuf::from("/tmp/ow.log")) }
        );
        assert_eq!(cli.refresh(), Duration::from_secs(15));
    }

    #[test]
    fn rejects_zero_refresh() {
        assert!(Cli::try_parse_from(["outage-watch", "--refresh-secs", "0"]).is_err());
    }
}
