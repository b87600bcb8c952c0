//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment. Values are
//! taken as plain strings and resolved by [`Config::from_args`]: anything
//! missing, empty or invalid falls back to its default instead of aborting.

use clap::Parser;
use log::warn;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VDB_PATH: &str = "/var/db/pkg";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_PORT: u16 = 2112;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// portage-exporter - Prometheus exporter for installed Gentoo packages
///
/// Periodically scans the installed-package database and serves one
/// `portage_package` gauge per installed package instance.
///
/// Examples:
///   portage-exporter                          # scan /var/db/pkg every 5 minutes, serve :2112/metrics
///   VDB_UPDATE_INTERVAL=30s portage-exporter  # rescan every 30 seconds
#[derive(Parser, Debug, Default)]
#[command(name = "portage-exporter", version = env!("PORTAGE_EXPORTER_VERSION"), about)]
pub struct Args {
    /// Installed-package database to scan (default /var/db/pkg)
    #[arg(long = "vdb-path", env = "VDB_PATH", value_name = "PATH")]
    pub vdb_path: Option<String>,

    /// Rescan interval, e.g. "5m", "1h30m", "90s" or plain seconds (default 5m)
    #[arg(long = "interval", env = "VDB_UPDATE_INTERVAL", value_name = "DURATION")]
    pub interval: Option<String>,

    /// Address to serve metrics on; ":PORT" listens on all interfaces (default :2112)
    #[arg(long = "listen", env = "SERVE_ADDRESS", value_name = "ADDR")]
    pub listen: Option<String>,

    /// HTTP path of the metrics endpoint (default /metrics)
    #[arg(long = "metrics-path", env = "SERVE_PATH", value_name = "PATH")]
    pub metrics_path: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub vdb_path: PathBuf,
    pub interval: Duration,
    pub listen: SocketAddr,
    pub metrics_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vdb_path: PathBuf::from(DEFAULT_VDB_PATH),
            interval: DEFAULT_INTERVAL,
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        let defaults = Self::default();

        let vdb_path = non_empty(&args.vdb_path)
            .map(PathBuf::from)
            .unwrap_or(defaults.vdb_path);

        // Invalid intervals fall back silently
        let interval = non_empty(&args.interval)
            .and_then(|value| parse_duration(value).ok())
            .filter(|interval| !interval.is_zero())
            .unwrap_or(defaults.interval);

        let listen = match non_empty(&args.listen) {
            Some(value) => parse_listen_address(value).unwrap_or_else(|e| {
                warn!(
                    "Invalid listen address '{}' ({}), using {}",
                    value, e, defaults.listen
                );
                defaults.listen
            }),
            None => defaults.listen,
        };

        let metrics_path = match non_empty(&args.metrics_path) {
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{}", path),
            None => defaults.metrics_path,
        };

        Self {
            vdb_path,
            interval,
            listen,
            metrics_path,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a listen address, treating a bare `:PORT` as all IPv4 interfaces.
pub fn parse_listen_address(input: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    match input.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port).parse(),
        None => input.parse(),
    }
}

/// Error type for duration parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationParseError {
    pub input: String,
    pub message: String,
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse duration '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for DurationParseError {}

/// Parse a duration string.
///
/// # Supported formats
///
/// | Format | Example | Description |
/// |--------|---------|-------------|
/// | Seconds | `300` | Plain integer seconds |
/// | Single unit | `5m`, `250ms`, `1.5h` | Number with unit suffix |
/// | Compound | `1h30m`, `2m30.5s` | Units summed left to right |
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let error = |message: &str| DurationParseError {
        input: input.to_string(),
        message: message.to_string(),
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(error("empty duration"));
    }

    if let Ok(seconds) = s.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| error("missing unit"))?;
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(error("expected a number"));
        }
        let value: f64 = number.parse().map_err(|_| error("invalid number"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let unit_nanos = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(error(&format!("unknown unit '{}'", unit))),
        };

        total_nanos += value * unit_nanos;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(error("duration out of range"));
    }
    Ok(Duration::from_nanos(total_nanos as u64))
}
