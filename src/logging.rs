// ABOUTME: tracing-subscriber initialization with env-driven filter and format
// ABOUTME: Supports pretty, compact, and JSON output for local runs and deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output for local development
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// Newline-delimited JSON for log shippers
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set; the default keeps the service
/// at `info` while quieting sqlx statement logging. The format comes from
/// `LOG_FORMAT` (`pretty`, `compact`, or `json`), defaulting to pretty.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or `LOG_FORMAT`
/// holds an unknown value.
pub fn init_from_env() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reviewsync=info,sqlx=warn"));

    let format: LogFormat = match std::env::var("LOG_FORMAT") {
        Ok(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
        Err(_) => LogFormat::default(),
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
