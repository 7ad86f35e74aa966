//! Relay configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`):
//!
//! | Key           | Default        | Meaning                              |
//! |---------------|----------------|--------------------------------------|
//! | `LISTEN_ADDR` | `0.0.0.0:8080` | socket address to bind               |
//! | `ADMIN_TOKEN` | required       | shared admin secret                  |
//! | `STATIC_DIR`  | unset          | directory served under `/static`     |
//! | `LOG_FORMAT`  | `text`         | `json` for JSON log lines            |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Shared secret that elevates socket clients and authorizes the
    /// administrative API.
    pub admin_token: String,

    /// Optional directory of static assets served under `/static`.
    pub static_dir: Option<PathBuf>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `ADMIN_TOKEN` is missing or empty, or if
    /// `LISTEN_ADDR` is set but cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RelayConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()?;

        let admin_token = lookup("ADMIN_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or("ADMIN_TOKEN must be set to a non-empty secret")?;

        let static_dir = lookup("STATIC_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            admin_token,
            static_dir,
            log_format,
        })
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("admin_token", &"<redacted>")
            .field("static_dir", &self.static_dir)
            .field("log_format", &self.log_format)
            .finish()
    }
}
