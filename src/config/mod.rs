//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "foglio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;

/// Command-line arguments for the Foglio binary.
#[derive(Debug, Parser)]
#[command(name = "foglio", version, about = "Foglio blogging platform server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOGLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the log level directive (e.g. `info`, `foglio=debug`).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit JSON log lines instead of the compact human format.
    #[arg(long = "log-json")]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the connection pool size.
    #[arg(long = "database-max-connections", value_name = "N")]
    pub database_max_connections: Option<u32>,

    /// Comma-separated administrator emails.
    #[arg(long = "admin-emails", value_name = "EMAILS")]
    pub admin_emails: Option<String>,

    /// Session lifetime in hours; 0 disables expiry.
    #[arg(long = "session-ttl-hours", value_name = "HOURS")]
    pub session_ttl_hours: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// `None` means sessions never expire.
    pub session_ttl: Option<Duration>,
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOGLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(args),
        None => {}
    }

    Settings::from_raw(raw)
}

/// Parse the CLI and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    auth: RawAuthSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    /// Comma-separated, so the allow-list can arrive via a single
    /// environment variable.
    admin_emails: Option<String>,
    session_ttl_hours: Option<u64>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeArgs) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(emails) = overrides.admin_emails.as_ref() {
            self.auth.admin_emails = Some(emails.clone());
        }
        if let Some(hours) = overrides.session_ttl_hours {
            self.auth.session_ttl_hours = Some(hours);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let host = raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = raw.server.port.unwrap_or(DEFAULT_PORT);
        let listen_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|err| LoadError::invalid("server.host", err.to_string()))?;

        let graceful_shutdown = Duration::from_secs(
            raw.server
                .graceful_shutdown_seconds
                .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS),
        );

        let level = match raw.logging.level {
            Some(ref value) => LevelFilter::from_str(value)
                .map_err(|err| LoadError::invalid("logging.level", err.to_string()))?,
            None => LevelFilter::INFO,
        };
        let format = if raw.logging.json.unwrap_or(false) {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };

        let max_connections = raw
            .database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let max_connections = NonZeroU32::new(max_connections)
            .ok_or_else(|| LoadError::invalid("database.max_connections", "must be non-zero"))?;

        let session_ttl = match raw.auth.session_ttl_hours {
            Some(0) => None,
            Some(hours) => Some(Duration::from_secs(hours * 3600)),
            None => Some(Duration::from_secs(DEFAULT_SESSION_TTL_HOURS * 3600)),
        };

        let admin_emails = raw
            .auth
            .admin_emails
            .map(|raw| {
                raw.split(',')
                    .map(|email| email.trim().to_lowercase())
                    .filter(|email| !email.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server: ServerSettings {
                listen_addr,
                graceful_shutdown,
            },
            logging: LoggingSettings { level, format },
            database: DatabaseSettings {
                url: raw.database.url,
                max_connections,
            },
            auth: AuthSettings {
                session_ttl,
                admin_emails,
            },
        })
    }
}

#[cfg(test)]
mod tests;
