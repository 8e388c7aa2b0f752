//! Eventica configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::datetime::MalformedDatePolicy;
use crate::error::{EventicaError, EventicaResult};
use crate::store::WriteFailurePolicy;

static DEFAULT_EVENTS_FILE: &str = "~/eventica/events.json";
static DEFAULT_DATABASE_FILE: &str = "~/eventica/events.sqlite3";
static DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
const DEFAULT_MIGRATE_BODY_LIMIT: usize = 16 * 1024 * 1024;

fn default_events_file() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_FILE)
}

fn default_database_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_FILE)
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_migrate_body_limit() -> usize {
    DEFAULT_MIGRATE_BODY_LIMIT
}

/// Which store holds the events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// A single pretty-printed `events.json`
    #[default]
    Json,
    /// SQLite database with timestamps
    Sqlite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration at ~/.config/eventica/config.toml, overridable with
/// `EVENTICA_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventicaConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,

    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// IANA zone deciding what "today" is; system zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub malformed_dates: MalformedDatePolicy,

    #[serde(default)]
    pub write_failures: WriteFailurePolicy,

    /// Bearer token for mutating routes; open when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Largest request body accepted by the single-event routes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Largest request body accepted by the migrate route, which carries a
    /// whole export
    #[serde(default = "default_migrate_body_limit")]
    pub migrate_body_limit_bytes: usize,
}

impl Default for EventicaConfig {
    fn default() -> Self {
        EventicaConfig {
            backend: Backend::default(),
            events_file: default_events_file(),
            database_file: default_database_file(),
            listen_addr: default_listen_addr(),
            timezone: None,
            malformed_dates: MalformedDatePolicy::default(),
            write_failures: WriteFailurePolicy::default(),
            admin_token: None,
            log_format: LogFormat::default(),
            body_limit_bytes: default_body_limit(),
            migrate_body_limit_bytes: default_migrate_body_limit(),
        }
    }
}

impl EventicaConfig {
    pub fn config_path() -> EventicaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventicaError::Config("Could not determine config directory".into()))?
            .join("eventica");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// on first run.
    pub fn load() -> EventicaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> EventicaResult<Self> {
        let config: EventicaConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("EVENTICA").try_parsing(true))
            .build()
            .map_err(|e| EventicaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventicaError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EventicaResult<()> {
        self.timezone()?;

        if self.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(EventicaError::Config("admin_token must not be empty".into()));
        }

        Ok(())
    }

    pub fn events_path(&self) -> PathBuf {
        expand(&self.events_file)
    }

    pub fn database_path(&self) -> PathBuf {
        expand(&self.database_file)
    }

    pub fn timezone(&self) -> EventicaResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                Tz::from_str(name)
                    .map_err(|_| EventicaError::Config(format!("Unknown timezone '{}'", name)))
            })
            .transpose()
    }

    pub fn to_toml(&self) -> EventicaResult<String> {
        toml::to_string_pretty(self).map_err(|e| EventicaError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventicaResult<()> {
        let contents = format!(
            "\
# eventica configuration

# Storage backend (\"json\" or \"sqlite\"):
# backend = \"json\"

# Where the events live:
# events_file = \"{}\"
# database_file = \"{}\"

# Address the API server listens on:
# listen_addr = \"{}\"

# Timezone used to decide which events are upcoming (defaults to the system zone):
# timezone = \"Europe/London\"

# Unparseable event dates: \"reject\" or \"today\"
# malformed_dates = \"reject\"

# Failed writes to events_file: \"fail\" or \"keep-in-memory\"
# write_failures = \"fail\"

# Require this bearer token on add/update/delete/migrate:
# admin_token = \"change-me\"

# Request body limits in bytes (migrate takes a whole export in one request):
# body_limit_bytes = {}
# migrate_body_limit_bytes = {}
",
            DEFAULT_EVENTS_FILE,
            DEFAULT_DATABASE_FILE,
            DEFAULT_LISTEN_ADDR,
            DEFAULT_BODY_LIMIT,
            DEFAULT_MIGRATE_BODY_LIMIT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventicaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventicaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
