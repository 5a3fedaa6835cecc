//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Leaderboard/roster URL suffixes
    #[serde(default)]
    pub urls: UrlConfig,

    /// CSS selectors for the scoring platform's markup
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Document store backend and layout
    #[serde(default)]
    pub store: StoreConfig,

    /// Merge behavior
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override settings from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary variable source.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = var("HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http.timeout_secs = secs;
        }
        if let Some(agent) = var("HTTP_USER_AGENT") {
            self.http.user_agent = agent;
        }
        if let Some(backend) = var("STORE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => log::warn!("Ignoring STORE_BACKEND: {}", e),
            }
        }
        if let Some(path) = var("STORE_PATH") {
            self.store.local_path = PathBuf::from(path);
        }
        if let Some(project) = var("FIRESTORE_PROJECT_ID") {
            self.store.project_id = Some(project);
        }
        if let Some(database) = var("FIRESTORE_DATABASE") {
            self.store.database = database;
        }
        if let Some(host) = var("FIRESTORE_EMULATOR_HOST") {
            self.store.endpoint = Some(format!("http://{}", host.trim_end_matches('/')));
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.urls.leaderboard_suffix.is_empty() {
            return Err(AppError::validation("urls.leaderboard_suffix is empty"));
        }
        for (key, value) in [
            ("store.events_collection", &self.store.events_collection),
            ("store.organizations_collection", &self.store.organizations_collection),
            ("store.members_collection", &self.store.members_collection),
        ] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(AppError::validation(format!(
                    "{key} must be a non-empty name without '/'"
                )));
            }
        }
        if self.store.backend == StoreBackend::Firestore && self.store.project_id.is_none() {
            return Err(AppError::validation(
                "store.project_id is required for the firestore backend",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Suffixes used to derive page URLs from an event reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Appended to the event reference to reach the leaderboard
    #[serde(default = "defaults::leaderboard_suffix")]
    pub leaderboard_suffix: String,

    /// Replaces the leaderboard suffix to reach the participant list
    #[serde(default = "defaults::participants_suffix")]
    pub participants_suffix: String,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            leaderboard_suffix: defaults::leaderboard_suffix(),
            participants_suffix: defaults::participants_suffix(),
        }
    }
}

/// CSS selectors for both page types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub standings: StandingsSelectors,

    #[serde(default)]
    pub roster: RosterSelectors,
}

/// Selectors for the leaderboard page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsSelectors {
    /// One block per division
    #[serde(default = "defaults::standings_division")]
    pub division: String,

    /// Division heading inside a block
    #[serde(default = "defaults::standings_heading")]
    pub heading: String,

    /// Table rows inside a block
    #[serde(default = "defaults::standings_row")]
    pub row: String,

    /// Position label inside a row
    #[serde(default = "defaults::standings_position")]
    pub position: String,

    /// Competitor name inside a row
    #[serde(default = "defaults::standings_name")]
    pub name: String,
}

impl Default for StandingsSelectors {
    fn default() -> Self {
        Self {
            division: defaults::standings_division(),
            heading: defaults::standings_heading(),
            row: defaults::standings_row(),
            position: defaults::standings_position(),
            name: defaults::standings_name(),
        }
    }
}

/// Selectors for the participant list page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSelectors {
    /// One block per division
    #[serde(default = "defaults::roster_division")]
    pub division: String,

    /// Participant rows inside a block
    #[serde(default = "defaults::roster_participant")]
    pub participant: String,

    /// Display name inside a row
    #[serde(default = "defaults::roster_name")]
    pub name: String,

    /// User handle inside a row
    #[serde(default = "defaults::roster_user_id")]
    pub user_id: String,
}

impl Default for RosterSelectors {
    fn default() -> Self {
        Self {
            division: defaults::roster_division(),
            participant: defaults::roster_participant(),
            name: defaults::roster_name(),
            user_id: defaults::roster_user_id(),
        }
    }
}

/// Document store backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit
    Memory,
    /// JSON snapshot on disk
    #[default]
    Local,
    /// Cloud Firestore REST API
    Firestore,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "local" => Ok(Self::Local),
            "firestore" => Ok(Self::Firestore),
            other => Err(AppError::config(format!("unknown store backend '{other}'"))),
        }
    }
}

/// Document store settings and collection layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory holding the local snapshot
    #[serde(default = "defaults::local_path")]
    pub local_path: PathBuf,

    /// Firestore project
    #[serde(default)]
    pub project_id: Option<String>,

    /// Firestore database id
    #[serde(default = "defaults::database")]
    pub database: String,

    /// Firestore endpoint override (emulator)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "defaults::events_collection")]
    pub events_collection: String,

    #[serde(default = "defaults::organizations_collection")]
    pub organizations_collection: String,

    #[serde(default = "defaults::members_collection")]
    pub members_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            local_path: defaults::local_path(),
            project_id: None,
            database: defaults::database(),
            endpoint: None,
            events_collection: defaults::events_collection(),
            organizations_collection: defaults::organizations_collection(),
            members_collection: defaults::members_collection(),
        }
    }
}

/// Merge behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Stage creations with an "must not exist" precondition when the
    /// store supports it
    #[serde(default)]
    pub guard_creates: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; roster-sync/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // URL defaults
    pub fn leaderboard_suffix() -> String {
        "/leaderboard?round=1".into()
    }
    pub fn participants_suffix() -> String {
        "/participants".into()
    }

    // Leaderboard markup
    pub fn standings_division() -> String {
        ".flex.flex-col.gap-y-4 > .flex-col".into()
    }
    pub fn standings_heading() -> String {
        "h2.text-large-strong".into()
    }
    pub fn standings_row() -> String {
        "tbody tr".into()
    }
    pub fn standings_position() -> String {
        "td:first-child .text-xs".into()
    }
    pub fn standings_name() -> String {
        "td:nth-child(2) .text-wrap.text-start".into()
    }

    // Participant list markup
    pub fn roster_division() -> String {
        r".border-divider.xs\:p-5.w-full.border-b.px-1.py-3".into()
    }
    pub fn roster_participant() -> String {
        ".flex.items-center.justify-between.gap-x-2.w-full".into()
    }
    pub fn roster_name() -> String {
        "p.mb-1.leading-none".into()
    }
    pub fn roster_user_id() -> String {
        "div.text-subtle p.leading-none".into()
    }

    // Store defaults
    pub fn local_path() -> PathBuf {
        PathBuf::from("storage")
    }
    pub fn database() -> String {
        "(default)".into()
    }
    pub fn events_collection() -> String {
        "events".into()
    }
    pub fn organizations_collection() -> String {
        "organizations".into()
    }
    pub fn members_collection() -> String {
        "members".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
