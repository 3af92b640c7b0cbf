//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use disha_app_core::PoolSettings;
use disha_app_core::llm::GeminiConfig;
use disha_app_core::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Runtime configuration for disha-server.
///
/// Every field except the Gemini API key has a default. The key is checked
/// by `main` so that a missing key fails startup with a clear message.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:7000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://disha.db"`).
    pub database_url: String,

    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_max_lifetime_secs: u64,

    /// `GOOGLE_API_KEY`; required to start.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,

    /// Base system prompt file.
    pub system_prompt_path: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rolling log files; stdout when unset.
    pub log_dir: Option<PathBuf>,

    /// Comma-separated CORS origins; any origin when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve `/api-docs/openapi.json`.
    pub enable_openapi: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("DISHA_BIND", "0.0.0.0:7000"),
            database_url: std::env::var("DISHA_DATABASE_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .unwrap_or_else(|_| "sqlite://disha.db".to_owned()),
            db_max_connections: parse_env("DISHA_DB_MAX_CONNECTIONS", 20),
            db_acquire_timeout_secs: parse_env("DISHA_DB_ACQUIRE_TIMEOUT_SECS", 15),
            db_max_lifetime_secs: parse_env("DISHA_DB_MAX_LIFETIME_SECS", 3600),
            google_api_key: non_empty_env("GOOGLE_API_KEY"),
            gemini_model: env_or("DISHA_GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: env_or("DISHA_GEMINI_BASE_URL", DEFAULT_BASE_URL),
            llm_timeout_secs: parse_env("DISHA_LLM_TIMEOUT_SECS", 120),
            system_prompt_path: non_empty_env("DISHA_SYSTEM_PROMPT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/disha_system.txt"))
                }),
            log_level: env_or("DISHA_LOG", "info"),
            log_json: flag_env("DISHA_LOG_JSON", false),
            log_dir: non_empty_env("DISHA_LOG_DIR").map(PathBuf::from),
            cors_allowed_origins: non_empty_env("DISHA_CORS_ORIGINS"),
            enable_openapi: flag_env("DISHA_ENABLE_OPENAPI", true),
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
            max_lifetime: Duration::from_secs(self.db_max_lifetime_secs),
        }
    }

    pub fn gemini_config(&self, api_key: &str) -> GeminiConfig {
        GeminiConfig {
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
            ..GeminiConfig::new(api_key)
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("system_prompt_path", &self.system_prompt_path)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("log_dir", &self.log_dir)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_openapi", &self.enable_openapi)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl Config {
    /// Defaults that ignore the process environment.
    pub fn for_tests() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            db_max_connections: 1,
            db_acquire_timeout_secs: 15,
            db_max_lifetime_secs: 3600,
            google_api_key: None,
            gemini_model: DEFAULT_MODEL.to_owned(),
            gemini_base_url: DEFAULT_BASE_URL.to_owned(),
            llm_timeout_secs: 120,
            system_prompt_path: PathBuf::from("prompts/disha_system.txt"),
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            enable_openapi: true,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn gemini_config_keeps_key_and_overrides() {
        let mut cfg = Config::for_tests();
        cfg.gemini_model = "gemini-test".into();
        cfg.gemini_base_url = "http://localhost:1".into();
        cfg.llm_timeout_secs = 5;

        let gemini = cfg.gemini_config("k");
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.model, "gemini-test");
        assert_eq!(gemini.base_url, "http://localhost:1");
        assert_eq!(gemini.timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_hides_api_key() {
        let mut cfg = Config::for_tests();
        cfg.google_api_key = Some("very-secret".into());
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
