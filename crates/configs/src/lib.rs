use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_DATA_FILE: &str = "data/data_store.json";
pub const DEFAULT_STATIC_DIR: &str = "frontend";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Largest accepted record body; unset means no limit.
    #[serde(default)]
    pub body_limit_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), body_limit_bytes: None }
    }
}

/// Where the record collection and the static index live.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_file: String,
    #[serde(default)]
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

/// Unset is `None`; a value that does not parse is an error.
fn parse_env_number<N: std::str::FromStr>(name: &str, raw: Option<String>) -> Result<Option<N>> {
    match raw {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<N>()
            .map(Some)
            .map_err(|_| anyhow!("{name} must be a number, got {v:?}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file from `CONFIG_PATH` first; only a missing file falls back to env vars.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_or_env_from(&path)
    }

    /// Parse and validation errors in an existing file are returned, not skipped.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        match load_from_file(path) {
            Ok(mut cfg) => {
                cfg.normalize_and_validate()?;
                Ok(cfg)
            }
            Err(e) if is_missing_file(&e) => Self::from_env(),
            Err(e) => Err(e.context(format!("config file {path}"))),
        }
    }

    /// Build a config from `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`,
    /// `BODY_LIMIT_BYTES`, `DATA_FILE`, `STATIC_DIR` and `LOG_FORMAT`.
    pub fn from_env() -> Result<Self> {
        let defaults = ServerConfig::default();
        let host = std::env::var("SERVER_HOST").unwrap_or(defaults.host);
        let port = parse_env_number("SERVER_PORT", std::env::var("SERVER_PORT").ok())?.unwrap_or(defaults.port);
        let worker_threads = parse_env_number("TOKIO_WORKER_THREADS", std::env::var("TOKIO_WORKER_THREADS").ok())?;
        let body_limit_bytes = parse_env_number("BODY_LIMIT_BYTES", std::env::var("BODY_LIMIT_BYTES").ok())?;
        let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| default_log_format());
        let mut cfg = AppConfig {
            server: ServerConfig { host, port, worker_threads, body_limit_bytes },
            storage: StorageConfig::default(),
            logging: LoggingConfig { format },
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.logging.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        // blank entries are filled from the environment, then from defaults
        if self.data_file.trim().is_empty() {
            self.data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());
        }
        if self.static_dir.trim().is_empty() {
            self.static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string());
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        match self.format.as_str() {
            "compact" | "json" => Ok(()),
            other => Err(anyhow!("logging.format must be \"compact\" or \"json\", got {other:?}")),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}
