use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BACKEND_HOST: &str = "http://localhost:8080";
const DEFAULT_PORT: u16 = 8081;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid backend host {host:?}: {reason}")]
    BackendHost { host: String, reason: String },
    #[error("Invalid port {0:?}")]
    Port(String),
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Optional overrides read from `config/dashboard.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend_host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<usize>,
    pub frontend_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub backend_host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub frontend_dir: PathBuf,
}

impl DashboardConfig {
    /// Defaults, then the YAML file (if any), then `.env` and process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config_path = std::env::var("DASHBOARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_dir().join("config/dashboard.yaml"));

        let file_config = if config_path.exists() {
            log::info!("Loading config file {}", config_path.display());
            let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                path: config_path.display().to_string(),
                source,
            })?;
            FileConfig::from_yaml(&raw)?
        } else {
            FileConfig::default()
        };

        Self::resolve(file_config, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        file_config: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let backend_host = env("BACKEND_HOST")
            .or(file_config.backend_host)
            .unwrap_or_else(|| DEFAULT_BACKEND_HOST.to_string());

        let port = match env("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Port(raw))?,
            None => file_config.port.unwrap_or(DEFAULT_PORT),
        };

        let timeout_secs = file_config
            .request_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            backend_host: normalize_backend_host(&backend_host)?,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: file_config
                .max_upload_bytes
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            frontend_dir: file_config
                .frontend_dir
                .unwrap_or_else(|| workspace_dir().join("frontend/dist")),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl FileConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

fn workspace_dir() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => PathBuf::from(manifest_dir).join(".."),
        Err(_) => PathBuf::from("/usr/src/app"),
    }
}

/// Endpoints are derived by appending a path to the host, so it must not end in `/`.
fn normalize_backend_host(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::BackendHost {
        host: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::BackendHost {
            host: raw.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}
