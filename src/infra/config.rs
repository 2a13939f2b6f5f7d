use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub host: IpAddr,
    pub port: u16,
    pub environment: String,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("Invalid MODE: {0}. Must be 'server' or 'stdio'")]
    InvalidMode(String),
    #[error("PORT cannot be 0")]
    ZeroPort,
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

/// Optional TOML overlay, pointed to by `GATEWAY_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: ServerSection,
    gemini: GeminiSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    mode: Option<String>,
    host: Option<IpAddr>,
    port: Option<u16>,
    environment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeminiSection {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Environment only; ignores `GATEWAY_CONFIG`.
    pub fn from_env() -> Self {
        Self::layered(FileConfig::default())
    }

    /// TOML file (if `GATEWAY_CONFIG` is set) with environment overrides.
    pub fn from_env_and_toml() -> Result<Self, ConfigError> {
        let file = match env_nonempty("GATEWAY_CONFIG") {
            Some(path) => load_file(Path::new(&path))?,
            None => FileConfig::default(),
        };
        Ok(Self::layered(file))
    }

    fn layered(file: FileConfig) -> Self {
        let mode = env_nonempty("MODE")
            .or(file.server.mode)
            .unwrap_or_else(|| "server".into());
        let host = env_nonempty("HOST")
            .and_then(|s| s.parse::<IpAddr>().ok())
            .or(file.server.host)
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let port = env_nonempty("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);
        let environment = env_nonempty("ENVIRONMENT")
            .or(file.server.environment)
            .unwrap_or_else(|| "development".into());

        let gemini = GeminiConfig {
            api_key: env_nonempty("GEMINI_API_KEY").or(file.gemini.api_key),
            model: env_nonempty("GEMINI_MODEL")
                .or(file.gemini.model)
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: env_nonempty("GEMINI_BASE_URL")
                .or(file.gemini.base_url)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            timeout_secs: env_nonempty("GEMINI_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .or(file.gemini.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Self { mode, host, port, environment, gemini }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(ConfigError::InvalidMode(self.mode.clone()));
        }
        if self.mode == "server" && self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.gemini.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: display.clone(), source })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: display, source })
}
