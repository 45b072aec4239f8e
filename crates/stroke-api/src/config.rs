use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use stroke_store::LoadOptions;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "STROKE_CONFIG_PATH";
/// Configuration file used when neither `--config` nor the env var is set
pub const DEFAULT_CONFIG_PATH: &str = "stroke.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub delimiter: String,
    /// Defaults to the first header column
    pub id_column: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("healthcare-dataset-stroke-data.csv"),
            delimiter: ",".to_string(),
            id_column: None,
        }
    }
}

/// Status code returned for a request that fails validation.
///
/// `NotFound` keeps compatibility with existing callers of the lookup
/// endpoint; `BadRequest` is the conventional choice for new deployments.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    NotFound,
    BadRequest,
}

impl ValidationStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            ValidationStatus::NotFound => StatusCode::NOT_FOUND,
            ValidationStatus::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_found" | "404" => Ok(ValidationStatus::NotFound),
            "bad_request" | "400" => Ok(ValidationStatus::BadRequest),
            other => Err(format!("unknown validation status '{other}'")),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LookupConfig {
    pub max_ids_per_request: usize,
    pub validation_status: ValidationStatus,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_ids_per_request: default_max_ids_per_request(),
            validation_status: ValidationStatus::default(),
        }
    }
}

fn default_max_ids_per_request() -> usize {
    1000
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StrokeConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub lookup: LookupConfig,
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl StrokeConfig {
    /// Load configuration from `path`, `$STROKE_CONFIG_PATH` or `stroke.toml`.
    ///
    /// Only the implicit default file may be absent; an explicitly named file
    /// that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let config_path = explicit.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        match fs::read_to_string(&config_path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)
                    .map_err(|source| ConfigError::Parse { path: config_path.clone(), source })?;
                Ok((config, ConfigSource::File(config_path)))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                warn!(
                    "Configuration file '{}' not found. Using default configuration.",
                    config_path.display()
                );
                Ok((Self::default(), ConfigSource::Defaults))
            }
            Err(source) => Err(ConfigError::Read { path: config_path, source }),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply `STROKE_*` environment variable overrides.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `var`; unparseable values are ignored.
    pub fn apply_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = var("STROKE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("STROKE_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid STROKE_PORT"),
            }
        }
        if let Some(path) = var("STROKE_DATASET_PATH") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(delimiter) = var("STROKE_DELIMITER") {
            self.dataset.delimiter = delimiter;
        }
        if let Some(column) = var("STROKE_ID_COLUMN") {
            self.dataset.id_column = Some(column).filter(|c| !c.is_empty());
        }
        if let Some(max_ids) = var("STROKE_MAX_IDS_PER_REQUEST") {
            match max_ids.parse::<usize>() {
                Ok(max_ids) => self.lookup.max_ids_per_request = max_ids,
                Err(_) => warn!(value = %max_ids, "Ignoring invalid STROKE_MAX_IDS_PER_REQUEST"),
            }
        }
        if let Some(status) = var("STROKE_VALIDATION_STATUS") {
            match status.parse::<ValidationStatus>() {
                Ok(status) => self.lookup.validation_status = status,
                Err(reason) => warn!(%reason, "Ignoring invalid STROKE_VALIDATION_STATUS"),
            }
        }

        info!(
            host = %self.server.host,
            port = self.server.port,
            dataset = %self.dataset.path.display(),
            validation_status = ?self.lookup.validation_status,
            "Configuration resolved"
        );
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delimiter_byte()?;
        if self.lookup.max_ids_per_request == 0 {
            return Err(ConfigError::Invalid {
                field: "lookup.max_ids_per_request",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            delimiter: self.delimiter_byte()?,
            id_column: self.dataset.id_column.clone(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        let delimiter = match self.dataset.delimiter.as_str() {
            "\\t" | "tab" => "\t",
            other => other,
        };
        match delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::Invalid {
                field: "dataset.delimiter",
                reason: format!("expected a single ASCII character, got {:?}", self.dataset.delimiter),
            }),
        }
    }
}
