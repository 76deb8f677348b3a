use crate::error::{PolymathError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_LLM_MODEL: &str = "gemini-pro";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_DIMENSIONS: u32 = 128;

/// Read a required variable from the process environment.
pub fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| PolymathError::missing_env(key))
}

/// Populate the process environment from a `.env` file and return the file
/// that was loaded.
///
/// With no explicit path the file is looked up from the current directory
/// upwards, and its absence is silent. An explicit path that does not exist
/// is warned about. Neither case is an error; a file that exists but cannot
/// be parsed is logged and skipped.
pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
    let outcome = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match outcome {
        Ok(loaded) => {
            log::debug!("Loaded settings from {}", loaded.display());
            Some(loaded)
        }
        Err(e) if e.not_found() => {
            match path {
                Some(path) => log::warn!(
                    "Env file {} not found, using process environment",
                    path.display()
                ),
                None => log::debug!("No .env file found, using process environment"),
            }
            None
        }
        Err(e) => {
            log::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Transport used to reach SurrealDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Ws,
    Wss,
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ws => "ws",
            Protocol::Wss => "wss",
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl FromStr for Protocol {
    type Err = PolymathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ws" => Ok(Protocol::Ws),
            "wss" => Ok(Protocol::Wss),
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(PolymathError::Configuration(format!(
                "SURREALDB_PROTOCOL must be one of ws, wss, http, https (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    pub llm_model: String,
    pub embedding_model: String,
    pub api_base: String,
    pub embedding_dimensions: u32,
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"<redacted>")
            .field("llm_model", &self.llm_model)
            .field("embedding_model", &self.embedding_model)
            .field("api_base", &self.api_base)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurrealEndpoint {
    pub protocol: Protocol,
    pub host: String,
    pub port: Option<u16>,
}

impl SurrealEndpoint {
    /// `{protocol}://{host}[:{port}]`
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurrealScope {
    pub namespace: String,
    pub database: String,
}

#[derive(Clone)]
pub struct SurrealCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SurrealCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrealCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SurrealConfig {
    pub endpoint: SurrealEndpoint,
    pub scope: SurrealScope,
    pub credentials: SurrealCredentials,
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub google: GoogleConfig,
    pub surreal: SurrealConfig,
}

impl Config {
    /// Load `.env` (if any) into the process environment, then resolve.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        load_dotenv(env_file);
        Self::from_env()
    }

    /// Resolve from the process environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    ///
    /// Required keys fail only when absent. Optional keys treat an empty
    /// value the same as an absent one and fall back to their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| PolymathError::missing_env(key));
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google = GoogleConfig {
            api_key: required("GOOGLE_API_KEY")?,
            llm_model: optional("GOOGLE_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            embedding_model: optional("GOOGLE_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            api_base: optional("GOOGLE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            embedding_dimensions: match optional("GOOGLE_EMBEDDING_DIMENSIONS") {
                Some(raw) => parse_positive("GOOGLE_EMBEDDING_DIMENSIONS", &raw)?,
                None => DEFAULT_EMBEDDING_DIMENSIONS,
            },
        };

        let protocol = match optional("SURREALDB_PROTOCOL") {
            Some(raw) => raw.parse()?,
            None => Protocol::default(),
        };
        let port = match optional("SURREALDB_PORT") {
            Some(raw) => Some(parse_number("SURREALDB_PORT", &raw)?),
            None => None,
        };

        let surreal = SurrealConfig {
            endpoint: SurrealEndpoint {
                protocol,
                host: required("SURREALDB_HOST")?,
                port,
            },
            scope: SurrealScope {
                namespace: required("SURREALDB_NS")?,
                database: required("SURREALDB_DB")?,
            },
            credentials: SurrealCredentials {
                username: required("SURREALDB_USER")?,
                password: required("SURREALDB_PASS")?,
            },
        };

        log::info!("Configuration loaded.");
        Ok(Self { google, surreal })
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        PolymathError::Configuration(format!("{} must be a positive integer (got '{}')", key, raw))
    })
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    match parse_number(key, raw)? {
        0 => Err(PolymathError::Configuration(format!(
            "{} must be a positive integer (got '{}')",
            key, raw
        ))),
        n => Ok(n),
    }
}
