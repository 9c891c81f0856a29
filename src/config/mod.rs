use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::errors::WikiError;

/// Which page store backs the wiki
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One `{title}.txt` file per page
    File,
    /// Append-only SQLite table of page records
    Document,
}

impl FromStr for StoreBackend {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" | "files" => Ok(StoreBackend::File),
            "document" | "sqlite" | "db" => Ok(StoreBackend::Document),
            other => Err(WikiError::Config(format!("unknown store backend '{}'", other))),
        }
    }
}

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub backend: StoreBackend,
    pub database_url: String,
    pub port: u16,
    pub host: String,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            templates_dir: PathBuf::from("templates"),
            backend: StoreBackend::File,
            database_url: "sqlite:pages.db".to_string(),
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }

    /// Create configuration with custom values
    pub fn with_custom(
        data_dir: Option<PathBuf>,
        templates_dir: Option<PathBuf>,
        backend: Option<StoreBackend>,
        database_url: Option<String>,
        port: Option<u16>,
        host: Option<String>,
    ) -> Self {
        let defaults = Self::new();
        Self {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            templates_dir: templates_dir.unwrap_or(defaults.templates_dir),
            backend: backend.unwrap_or(defaults.backend),
            database_url: database_url.unwrap_or(defaults.database_url),
            port: port.unwrap_or(defaults.port),
            host: host.unwrap_or(defaults.host),
        }
    }

    /// Get the `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Command line flags, each also settable through a `STRATA_*` variable
#[derive(Debug, Parser)]
#[command(name = "strata-pages", version, about = "Minimal wiki server")]
pub struct Cli {
    /// Directory holding `{title}.txt` page files
    #[arg(long, env = "STRATA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory the HTML templates are loaded from at startup
    #[arg(long, env = "STRATA_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Page store backend: `file` or `document`
    #[arg(long, env = "STRATA_STORE")]
    pub store: Option<StoreBackend>,

    /// SQLite url for the document store
    #[arg(long, env = "STRATA_DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "STRATA_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "STRATA_HOST")]
    pub host: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config::with_custom(
            self.data_dir,
            self.templates_dir,
            self.store,
            self.database_url,
            self.port,
            self.host,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_file_store() {
        let config = Config::default();
        assert_eq!(config.backend, StoreBackend::File);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "strata-pages",
            "--store",
            "document",
            "--database-url",
            "sqlite::memory:",
            "--port",
            "9000",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.backend, StoreBackend::Document);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 9000);
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!("cloud".parse::<StoreBackend>().is_err());
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Document);
    }
}
