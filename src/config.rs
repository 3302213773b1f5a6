use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::TaxTable;

const BUILTIN_TAX_TABLE: &str = include_str!("../data/tax.json");

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tax table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tax table {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tax table {0} defines no tax years")]
    EmptyTaxTable(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub tax_table: TaxTable,
}

impl AppConfig {
    pub fn new(host: IpAddr, port: u16, tax_table_path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            host,
            port,
            tax_table: load_tax_table(tax_table_path)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Loads the tax table from `path`, or the bundled table when none is given.
pub fn load_tax_table(path: Option<&Path>) -> Result<TaxTable, ConfigError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading tax table");
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_tax_table(&raw, &path.display().to_string())
        }
        None => builtin_tax_table(),
    }
}

pub fn builtin_tax_table() -> Result<TaxTable, ConfigError> {
    parse_tax_table(BUILTIN_TAX_TABLE, "built-in")
}

fn parse_tax_table(raw: &str, origin: &str) -> Result<TaxTable, ConfigError> {
    let table: TaxTable = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    if table.is_empty() {
        return Err(ConfigError::EmptyTaxTable(origin.to_string()));
    }
    Ok(table)
}
