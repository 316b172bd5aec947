use crate::core::db::{CaseTransform, CommandHelper, ProcedureCatalog, SqliteProvider};
use crate::core::{DbAutoFillError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub procedures: Vec<ProcedureConfig>,
}

/// Connection-related configuration.
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    /// SQLite database path, or ":memory:"
    pub path: String,
    pub schema: Option<String>,
    #[serde(default)]
    pub case_transform: CaseTransform,
    /// SQL batch run on every new connection
    pub setup: Option<String>,
}

/// A catalogued procedure.
#[derive(Debug, Deserialize)]
pub struct ProcedureConfig {
    pub name: String,
    pub sql: String,
}

impl Config {
    /// Builds the SQLite provider described by this configuration.
    pub fn sqlite_provider(&self) -> SqliteProvider {
        let mut catalog = ProcedureCatalog::new();
        for procedure in &self.procedures {
            catalog.insert(&procedure.name, &procedure.sql);
        }

        let provider = SqliteProvider::new(catalog);
        match &self.connection.setup {
            Some(setup) => provider.with_setup(setup.clone()),
            None => provider,
        }
    }

    /// Builds a command helper connected to the configured database.
    pub fn command_helper(&self) -> Result<CommandHelper<SqliteProvider>> {
        let helper = CommandHelper::new(
            self.sqlite_provider(),
            &self.connection.path,
            self.connection.schema.as_deref(),
        )?;
        Ok(helper.with_case_transform(self.connection.case_transform))
    }

    fn validate(&self) -> Result<()> {
        if self.connection.path.trim().is_empty() {
            return Err(DbAutoFillError::Config("connection.path must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for procedure in &self.procedures {
            if procedure.name.trim().is_empty() {
                return Err(DbAutoFillError::Config("procedure name must not be empty".to_string()));
            }
            if procedure.sql.trim().is_empty() {
                return Err(DbAutoFillError::Config(format!(
                    "procedure '{}' has no SQL",
                    procedure.name
                )));
            }
            if !seen.insert(procedure.name.to_lowercase()) {
                return Err(DbAutoFillError::Config(format!(
                    "procedure '{}' is defined more than once",
                    procedure.name
                )));
            }
        }
        Ok(())
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// let config = dbautofill::config::load_config("dbautofill.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// `<config dir>/dbautofill/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dbautofill").join("config.toml"))
}
