use crate::adapters::encryption::ENCRYPTION_KEY_ENV;
use crate::config::env::{EnvConfig, SERVICE_KEY_ENV, URL_ENV};
use crate::domain::model::Record;
use crate::utils::error::{GatewayError, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// Credentials are optional here so that a missing one surfaces as a typed
// configuration error from `credentials()` instead of a clap usage error.
#[derive(Debug, Clone, Parser)]
#[command(name = "record-gateway")]
#[command(about = "List and insert rows of the criminal_records table")]
pub struct CliConfig {
    #[arg(long, env = URL_ENV)]
    pub url: Option<String>,

    #[arg(long, env = SERVICE_KEY_ENV, hide_env_values = true)]
    pub service_key: Option<String>,

    #[arg(long, env = ENCRYPTION_KEY_ENV, hide_env_values = true)]
    pub encryption_key: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit log lines as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every row of the table
    List,
    /// Insert one row and print what the service stored
    Insert {
        /// Row as a JSON object
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<String>,

        /// File holding the row as a JSON object
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl CliConfig {
    /// Resolves and validates the credentials given on the command line or
    /// through the environment.
    pub fn credentials(&self) -> Result<EnvConfig> {
        EnvConfig::from_lookup(|name| match name {
            URL_ENV => self.url.clone(),
            SERVICE_KEY_ENV => self.service_key.clone(),
            ENCRYPTION_KEY_ENV => self.encryption_key.clone(),
            _ => None,
        })
    }
}

/// Reads the row for `insert` from `--data`, or from `--file` when no inline
/// data is given.
pub fn read_record(data: Option<&str>, file: Option<&Path>) -> Result<Record> {
    let raw = match (data, file) {
        (Some(data), _) => data.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(GatewayError::MissingConfigError {
                field: "--data or --file".to_string(),
            })
        }
    };

    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Record::from_value(value)
}
