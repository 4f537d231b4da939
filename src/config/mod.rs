#[cfg(feature = "cli")]
pub mod cli;
pub mod env;

#[cfg(feature = "cli")]
pub use cli::{read_record, CliConfig, Command};
pub use crate::adapters::encryption::ENCRYPTION_KEY_ENV;
pub use env::{EnvConfig, SERVICE_KEY_ENV, URL_ENV};
