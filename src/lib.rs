pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{EncryptingStore, FieldCipher, RestClient};
pub use config::EnvConfig;
pub use crate::core::{gateway::RecordGateway, Record, RecordCollection, RecordStore};
pub use domain::model::CriminalRecord;
pub use utils::error::{GatewayError, Result};
