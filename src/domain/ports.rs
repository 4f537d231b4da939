use crate::domain::model::{Record, RecordCollection};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Connection to a remote tabular data service.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select_all(&self, table: &str) -> Result<RecordCollection>;
    async fn insert(&self, table: &str, record: &Record) -> Result<RecordCollection>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint_url(&self) -> &str;
    fn service_key(&self) -> &str;

    /// Passphrase for column encryption; `None` stores rows as given.
    fn encryption_key(&self) -> Option<&str> {
        None
    }
}
