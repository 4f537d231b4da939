use crate::adapters::encryption::{EncryptingStore, FieldCipher};
use crate::adapters::http::RestClient;
use crate::domain::model::{Record, RecordCollection};
use crate::domain::ports::{ConfigProvider, RecordStore};
use crate::utils::error::Result;

pub const TABLE: &str = "criminal_records";

/// Mediates all reads and writes to the `criminal_records` table through one
/// long-lived store handle.
///
/// Two flavours of each operation are offered. `fetch_all` and `insert_one`
/// never fail: errors are logged once and collapsed into an empty or absent
/// result. `try_fetch_all` and `try_insert_one` return the error instead.
pub struct RecordGateway<S: RecordStore> {
    store: S,
}

impl RecordGateway<EncryptingStore<RestClient>> {
    /// Validates the credentials and builds the connection handle. Column
    /// encryption is on when the config carries an encryption key.
    pub fn connect<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = RestClient::from_config(config)?;
        let cipher = config.encryption_key().map(FieldCipher::new).transpose()?;
        tracing::info!(
            encryption = cipher.is_some(),
            "Connected record gateway to {}",
            client.rest_url()
        );
        Ok(Self::new(EncryptingStore::new(client, cipher)))
    }
}

impl<S: RecordStore> RecordGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn table(&self) -> &'static str {
        TABLE
    }

    pub async fn try_fetch_all(&self) -> Result<RecordCollection> {
        let records = self.store.select_all(TABLE).await?;
        tracing::debug!("Fetched {} record(s) from {}", records.len(), TABLE);
        Ok(records)
    }

    pub async fn try_insert_one(&self, record: &Record) -> Result<RecordCollection> {
        let inserted = self.store.insert(TABLE, record).await?;
        tracing::debug!("Inserted {} record(s) into {}", inserted.len(), TABLE);
        Ok(inserted)
    }

    /// Every row of the table, or an empty collection if the call failed.
    pub async fn fetch_all(&self) -> RecordCollection {
        match self.try_fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(table = TABLE, "Error fetching records: {}", e);
                Vec::new()
            }
        }
    }

    /// The rows the service reports as inserted, or `None` if the call failed.
    pub async fn insert_one(&self, record: &Record) -> Option<RecordCollection> {
        match self.try_insert_one(record).await {
            Ok(inserted) => Some(inserted),
            Err(e) => {
                tracing::error!(table = TABLE, "Error adding record: {}", e);
                None
            }
        }
    }
}
