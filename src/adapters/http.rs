use crate::domain::model::{records_from_value, Record, RecordCollection};
use crate::domain::ports::{ConfigProvider, RecordStore};
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{validate_secret, validate_url};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

const REST_PATH: &str = "rest/v1/";

/// Authenticated handle to a PostgREST endpoint. Clones share the same
/// connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    rest_url: Url,
}

/// Error body PostgREST sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestClient {
    pub fn new(url: &str, service_key: &str) -> Result<Self> {
        let mut base = validate_url("SUPABASE_URL", url)?;
        validate_secret("SUPABASE_SERVICE_KEY", service_key)?;

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base
            .join(REST_PATH)
            .map_err(|e| GatewayError::InvalidConfigValueError {
                field: "SUPABASE_URL".to_string(),
                value: url.to_string(),
                reason: format!("Cannot derive REST endpoint: {}", e),
            })?;

        let client = Client::builder()
            .default_headers(auth_headers(service_key)?)
            .build()?;

        tracing::debug!("REST endpoint: {}", rest_url);
        Ok(Self { client, rest_url })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.endpoint_url(), config.service_key())
    }

    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| GatewayError::InvalidConfigValueError {
                field: "table".to_string(),
                value: table.to_string(),
                reason: e.to_string(),
            })
    }
}

fn auth_headers(service_key: &str) -> Result<HeaderMap> {
    let invalid = |reason: String| GatewayError::InvalidConfigValueError {
        field: "SUPABASE_SERVICE_KEY".to_string(),
        value: "<redacted>".to_string(),
        reason,
    };

    let mut apikey =
        HeaderValue::from_str(service_key).map_err(|e| invalid(e.to_string()))?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", service_key))
        .map_err(|e| invalid(e.to_string()))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

async fn read_rows(response: Response) -> Result<RecordCollection> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<RemoteErrorBody>(&body) {
            Ok(RemoteErrorBody {
                message: Some(message),
                code,
                details,
                hint,
            }) => {
                tracing::debug!(?code, ?details, ?hint, "remote error detail");
                message
            }
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        return Err(GatewayError::RemoteError {
            status: status.as_u16(),
            message,
        });
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(&body)?;
    records_from_value(value)
}

#[async_trait]
impl RecordStore for RestClient {
    async fn select_all(&self, table: &str) -> Result<RecordCollection> {
        let url = self.table_url(table)?;
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("select", "*")])
            .send()
            .await?;

        read_rows(response).await
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<RecordCollection> {
        let url = self.table_url(table)?;
        tracing::debug!("Inserting {} field(s) into {}", record.len(), url);

        let response = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        read_rows(response).await
    }
}
