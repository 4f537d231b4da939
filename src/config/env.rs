use crate::adapters::encryption::{ENCRYPTION_KEY_ENV, MIN_PASSPHRASE_LEN};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_min_length, validate_required_field, validate_secret, validate_url, Validate,
};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const URL_ENV: &str = "SUPABASE_URL";
pub const SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_KEY";

/// Credentials for the remote service, read once at startup.
#[derive(Clone)]
pub struct EnvConfig {
    url: String,
    service_key: String,
    encryption_key: Option<String>,
}

impl EnvConfig {
    /// Reads both credentials from the process environment. Call
    /// `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads credentials from a `.env`-style file without touching the
    /// process environment. Variables missing from the file fall back to
    /// the process environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        tracing::debug!(
            "Loaded {} variable(s) from {}",
            vars.len(),
            path.as_ref().display()
        );

        Self::from_lookup(|name| vars.get(name).cloned().or_else(|| std::env::var(name).ok()))
    }

    /// Fails on a missing credential. Values are checked by `validate`, or
    /// when the gateway is built from this config.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_ENV);
        let service_key = lookup(SERVICE_KEY_ENV);

        Ok(Self {
            url: validate_required_field(URL_ENV, &url)?.clone(),
            service_key: validate_required_field(SERVICE_KEY_ENV, &service_key)?.clone(),
            // A blank key means encryption is off.
            encryption_key: lookup(ENCRYPTION_KEY_ENV).filter(|key| !key.trim().is_empty()),
        })
    }
}

impl Validate for EnvConfig {
    fn validate(&self) -> Result<()> {
        validate_url(URL_ENV, &self.url)?;
        validate_secret(SERVICE_KEY_ENV, &self.service_key)?;
        if let Some(key) = &self.encryption_key {
            validate_min_length(ENCRYPTION_KEY_ENV, key, MIN_PASSPHRASE_LEN)?;
        }
        Ok(())
    }
}

impl ConfigProvider for EnvConfig {
    fn endpoint_url(&self) -> &str {
        &self.url
    }

    fn service_key(&self) -> &str {
        &self.service_key
    }

    fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("encryption", &self.encryption_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GatewayError;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_with_both_credentials() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, "service-key"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url(), "https://abc.supabase.co");
        assert_eq!(config.service_key(), "service-key");
    }

    #[test]
    fn test_missing_url_is_typed_error() {
        let err = EnvConfig::from_lookup(lookup_from(&[(SERVICE_KEY_ENV, "service-key")]))
            .unwrap_err();
        match err {
            GatewayError::MissingConfigError { field } => assert_eq!(field, URL_ENV),
            other => panic!("expected MissingConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_is_typed_error() {
        let err = EnvConfig::from_lookup(lookup_from(&[(URL_ENV, "https://abc.supabase.co")]))
            .unwrap_err();
        match err {
            GatewayError::MissingConfigError { field } => assert_eq!(field, SERVICE_KEY_ENV),
            other => panic!("expected MissingConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, ""),
        ]))
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(GatewayError::InvalidConfigValueError { .. })
        ));

        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, ""),
            (SERVICE_KEY_ENV, "service-key"),
        ]))
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(GatewayError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_encryption_key_is_optional() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, "service-key"),
            (ENCRYPTION_KEY_ENV, "  "),
        ]))
        .unwrap();
        assert_eq!(config.encryption_key(), None);

        let passphrase = "0123456789abcdef0123456789abcdef";
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, "service-key"),
            (ENCRYPTION_KEY_ENV, passphrase),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.encryption_key(), Some(passphrase));
        assert!(!format!("{:?}", config).contains(passphrase));
    }

    #[test]
    fn test_short_encryption_key_is_rejected() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, "service-key"),
            (ENCRYPTION_KEY_ENV, "short"),
        ]))
        .unwrap();
        match config.validate() {
            Err(GatewayError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, ENCRYPTION_KEY_ENV)
            }
            other => panic!("expected InvalidConfigValueError, got {:?}", other),
        }
        assert!(crate::RecordGateway::connect(&config).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (URL_ENV, "https://abc.supabase.co"),
            (SERVICE_KEY_ENV, "super-secret"),
        ]))
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("abc.supabase.co"));
    }
}
