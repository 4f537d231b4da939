use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("Unexpected response from remote service: {message}")]
    UnexpectedResponse { message: String },

    #[error("Field decryption failed: {message}")]
    CipherError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value:?}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load env file: {0}")]
    EnvFileError(#[from] dotenvy::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Remote,
    Data,
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::MissingConfigError { .. }
            | GatewayError::InvalidConfigValueError { .. }
            | GatewayError::EnvFileError(_) => ErrorCategory::Configuration,
            GatewayError::ApiError(e) if e.is_decode() => ErrorCategory::Data,
            GatewayError::ApiError(_) => ErrorCategory::Network,
            GatewayError::RemoteError { .. } => ErrorCategory::Remote,
            GatewayError::UnexpectedResponse { .. }
            | GatewayError::CipherError { .. }
            | GatewayError::SerializationError(_)
            | GatewayError::IoError(_) => ErrorCategory::Data,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GatewayError::MissingConfigError { .. } => {
                "Set SUPABASE_URL and SUPABASE_SERVICE_KEY in the environment or a .env file"
            }
            GatewayError::InvalidConfigValueError { .. } => {
                "Check that SUPABASE_URL is an http(s) URL, the service key is not blank and ENCRYPTION_KEY has at least 32 characters"
            }
            GatewayError::EnvFileError(_) => "Check that the .env file exists and is readable",
            GatewayError::ApiError(_) => "Check network connectivity to the project URL",
            GatewayError::RemoteError { status: 401 | 403, .. } => {
                "Check the service key and the table's row level security policies"
            }
            GatewayError::RemoteError { status: 404, .. } => {
                "Check that the criminal_records table exists and is exposed by the API"
            }
            GatewayError::RemoteError { .. } => "Check the record fields against the table schema",
            GatewayError::UnexpectedResponse { .. } | GatewayError::SerializationError(_) => {
                "The response or input was not a JSON object or array of objects"
            }
            GatewayError::CipherError { .. } => {
                "Check that ENCRYPTION_KEY matches the key the rows were written with"
            }
            GatewayError::IoError(_) => "Check that the input file exists and is readable",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
