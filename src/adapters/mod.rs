// Adapters layer: concrete implementations of the domain ports.

pub mod encryption;
pub mod http;

pub use encryption::{EncryptingStore, FieldCipher};
pub use http::RestClient;
