use crate::core::gateway::TABLE;
use crate::domain::model::{Record, RecordCollection};
use crate::domain::ports::RecordStore;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::validate_min_length;
use aes::Aes256;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use serde_json::Value;
use std::fmt;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";
pub const MIN_PASSPHRASE_LEN: usize = 32;

/// Base64 of the `Salted__` header; every encrypted value starts with it.
pub const ENCRYPTED_PREFIX: &str = "U2FsdGVkX1";
const SALT_HEADER: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;

const CRIMINAL_RECORD_FIELDS: &[&str] = &[
    "name",
    "phone_number",
    "email",
    "address",
    "address_line",
    "city",
    "state",
    "country",
    "nationality",
    "bio",
    "modus_operandi",
    "tools_used",
    "associates",
    "connected_criminals",
    "known_associates",
    "case_progress_timeline",
    "last_location",
];

/// Columns stored encrypted for `table`.
pub fn encrypted_fields(table: &str) -> &'static [&'static str] {
    if table == TABLE {
        CRIMINAL_RECORD_FIELDS
    } else {
        &[]
    }
}

pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// AES-256-CBC with an OpenSSL-style salted passphrase (MD5 key derivation),
/// base64 encoded. Values written by the web client decrypt here and the
/// other way round.
#[derive(Clone)]
pub struct FieldCipher {
    passphrase: String,
}

impl FieldCipher {
    pub fn new(passphrase: &str) -> Result<Self> {
        validate_min_length(ENCRYPTION_KEY_ENV, passphrase, MIN_PASSPHRASE_LEN)?;
        Ok(Self {
            passphrase: passphrase.to_string(),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.encrypt_with_salt(plaintext, rand::random())
    }

    fn encrypt_with_salt(&self, plaintext: &str, salt: [u8; SALT_LEN]) -> String {
        let (key, iv) = derive_key_iv(&self.passphrase, &salt);
        let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut payload = Vec::with_capacity(SALT_HEADER.len() + SALT_LEN + ciphertext.len());
        payload.extend_from_slice(SALT_HEADER);
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&ciphertext);
        STANDARD.encode(payload)
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let cipher_error = |message: &str| GatewayError::CipherError {
            message: message.to_string(),
        };

        let payload = STANDARD
            .decode(encoded)
            .map_err(|e| cipher_error(&e.to_string()))?;
        if payload.len() <= SALT_HEADER.len() + SALT_LEN || !payload.starts_with(SALT_HEADER) {
            return Err(cipher_error("missing salt header"));
        }

        let (salt, ciphertext) = payload[SALT_HEADER.len()..].split_at(SALT_LEN);
        let (key, iv) = derive_key_iv(&self.passphrase, salt);
        let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| cipher_error("bad padding, wrong key?"))?;

        String::from_utf8(plaintext).map_err(|_| cipher_error("plaintext is not UTF-8"))
    }

    /// Encrypts the non-empty string columns listed for `table`.
    pub fn encrypt_record(&self, table: &str, record: &Record) -> Record {
        let mut encrypted = record.clone();
        for field in encrypted_fields(table) {
            if let Some(Value::String(text)) = encrypted.data.get_mut(*field) {
                if !text.is_empty() {
                    *text = self.encrypt(text);
                }
            }
        }
        encrypted
    }

    /// Decrypts listed columns that carry the encrypted prefix. A value that
    /// fails to decrypt is returned unchanged.
    pub fn decrypt_record(&self, table: &str, mut record: Record) -> Record {
        for field in encrypted_fields(table) {
            if let Some(Value::String(text)) = record.data.get_mut(*field) {
                if !is_encrypted(text) {
                    continue;
                }
                match self.decrypt(text) {
                    Ok(plaintext) => *text = plaintext,
                    Err(e) => tracing::warn!(field = *field, "Failed to decrypt field: {}", e),
                }
            }
        }
        record
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// EVP_BytesToKey with MD5 and one round: 32 key bytes then 16 IV bytes.
fn derive_key_iv(passphrase: &str, salt: &[u8]) -> ([u8; 32], [u8; 16]) {
    let mut derived = Vec::with_capacity(48);
    let mut block: Vec<u8> = Vec::new();
    while derived.len() < 48 {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase.as_bytes());
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; 32];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&derived[..32]);
    iv.copy_from_slice(&derived[32..48]);
    (key, iv)
}

/// Store wrapper that encrypts sensitive columns on insert and decrypts
/// them on the way back. Without a cipher it passes rows through untouched.
#[derive(Debug, Clone)]
pub struct EncryptingStore<S: RecordStore> {
    inner: S,
    cipher: Option<FieldCipher>,
}

impl<S: RecordStore> EncryptingStore<S> {
    pub fn new(inner: S, cipher: Option<FieldCipher>) -> Self {
        Self { inner, cipher }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn is_encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    fn decrypt_rows(&self, table: &str, rows: RecordCollection) -> RecordCollection {
        match &self.cipher {
            Some(cipher) => rows
                .into_iter()
                .map(|row| cipher.decrypt_record(table, row))
                .collect(),
            None => rows,
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for EncryptingStore<S> {
    async fn select_all(&self, table: &str) -> Result<RecordCollection> {
        let rows = self.inner.select_all(table).await?;
        Ok(self.decrypt_rows(table, rows))
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<RecordCollection> {
        let rows = match &self.cipher {
            Some(cipher) => {
                let encrypted = cipher.encrypt_record(table, record);
                self.inner.insert(table, &encrypted).await?
            }
            None => self.inner.insert(table, record).await?,
        };
        Ok(self.decrypt_rows(table, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const PASSPHRASE: &str = "0123456789abcdef0123456789abcdef";

    /// Keeps whatever it is given, so tests can look at the stored form.
    #[derive(Clone, Default)]
    struct MemoryStore {
        rows: Arc<Mutex<Vec<Record>>>,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn select_all(&self, _table: &str) -> Result<RecordCollection> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, _table: &str, record: &Record) -> Result<RecordCollection> {
            self.rows.lock().unwrap().push(record.clone());
            Ok(vec![record.clone()])
        }
    }

    #[test]
    fn test_matches_openssl_salted_format() {
        let cipher = FieldCipher::new(PASSPHRASE).unwrap();
        let salt = [1, 2, 3, 4, 5, 6, 7, 8];

        // openssl enc -aes-256-cbc -md md5 -S 0102030405060708, with header
        let expected = "U2FsdGVkX18BAgMEBQYHCNgN+1OC1dPXRICYy31YuLg=";
        assert_eq!(cipher.encrypt_with_salt("Ravi Kumar", salt), expected);
        assert_eq!(cipher.decrypt(expected).unwrap(), "Ravi Kumar");
    }

    #[test]
    fn test_encrypt_uses_fresh_salt() {
        let cipher = FieldCipher::new(PASSPHRASE).unwrap();
        let first = cipher.encrypt("Chennai");
        let second = cipher.encrypt("Chennai");

        assert!(is_encrypted(&first));
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), "Chennai");
        assert_eq!(cipher.decrypt(&second).unwrap(), "Chennai");
    }

    #[test]
    fn test_wrong_key_fails_to_decrypt() {
        let cipher = FieldCipher::new(PASSPHRASE).unwrap();
        let other = FieldCipher::new("ffffffffffffffffffffffffffffffff").unwrap();
        let encrypted = cipher.encrypt("Ravi Kumar");

        match other.decrypt(&encrypted) {
            Err(GatewayError::CipherError { .. }) => {}
            Ok(text) => assert_ne!(text, "Ravi Kumar"),
            Err(e) => panic!("expected CipherError, got {:?}", e),
        }
        assert!(other.decrypt("not base64!").is_err());
    }

    #[test]
    fn test_short_passphrase_is_rejected() {
        assert!(matches!(
            FieldCipher::new("too-short"),
            Err(GatewayError::InvalidConfigValueError { .. })
        ));
        let rendered = format!("{:?}", FieldCipher::new(PASSPHRASE).unwrap());
        assert!(!rendered.contains(PASSPHRASE));
    }

    #[test]
    fn test_only_listed_string_fields_are_encrypted() {
        let cipher = FieldCipher::new(PASSPHRASE).unwrap();
        let record = Record::from_value(json!({
            "name": "Ravi Kumar",
            "city": "",
            "age": 34,
            "crime_type": "fraud",
            "bio": null
        }))
        .unwrap();

        let encrypted = cipher.encrypt_record(TABLE, &record);
        assert!(is_encrypted(encrypted.get_str("name").unwrap()));
        assert_eq!(encrypted.get_str("city"), Some(""));
        assert_eq!(encrypted.get_i64("age"), Some(34));
        assert_eq!(encrypted.get_str("crime_type"), Some("fraud"));
        assert_eq!(encrypted.get("bio"), Some(&Value::Null));

        assert_eq!(cipher.decrypt_record(TABLE, encrypted), record);
        assert_eq!(cipher.encrypt_record("users", &record), record);
    }

    #[test]
    fn test_undecryptable_value_is_left_as_is() {
        let cipher = FieldCipher::new(PASSPHRASE).unwrap();
        let record = Record::new().with("name", "U2FsdGVkX1garbage");

        assert_eq!(cipher.decrypt_record(TABLE, record.clone()), record);
    }

    #[tokio::test]
    async fn test_store_encrypts_at_rest() {
        let memory = MemoryStore::default();
        let store = EncryptingStore::new(memory.clone(), Some(FieldCipher::new(PASSPHRASE).unwrap()));
        let submitted = Record::new().with("name", "Ravi Kumar").with("risk_level", "high");

        let inserted = store.insert(TABLE, &submitted).await.unwrap();
        assert_eq!(inserted, vec![submitted.clone()]);

        let stored = memory.rows.lock().unwrap()[0].clone();
        assert!(is_encrypted(stored.get_str("name").unwrap()));
        assert_eq!(stored.get_str("risk_level"), Some("high"));

        assert_eq!(store.select_all(TABLE).await.unwrap(), vec![submitted]);
    }

    #[tokio::test]
    async fn test_store_without_key_passes_through() {
        let memory = MemoryStore::default();
        let store = EncryptingStore::new(memory.clone(), None);
        let submitted = Record::new().with("name", "Ravi Kumar");

        store.insert(TABLE, &submitted).await.unwrap();
        assert!(!store.is_encrypting());
        assert_eq!(memory.rows.lock().unwrap()[0], submitted);
        assert_eq!(store.select_all(TABLE).await.unwrap(), vec![submitted]);
    }
}
