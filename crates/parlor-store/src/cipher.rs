//! AES-256-GCM envelope around the persisted history document.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// AES-GCM appends a 16-byte authentication tag to the ciphertext; the
/// on-disk format stores it as its own field.
const TAG_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// The encrypted on-disk document. All three fields are base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedDocument {
    pub nonce: String,
    pub tag: String,
    pub data: String,
}

/// Seals and opens history documents under one symmetric key.
#[derive(Clone)]
pub struct HistoryCipher {
    cipher: Aes256Gcm,
}

impl HistoryCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedDocument, StoreError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let mut ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| StoreError::Encrypt)?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(SealedDocument {
            nonce: BASE64.encode(nonce_bytes),
            tag: BASE64.encode(tag),
            data: BASE64.encode(ciphertext),
        })
    }

    /// Decrypts a sealed document, authenticating it against the tag.
    pub fn open(&self, doc: &SealedDocument) -> Result<Vec<u8>, StoreError> {
        let nonce_bytes = BASE64.decode(&doc.nonce).map_err(|_| StoreError::Decrypt)?;
        let tag = BASE64.decode(&doc.tag).map_err(|_| StoreError::Decrypt)?;
        let mut combined = BASE64.decode(&doc.data).map_err(|_| StoreError::Decrypt)?;

        if nonce_bytes.len() != NONCE_LEN || tag.len() != TAG_LEN {
            return Err(StoreError::Decrypt);
        }
        combined.extend_from_slice(&tag);

        self.cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), combined.as_slice())
            .map_err(|_| StoreError::Decrypt)
    }
}

/// Parses an operator-supplied key: exactly 64 hex characters.
pub fn key_from_hex(hex: &str) -> Result<[u8; 32], StoreError> {
    let hex = hex.trim();
    if !hex.is_ascii() || hex.len() != 64 {
        return Err(StoreError::InvalidKey(format!(
            "expected 64 hex characters, got {}",
            hex.len()
        )));
    }
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        let pair = &hex[i * 2..i * 2 + 2];
        *byte = u8::from_str_radix(pair, 16)
            .map_err(|_| StoreError::InvalidKey(format!("invalid hex at offset {}", i * 2)))?;
    }
    Ok(key)
}
