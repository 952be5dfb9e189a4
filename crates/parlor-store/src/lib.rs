//! Durable chat history, keyed by room id.
//!
//! One JSON document on disk holds every room's message history. When a
//! 32-byte key is configured the document is wrapped in an AES-256-GCM
//! envelope (base64 nonce, tag, and ciphertext); without one it is
//! plaintext. Loading fails safe: a missing file, an encrypted document
//! with no key, or a failed decryption all degrade to empty history
//! rather than aborting startup.
//!
//! Writes are debounced — the first append schedules a flush a couple
//! of seconds out, and further appends inside that window ride along in
//! the same write.

mod cipher;
mod error;
mod store;

pub use cipher::{HistoryCipher, SealedDocument, key_from_hex};
pub use error::StoreError;
pub use store::{FLUSH_DEBOUNCE, HISTORY_CAP, MessageStore};
