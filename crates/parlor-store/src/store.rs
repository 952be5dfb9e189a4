//! The message store: in-memory history map plus debounced flushing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parlor_protocol::{ChatMessage, RoomId};

use crate::{HistoryCipher, SealedDocument, StoreError};

/// Maximum messages retained per room, oldest evicted first.
pub const HISTORY_CAP: usize = 100;

/// Quiet period before an append is flushed to disk. Appends landing
/// inside the window ride along in the same write.
pub const FLUSH_DEBOUNCE: Duration = Duration::from_secs(2);

type Histories = HashMap<RoomId, Vec<ChatMessage>>;

struct StoreState {
    histories: Histories,
    /// A flush task is already sleeping; don't schedule another.
    flush_scheduled: bool,
}

/// Durable copy of every room's chat history.
///
/// `append` is synchronous from the caller's point of view: it mutates
/// the in-memory map and schedules the actual write on a background
/// task, so the orchestrator's timeline never blocks on disk I/O.
pub struct MessageStore {
    path: PathBuf,
    cipher: Option<HistoryCipher>,
    state: Arc<Mutex<StoreState>>,
    /// Serializes file writes; a new flush waits out a straggler.
    write_gate: Arc<tokio::sync::Mutex<()>>,
    debounce: Duration,
}

impl MessageStore {
    /// Loads history from `path`. Never fails: a missing file, an
    /// encrypted document without a configured key, or a corrupt/
    /// undecryptable document all degrade to empty history (logged).
    pub async fn load(path: impl Into<PathBuf>, key: Option<[u8; 32]>) -> Self {
        let path = path.into();
        let cipher = key.map(|k| HistoryCipher::new(&k));

        let histories = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_document(&bytes, cipher.as_ref()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no history file yet");
                Histories::new()
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read history file, starting empty"
                );
                Histories::new()
            }
        };

        let rooms = histories.len();
        if rooms > 0 {
            tracing::info!(rooms, encrypted = cipher.is_some(), "chat history loaded");
        }

        Self {
            path,
            cipher,
            state: Arc::new(Mutex::new(StoreState {
                histories,
                flush_scheduled: false,
            })),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            debounce: FLUSH_DEBOUNCE,
        }
    }

    /// Overrides the debounce window. Test knob.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Records a message and schedules a debounced flush.
    pub fn append(&self, room_id: &RoomId, message: ChatMessage) {
        let schedule = {
            let mut state = self.state.lock().expect("store state lock poisoned");
            let history = state.histories.entry(room_id.clone()).or_default();
            history.push(message);
            if history.len() > HISTORY_CAP {
                let excess = history.len() - HISTORY_CAP;
                history.drain(..excess);
            }
            let schedule = !state.flush_scheduled;
            state.flush_scheduled = true;
            schedule
        };

        if schedule {
            self.spawn_flush(self.debounce);
        }
    }

    /// Flushes immediately, bypassing the debounce. Used on shutdown
    /// and in tests.
    pub async fn flush_now(&self) {
        let payload = self.snapshot();
        write_document(&self.path, self.cipher.as_ref(), payload, &self.write_gate).await;
    }

    /// The stored history for one room, oldest first.
    pub fn history(&self, room_id: &RoomId) -> Vec<ChatMessage> {
        let state = self.state.lock().expect("store state lock poisoned");
        state.histories.get(room_id).cloned().unwrap_or_default()
    }

    /// Number of rooms with stored history (live or orphaned).
    pub fn room_count(&self) -> usize {
        let state = self.state.lock().expect("store state lock poisoned");
        state.histories.len()
    }

    fn spawn_flush(&self, delay: Duration) {
        let state = Arc::clone(&self.state);
        let write_gate = Arc::clone(&self.write_gate);
        let path = self.path.clone();
        let cipher = self.cipher.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let payload = {
                let mut state = state.lock().expect("store state lock poisoned");
                state.flush_scheduled = false;
                serde_json::to_vec(&state.histories)
            };
            match payload {
                Ok(json) => {
                    write_document(&path, cipher.as_ref(), json, &write_gate).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize history");
                }
            }
        });
    }

    fn snapshot(&self) -> Vec<u8> {
        let mut state = self.state.lock().expect("store state lock poisoned");
        state.flush_scheduled = false;
        serde_json::to_vec(&state.histories).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize history");
            b"{}".to_vec()
        })
    }
}

/// Writes one document, sealed if a cipher is configured. Failures are
/// logged; in-memory state is unaffected and the next append retries.
async fn write_document(
    path: &PathBuf,
    cipher: Option<&HistoryCipher>,
    json: Vec<u8>,
    write_gate: &tokio::sync::Mutex<()>,
) {
    let bytes = match cipher {
        Some(cipher) => match cipher.seal(&json).and_then(|doc| {
            serde_json::to_vec(&doc).map_err(StoreError::Serialize)
        }) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to seal history document");
                return;
            }
        },
        None => json,
    };

    let _guard = write_gate.lock().await;
    if let Err(e) = tokio::fs::write(path, &bytes).await {
        tracing::error!(path = %path.display(), error = %e, "failed to write history file");
    }
}

/// Parses a history document, degrading to empty on any failure.
fn parse_document(bytes: &[u8], cipher: Option<&HistoryCipher>) -> Histories {
    if bytes.is_empty() {
        return Histories::new();
    }

    // An encrypted document parses as the envelope struct; a plaintext
    // one is the bare room map and falls through.
    if let Ok(doc) = serde_json::from_slice::<SealedDocument>(bytes) {
        let Some(cipher) = cipher else {
            tracing::warn!("history file is encrypted but no key is configured, starting empty");
            return Histories::new();
        };
        return match cipher.open(&doc) {
            Ok(plain) => parse_map(&plain),
            Err(e) => {
                tracing::error!(error = %e, "failed to decrypt history, starting empty");
                Histories::new()
            }
        };
    }

    parse_map(bytes)
}

fn parse_map(bytes: &[u8]) -> Histories {
    match serde_json::from_slice(bytes) {
        Ok(map) => map,
        Err(e) => {
            tracing::error!(error = %e, "history document is malformed, starting empty");
            Histories::new()
        }
    }
}
