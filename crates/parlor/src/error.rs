//! Top-level error type for the server binary and accept loop.

/// Errors that can stop the server from starting or running.
///
/// Everything that happens after a connection is established is
/// handled per-connection (logged and dropped), so only startup-level
/// failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// Binding or accepting on the listen socket failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configured history key was rejected.
    #[error(transparent)]
    Store(#[from] parlor_store::StoreError),
}
