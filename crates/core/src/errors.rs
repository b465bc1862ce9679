use thiserror::Error;

/// Unified error type for the entire wishlist-savings-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The `Display` output doubles as the user-facing message.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ──────────────────────────────────────────────────
    #[error("Invalid savings amount: {0} (must be greater than zero)")]
    InvalidAmount(i64),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── Invariant guards ────────────────────────────────────────────
    #[error("Cannot delete the last wishlist: at least one must remain")]
    LastWishlist,

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File storage (native only) ──────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
