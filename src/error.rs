use thiserror::Error;

/// Main error type for anekdex operations
#[derive(Error, Debug)]
pub enum AnekdexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("MessagePack encode error: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),

    #[error("Protobuf decode error: {0}")]
    ProtobufDecode(#[from] prost::DecodeError),

    #[error("Object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(&'static str),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Snapshot error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for anekdex operations
pub type Result<T> = std::result::Result<T, AnekdexError>;

impl AnekdexError {
    /// Whether this error must stop the process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnekdexError::MissingCredentials(_))
    }
}
