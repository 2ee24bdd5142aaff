//! Error types for rsinit

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Server error code returned by `replSetInitiate` on an already formed set
pub const ALREADY_INITIALIZED_CODE: i32 = 23;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Readiness Errors ===
    #[error("Target {target} unreachable after {attempts} attempts")]
    UnreachableTarget { target: String, attempts: u32 },

    #[error("Not ready: {0}")]
    NotReady(String),

    // === Formation Errors ===
    #[error("Invalid cluster descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Formation failed: {0}")]
    Formation(Box<Error>),

    // === Load Errors ===
    #[error("Load of dataset '{dataset}' failed ({attempted} records attempted): {reason}")]
    Load {
        dataset: String,
        attempted: usize,
        reason: String,
    },

    #[error("Malformed record {index} in dataset '{dataset}': {reason}")]
    MalformedRecord {
        dataset: String,
        index: usize,
        reason: String,
    },

    // === Database Errors ===
    #[error("Command failed ({code_name} {code}): {message}")]
    Command {
        code: i32,
        code_name: String,
        message: String,
    },

    #[error("MongoDB error: {0}")]
    Mongo(mongodb::error::Error),

    #[error("BSON error: {0}")]
    Bson(String),

    #[error("Operation timeout: {0}")]
    Timeout(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Does this error say the replica set already has a configuration?
    pub fn is_already_formed(&self) -> bool {
        match self {
            Error::Command {
                code,
                code_name,
                message,
            } => {
                *code == ALREADY_INITIALIZED_CODE
                    || code_name == "AlreadyInitialized"
                    || mentions_existing_config(message)
            }
            Error::Formation(inner) => inner.is_already_formed(),
            _ => false,
        }
    }

    /// Process exit code for a failed run
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UnreachableTarget { .. } => 2,
            Error::InvalidConfig(_) | Error::Config(_) | Error::InvalidDescriptor(_) => 64,
            _ => 1,
        }
    }
}

fn mentions_existing_config(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("already initialized") || message.contains("already has a configuration")
}

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Self {
        match e.kind.as_ref() {
            mongodb::error::ErrorKind::Command(cmd) => Error::Command {
                code: cmd.code,
                code_name: cmd.code_name.clone(),
                message: cmd.message.clone(),
            },
            _ => Error::Mongo(e),
        }
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        Error::Bson(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for Error {
    fn from(e: mongodb::bson::de::Error) -> Self {
        Error::Bson(e.to_string())
    }
}
