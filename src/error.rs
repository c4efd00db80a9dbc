// ===============================
// src/error.rs
// ===============================
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid config {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error(
        "{table}: requested {requested} unique rows but key space allows at most {allowed} (size {key_space})"
    )]
    KeySpace {
        table: &'static str,
        requested: usize,
        allowed: usize,
        key_space: u64,
    },

    #[error("{table}: row has {got} fields, header has {expected}")]
    Arity {
        table: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("payload serialize error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("metrics encode error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl GenError {
    pub fn config(key: &'static str, reason: impl Into<String>) -> Self {
        GenError::Config { key, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
