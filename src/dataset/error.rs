use crate::model::Key;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("identity is required but missing")]
    MissingIdentity,

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Multiple items found ({count}): {filter}")]
    Ambiguous { filter: String, count: usize },

    #[error("The data must be an array")]
    NotAnArray,

    #[error("Record at position {0} is not an object")]
    NotAnObject(usize),

    #[error("Record at position {0} has no identity")]
    Unidentifiable(usize),

    #[error("Duplicate identity: {0}")]
    DuplicateKey(Key),

    #[error("Record {0} is replaced more than once")]
    DuplicateTarget(Key),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
