use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiasseError {
    #[error("Invalid trial balance entry for account {account}: {details}")]
    InvalidEntry { account: String, details: String },

    #[error("Unknown statement family: {0}")]
    UnknownFamily(String),

    #[error("Invalid tolerance configuration: {0}")]
    InvalidTolerance(String),

    #[error("Invalid exercise period: {0}")]
    InvalidPeriod(String),

    #[error("Account mapping table is inconsistent: {0}")]
    MappingConflict(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LiasseError>;
