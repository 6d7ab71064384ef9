use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum FissionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Other error: {0}")]
    Other(String),
}
