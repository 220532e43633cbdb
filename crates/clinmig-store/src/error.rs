use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),
    #[error("tls error: {0}")]
    Tls(#[from] native_tls::Error),
    #[error("invalid connection descriptor: {0}")]
    Config(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}
