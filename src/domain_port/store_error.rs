#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("store backend error: {0}")]
    Backend(String),
}
