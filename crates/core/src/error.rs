use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid discussion number: {0}")]
    InvalidDiscussionNumber(String),
}
