use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error("Malformed cue sheet line: {0}")]
    MalformedLine(String),

    #[error("Invalid INDEX time format: {0}")]
    InvalidIndexFormat(String),
}

pub type CueResult<T> = Result<T, CueError>;
