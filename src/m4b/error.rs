use crate::m4b::cue::error::CueError;
use crate::m4b::ffmpeg::error::FfmpegError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum M4bError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    FfmpegError(#[from] FfmpegError),

    #[error("Output file should be .mp4, .m4a or .m4b: {0}")]
    UnsupportedOutputExtension(PathBuf),

    #[error("Output file already exists, use --force to overwrite")]
    OutputFileAlreadyExists,
}

pub type M4bResult<T> = Result<T, M4bError>;
