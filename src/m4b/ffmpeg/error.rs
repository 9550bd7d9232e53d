use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FfmpegError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Could not run {0}, is it installed and on your PATH?")]
    BinaryNotFound(String),

    #[error("ffprobe exited with {0} while reading the audio duration")]
    DurationProbeFailed(ExitStatus),

    #[error("Could not parse ffprobe duration output: {0}")]
    InvalidDurationOutput(String),

    #[error("ffmpeg exited with {0}")]
    TranscodeFailed(ExitStatus),
}

pub type FfmpegResult<T> = Result<T, FfmpegError>;
