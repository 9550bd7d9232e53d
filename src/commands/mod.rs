use clap::Parser;
use std::path::PathBuf;

/// CLI for combining an audio file, cue sheet and cover into a single chaptered audiobook using ffmpeg.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Audiobook file path
    #[arg(value_name = "AUDIO_FILE")]
    pub audio_file: PathBuf,

    /// Cue file path describing chapter titles and offsets
    #[arg(value_name = "CUE_FILE")]
    pub cue_file: PathBuf,

    /// Output file path, should be .mp4, .m4a or .m4b
    #[arg(value_name = "OUTPUT_FILE")]
    pub output_file: PathBuf,

    /// Cover image embedded as attached picture
    #[arg(long, short = 'c', value_name = "COVER")]
    pub cover: Option<PathBuf>,

    /// ffmpeg binary path
    #[arg(long, value_name = "FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe binary path
    #[arg(long, value_name = "FFPROBE", default_value = "ffprobe")]
    pub ffprobe: String,

    /// ffmpeg audio codec options
    #[arg(long, value_name = "AUDIO_CODEC", default_value = "copy")]
    pub audio_codec: String,

    /// ffmpeg log level
    #[arg(long, short = 'v', value_name = "FFMPEG_LOGLEVEL", default_value = "warning")]
    pub ffmpeg_loglevel: String,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,
}
