use crate::commands::Cli;
use crate::m4b::cue::parse_cue_sheet;
use crate::m4b::error::{M4bError, M4bResult};
use crate::m4b::ffmpeg::{Transcode, probe_duration, run_transcode};
use crate::m4b::metadata::render_ffmetadata;
use indicatif::MultiProgress;
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use tokio::fs;

pub mod cue;
pub mod error;
pub mod ffmpeg;
pub mod metadata;

/// Output container formats that can hold chapter metadata.
const OUTPUT_EXTENSIONS: [&str; 3] = ["mp4", "m4a", "m4b"];

/// Combines the audio file, cue sheet and optional cover named by `cli` into
/// a single chaptered output file.
pub async fn bind_to_m4b(pb: MultiProgress, cli: Cli) -> M4bResult<()> {
    if !has_supported_extension(&cli.output_file) {
        return Err(M4bError::UnsupportedOutputExtension(cli.output_file));
    }

    // Check if output exists
    if fs::metadata(&cli.output_file).await.is_ok() && !cli.force {
        return Err(M4bError::OutputFileAlreadyExists);
    }

    debug!("Probing audio duration: {:?}", cli.audio_file);
    let duration = probe_duration(&cli.ffprobe, &cli.audio_file).await?;
    debug!("Audio duration: {duration}s");

    debug!("Parsing CUE file: {:?}", cli.cue_file);
    let cue_text = fs::read_to_string(&cli.cue_file).await?;
    let cue_sheet = parse_cue_sheet(&cue_text, Some(duration))?;
    debug!("Parsed {} tracks", cue_sheet.tracks.len());

    let document = render_ffmetadata(&cue_sheet);

    // The handle has to outlive the ffmpeg run; dropping it removes the file
    let mut metadata_file = tempfile::Builder::new()
        .prefix("ffmpeg_meta_")
        .suffix(".ini")
        .tempfile()?;
    metadata_file.write_all(document.as_bytes())?;
    metadata_file.flush()?;

    debug!("Wrote chapter metadata to: {:?}", metadata_file.path());

    let job = Transcode {
        ffmpeg: &cli.ffmpeg,
        audio_file: &cli.audio_file,
        metadata_file: metadata_file.path(),
        cover: cli.cover.as_deref(),
        audio_codec: &cli.audio_codec,
        loglevel: &cli.ffmpeg_loglevel,
        overwrite: cli.force,
        output_file: &cli.output_file,
    };

    if let Err(err) = run_transcode(&pb, &job, duration).await {
        // ffmpeg can leave a partial output behind when it dies mid-write
        let _ = fs::remove_file(&cli.output_file).await;
        return Err(err.into());
    }

    info!("Finished writing {}", cli.output_file.display());
    Ok(())
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| OUTPUT_EXTENSIONS.contains(&extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaptered_container_extensions_are_accepted() {
        assert!(has_supported_extension(Path::new("book.m4b")));
        assert!(has_supported_extension(Path::new("book.m4a")));
        assert!(has_supported_extension(Path::new("out/book.mp4")));
    }

    #[test]
    fn other_extensions_are_rejected() {
        assert!(!has_supported_extension(Path::new("book.mp3")));
        assert!(!has_supported_extension(Path::new("book.mkv")));
        assert!(!has_supported_extension(Path::new("book")));
    }
}
