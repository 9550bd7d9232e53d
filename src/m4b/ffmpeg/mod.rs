use crate::m4b::ffmpeg::error::{FfmpegError, FfmpegResult};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

pub mod error;

/// Inputs for one chapter-binding ffmpeg run.
#[derive(Debug)]
pub struct Transcode<'a> {
    pub ffmpeg: &'a str,
    pub audio_file: &'a Path,
    pub metadata_file: &'a Path,
    pub cover: Option<&'a Path>,
    pub audio_codec: &'a str,
    pub loglevel: &'a str,
    pub overwrite: bool,
    pub output_file: &'a Path,
}

/// Reads the total duration of an audio file in seconds via ffprobe.
pub async fn probe_duration(ffprobe: &str, audio_file: &Path) -> FfmpegResult<f64> {
    let args = build_probe_args(audio_file);
    debug!("Running {ffprobe} {args:?}");

    let output = Command::new(ffprobe)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .await
        .map_err(|err| binary_error(ffprobe, err))?;

    if !output.status.success() {
        return Err(FfmpegError::DurationProbeFailed(output.status));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| FfmpegError::InvalidDurationOutput(stdout.trim().to_string()))
}

/// Runs ffmpeg to mux the audio, chapter metadata and optional cover into
/// the output container, rendering a progress bar from the stats ffmpeg
/// reports on stderr.
pub async fn run_transcode(
    pb: &MultiProgress,
    job: &Transcode<'_>,
    total_duration: f64,
) -> FfmpegResult<()> {
    let args = build_transcode_args(job);
    debug!("Running {} {args:?}", job.ffmpeg);

    let mut child = Command::new(job.ffmpeg)
        .args(&args)
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| binary_error(job.ffmpeg, err))?;

    let bar = pb.add(ProgressBar::new((total_duration * 1000.0) as u64));
    let template_result = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40}] {percent}% {msg}");
    bar.set_style(template_result.unwrap_or_else(|_| ProgressStyle::default_bar()));

    if let Some(stderr) = child.stderr.take() {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();

        // Stats lines are terminated with a carriage return, everything else
        // with a newline, so the stream is drained chunk-wise up to each CR
        loop {
            buf.clear();
            if reader.read_until(b'\r', &mut buf).await? == 0 {
                break;
            }

            for piece in String::from_utf8_lossy(&buf).split(['\r', '\n']) {
                let piece = piece.trim();
                if piece.is_empty() {
                    continue;
                }

                match parse_progress_seconds(piece) {
                    Some(seconds) => bar.set_position((seconds * 1000.0) as u64),
                    // Stats line without a readable timestamp, e.g. time=N/A
                    None if piece.contains("time=") => {}
                    None => warn!("{}: {piece}", job.ffmpeg),
                }
            }
        }
    }

    let status = child.wait().await?;
    bar.finish_and_clear();

    if !status.success() {
        return Err(FfmpegError::TranscodeFailed(status));
    }

    Ok(())
}

fn build_probe_args(audio_file: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        audio_file.to_string_lossy().to_string(),
    ]
}

fn build_transcode_args(job: &Transcode<'_>) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        job.audio_file.to_string_lossy().to_string(),
        "-i".to_string(),
        job.metadata_file.to_string_lossy().to_string(),
    ];

    if let Some(cover) = job.cover {
        // The cover is mapped first, so output stream 0 is the one carrying
        // the attached_pic disposition
        args.extend([
            "-i".to_string(),
            cover.to_string_lossy().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "2".to_string(),
            "-disposition:0".to_string(),
            "attached_pic".to_string(),
        ]);
    }

    if job.overwrite {
        args.push("-y".to_string());
    }

    args.extend([
        "-c:a".to_string(),
        job.audio_codec.to_string(),
        "-map".to_string(),
        "0".to_string(),
        "-map_metadata".to_string(),
        "1".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        job.output_file.to_string_lossy().to_string(),
        "-stats".to_string(),
        "-loglevel".to_string(),
        job.loglevel.to_string(),
    ]);

    args
}

fn binary_error(binary: &str, err: std::io::Error) -> FfmpegError {
    if err.kind() == ErrorKind::NotFound {
        FfmpegError::BinaryNotFound(binary.to_string())
    } else {
        FfmpegError::IoError(err)
    }
}

/// Extracts the elapsed seconds from an ffmpeg stats line such as
/// `size=1024kB time=00:01:23.45 bitrate=64.0kbits/s speed=2.0x`.
fn parse_progress_seconds(line: &str) -> Option<f64> {
    let rest = &line[line.find("time=")? + "time=".len()..];
    let timestamp = rest.split_whitespace().next()?;

    let mut fields = timestamp.split(':');
    let hours: f64 = fields.next()?.parse().ok()?;
    let minutes: f64 = fields.next()?.parse().ok()?;
    let seconds: f64 = fields.next()?.parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job<'a>(cover: Option<&'a Path>, overwrite: bool) -> Transcode<'a> {
        Transcode {
            ffmpeg: "ffmpeg",
            audio_file: Path::new("book.mp3"),
            metadata_file: Path::new("/tmp/ffmpeg_meta_x.ini"),
            cover,
            audio_codec: "copy",
            loglevel: "warning",
            overwrite,
            output_file: Path::new("book.m4b"),
        }
    }

    #[test]
    fn probe_args_request_the_bare_duration() {
        assert_eq!(
            build_probe_args(Path::new("book.mp3")),
            [
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                "book.mp3",
            ]
        );
    }

    #[test]
    fn transcode_args_without_cover() {
        assert_eq!(
            build_transcode_args(&job(None, false)),
            [
                "-i",
                "book.mp3",
                "-i",
                "/tmp/ffmpeg_meta_x.ini",
                "-c:a",
                "copy",
                "-map",
                "0",
                "-map_metadata",
                "1",
                "-f",
                "mp4",
                "book.m4b",
                "-stats",
                "-loglevel",
                "warning",
            ]
        );
    }

    #[test]
    fn transcode_args_map_the_cover_as_attached_picture() {
        let args = build_transcode_args(&job(Some(Path::new("cover.jpg")), false));

        let cover_args: Vec<&str> = args[4..12].iter().map(String::as_str).collect();
        assert_eq!(
            cover_args,
            [
                "-i",
                "cover.jpg",
                "-c:v",
                "copy",
                "-map",
                "2",
                "-disposition:0",
                "attached_pic",
            ]
        );
    }

    #[test]
    fn overwrite_adds_the_yes_flag_before_the_codec() {
        let args = build_transcode_args(&job(None, true));
        let yes = args.iter().position(|arg| arg == "-y").unwrap();
        let codec = args.iter().position(|arg| arg == "-c:a").unwrap();
        assert!(yes < codec);

        let args = build_transcode_args(&job(None, false));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn progress_seconds_come_from_the_time_field() {
        let line = "size=1024kB time=00:01:23.45 bitrate=64.0kbits/s speed=2.0x";
        let seconds = parse_progress_seconds(line).unwrap();
        assert!((seconds - 83.45).abs() < 1e-9);

        let line = "frame=0 time=01:30:00.00 bitrate=N/A";
        assert_eq!(parse_progress_seconds(line), Some(5400.0));
    }

    #[test]
    fn lines_without_a_readable_time_yield_no_progress() {
        assert_eq!(parse_progress_seconds("size=0kB time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_seconds("Output #0, mp4, to 'book.m4b':"), None);
    }
}
