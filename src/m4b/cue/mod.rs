use crate::m4b::cue::error::{CueError, CueResult};
use crate::m4b::cue::models::{CueSheet, CueTrack};
use std::collections::HashMap;

pub mod error;
pub mod models;

/// Red Book frames per second, the smallest unit of an INDEX timestamp.
const FRAMES_PER_SECOND: f64 = 75.0;

/// Parses cue sheet text into a [`CueSheet`].
///
/// `total_duration` is the length of the audio in seconds and closes the
/// final track; without it the last track's end stays unknown.
pub fn parse_cue_sheet(text: &str, total_duration: Option<f64>) -> CueResult<CueSheet> {
    let (header, track_records) = split_cue_text(text)?;

    let title = strip_quotes(header.get("TITLE").map_or("", String::as_str));
    let artist = strip_quotes(header.get("PERFORMER").map_or("", String::as_str));

    let mut starts = Vec::with_capacity(track_records.len());
    let mut titles = Vec::with_capacity(track_records.len());

    // A track without its own INDEX reuses the previous track's offset
    let mut offset = 0.0;
    for record in &track_records {
        if let Some(index) = record.get("INDEX") {
            offset = parse_index_offset(index)?;
        }
        starts.push(offset);
        titles.push(strip_quotes(record.get("TITLE").map_or("", String::as_str)));
    }

    let tracks = titles
        .into_iter()
        .enumerate()
        .map(|(i, title)| CueTrack {
            title,
            start: starts[i],
            end: starts.get(i + 1).copied().or(total_duration),
        })
        .collect();

    Ok(CueSheet {
        title,
        artist,
        tracks,
    })
}

type Record = HashMap<String, String>;

/// Splits cue sheet text into one header record and an ordered list of track
/// records. Every non-blank line is `KEY rest-of-line`; a `TRACK` key closes
/// the record accumulated so far and opens the next one. A key repeated
/// within a record overwrites the earlier value, which also makes the last
/// INDEX line of a track the one that counts.
fn split_cue_text(text: &str) -> CueResult<(Record, Vec<Record>)> {
    let mut header = Record::new();
    let mut tracks = Vec::new();
    let mut current: Option<Record> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| CueError::MalformedLine(line.to_string()))?;
        let value = value.trim_start();

        if key == "TRACK" {
            if let Some(record) = current.take() {
                tracks.push(record);
            }
            current = Some(Record::from([(key.to_string(), value.to_string())]));
        } else if let Some(record) = &mut current {
            record.insert(key.to_string(), value.to_string());
        } else {
            header.insert(key.to_string(), value.to_string());
        }
    }

    if let Some(record) = current.take() {
        tracks.push(record);
    }

    Ok((header, tracks))
}

/// Computes a start offset in seconds from an INDEX value. Only the last
/// whitespace token is read, so the index number is skipped; the token is
/// `minutes[:seconds[:frames]]`.
fn parse_index_offset(value: &str) -> CueResult<f64> {
    let time = value
        .split_whitespace()
        .next_back()
        .ok_or_else(|| CueError::InvalidIndexFormat(value.to_string()))?;

    let mut offset = 0.0;
    for (position, field) in time.split(':').take(3).enumerate() {
        let number = field
            .parse::<u32>()
            .map_err(|_| CueError::InvalidIndexFormat(value.to_string()))?;

        offset += match position {
            0 => f64::from(number) * 60.0,
            1 => f64::from(number),
            _ => f64::from(number) / FRAMES_PER_SECOND,
        };
    }

    Ok(offset)
}

/// Strips one layer of surrounding double quotes, if present on both ends.
fn strip_quotes(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
