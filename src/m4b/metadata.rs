use crate::m4b::cue::models::CueSheet;

/// Signature ffmpeg requires on the first line of a metadata document.
const FFMETADATA_SIGNATURE: &str = ";FFMETADATA1";

/// Renders a [`CueSheet`] as an ffmetadata document with one `[CHAPTER]`
/// block per track on a 1/1000 timebase.
///
/// Track offsets must be non-negative seconds; a sheet violating that
/// renders a garbage document rather than failing.
pub fn render_ffmetadata(sheet: &CueSheet) -> String {
    let mut document = format!("{FFMETADATA_SIGNATURE}\n");

    if !sheet.title.is_empty() {
        document.push_str(&format!("title={}\n", escape_value(&sheet.title)));
    }
    if !sheet.artist.is_empty() {
        document.push_str(&format!("artist={}\n", escape_value(&sheet.artist)));
    }

    for track in &sheet.tracks {
        document.push_str("[CHAPTER]\nTIMEBASE=1/1000\n");
        document.push_str(&format!("START={}\n", (track.start * 1000.0) as i64));

        // An unknown end makes a zero-length chapter instead of an error
        let end = track.end.unwrap_or(track.start);
        document.push_str(&format!("END={}\n", (end * 1000.0) as i64));

        if !track.title.is_empty() {
            document.push_str(&format!("title={}\n", escape_value(&track.title)));
        }
    }

    document
}

/// Prefixes `\`, `=`, `;` and `#` with a backslash. A single pass, so the
/// escaping backslash itself is never re-escaped.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '\\' | '=' | ';' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
