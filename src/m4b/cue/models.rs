/// Minimum representation of a cue sheet required to produce chapter metadata.
#[derive(Debug, Clone)]
pub struct CueSheet {
    pub title: String,
    pub artist: String,
    pub tracks: Vec<CueTrack>,
}

/// One track of a cue sheet. Times are seconds from the start of the audio;
/// a missing end time means the track runs to an unknown point.
#[derive(Debug, Clone)]
pub struct CueTrack {
    pub title: String,
    pub start: f64,
    pub end: Option<f64>,
}
