//! Playback queue value types

use kiez_common::{Error, Track, TrackId};
use serde::{Deserialize, Serialize};

/// Repeat policy applied when navigation runs off the end of the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    None,
    /// Loop the current track. Handled by the audio element, not by
    /// `play_next`, which treats it like `None`.
    One,
    /// Wrap from the last track to the first
    All,
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatMode::None => write!(f, "none"),
            RepeatMode::One => write!(f, "one"),
            RepeatMode::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RepeatMode::None),
            "one" => Ok(RepeatMode::One),
            "all" => Ok(RepeatMode::All),
            other => Err(Error::InvalidInput(format!("Unknown repeat mode: {}", other))),
        }
    }
}

/// Read-only view of the queue state for the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub current_song: Option<Track>,
    pub is_playing: bool,
    pub queue: Vec<Track>,
    pub history: Vec<TrackId>,
    /// Ids played at least once, sorted for stable output
    pub played_history: Vec<TrackId>,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
}
