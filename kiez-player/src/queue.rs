//! Playback Queue
//!
//! Tracks the current track and navigates the queue.
//!
//! State:
//! - `queue`: playback order, replaced wholesale by `set_queue`
//! - `current_track_id`: not hard-linked to `queue`; the track may have been
//!   removed since it started, in which case `current_song()` is `None`
//! - `history`: append-only, one entry per play, repeats included
//! - `played`: every id ever played this session, never shrinks
//!
//! Navigation is asymmetric: `play_next` wraps under `RepeatMode::All`,
//! `play_previous` never wraps.

use crate::types::{QueueSnapshot, RepeatMode};
use kiez_common::{Track, TrackId};
use std::collections::HashSet;
use tracing::debug;

/// Playback queue state machine
///
/// Initial state: empty queue, nothing current, not playing. "Stopped"
/// (`current_track_id == None`, `is_playing == false`) is reachable and
/// re-enterable; there is no terminal state.
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    queue: Vec<Track>,
    current_track_id: Option<TrackId>,
    history: Vec<TrackId>,
    played: HashSet<TrackId>,
    is_playing: bool,
    repeat_mode: RepeatMode,
    /// Stored for the UI; navigation does not read it yet
    shuffle: bool,
}

impl PlaybackQueue {
    /// Create new empty playback queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue
    ///
    /// Current track, playing flag and history are untouched. A current track
    /// missing from the new queue is NOT treated as deleted; callers that want
    /// that must call `handle_song_deleted`.
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        debug!(len = tracks.len(), "Queue replaced");
        self.queue = tracks;
    }

    /// Start playing `track`
    ///
    /// Always succeeds; the track does not have to be in the queue.
    pub fn play_track(&mut self, track: &Track) {
        debug!(track_id = %track.id, title = %track.title, "Playing track");
        self.current_track_id = Some(track.id.clone());
        self.is_playing = true;
        self.history.push(track.id.clone());
        self.played.insert(track.id.clone());
    }

    /// Advance to the next selectable track
    ///
    /// Scans forward from the current position (from the start if the current
    /// track is not in the queue). Under `RepeatMode::All` wraps to the first
    /// track. Stops playback when nothing is left; queue and history are kept.
    pub fn play_next(&mut self) {
        let index = self.position_of_current();
        self.advance_from(index);
    }

    /// Go back to the previous selectable track
    ///
    /// No-op when the current track is first, absent, or nothing earlier is
    /// selectable. Never wraps.
    pub fn play_previous(&mut self) {
        let Some(index) = self.position_of_current() else {
            return;
        };

        let previous = self.queue[..index]
            .iter()
            .rev()
            .find(|track| self.is_selectable(track))
            .cloned();

        if let Some(track) = previous {
            self.play_track(&track);
        }
    }

    /// Flip the playing flag
    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
        debug!(is_playing = self.is_playing, "Toggled playback");
    }

    /// React to a track deleted from the library
    ///
    /// If it is the current track, a replacement is chosen with the
    /// `play_next` rules BEFORE the track is removed, while its position is
    /// still known. Then every entry with that id leaves the queue.
    pub fn handle_song_deleted(&mut self, song_id: &TrackId) {
        if self.current_track_id.as_ref() == Some(song_id) {
            let index = self.queue.iter().position(|track| &track.id == song_id);
            self.advance_from(index);
        }

        let before = self.queue.len();
        self.queue.retain(|track| &track.id != song_id);
        debug!(track_id = %song_id, removed = before - self.queue.len(), "Song deleted");
    }

    /// True if `song_id` was played at least once this session
    pub fn is_played(&self, song_id: &TrackId) -> bool {
        self.played.contains(song_id)
    }

    /// Whether navigation may land on `track`
    ///
    /// Both scan directions go through this predicate. Today a track is
    /// selectable while an entry with its id is still queued.
    pub fn is_selectable(&self, track: &Track) -> bool {
        self.queue.iter().any(|queued| queued.id == track.id)
    }

    /// Currently playing track, `None` if stopped or no longer queued
    pub fn current_song(&self) -> Option<&Track> {
        let id = self.current_track_id.as_ref()?;
        self.queue.iter().find(|track| &track.id == id)
    }

    pub fn current_track_id(&self) -> Option<&TrackId> {
        self.current_track_id.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn history(&self) -> &[TrackId] {
        &self.history
    }

    pub fn played_history(&self) -> &HashSet<TrackId> {
        &self.played
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        debug!(%mode, "Repeat mode changed");
        self.repeat_mode = mode;
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Store the shuffle flag
    ///
    /// Navigation order is unaffected: whether shuffle should randomize
    /// `play_next`/`play_previous` is an open product question.
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    /// Owned copy of the observable state
    pub fn snapshot(&self) -> QueueSnapshot {
        let mut played_history: Vec<TrackId> = self.played.iter().cloned().collect();
        played_history.sort();

        QueueSnapshot {
            current_song: self.current_song().cloned(),
            is_playing: self.is_playing,
            queue: self.queue.clone(),
            history: self.history.clone(),
            played_history,
            repeat_mode: self.repeat_mode,
            shuffle: self.shuffle,
        }
    }

    fn position_of_current(&self) -> Option<usize> {
        let id = self.current_track_id.as_ref()?;
        self.queue.iter().position(|track| &track.id == id)
    }

    /// Play the first selectable track after `index`, wrap, or stop
    fn advance_from(&mut self, index: Option<usize>) {
        match self.find_next_selectable(index) {
            Some(track) => self.play_track(&track),
            None => self.stop(),
        }
    }

    /// `index == None` scans from the first track
    fn find_next_selectable(&self, index: Option<usize>) -> Option<Track> {
        let start = index.map_or(0, |i| i + 1);

        let forward = self
            .queue
            .iter()
            .skip(start)
            .find(|track| self.is_selectable(track));
        if let Some(track) = forward {
            return Some(track.clone());
        }

        if self.repeat_mode == RepeatMode::All {
            return self
                .queue
                .iter()
                .find(|track| self.is_selectable(track))
                .cloned();
        }

        None
    }

    fn stop(&mut self) {
        debug!("End of queue, playback stopped");
        self.is_playing = false;
        self.current_track_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_track(id: &str) -> Track {
        Track::new(id, format!("Title {}", id), "Artist").with_source_path(format!("{}.wav", id))
    }

    fn queue_of(ids: &[&str]) -> PlaybackQueue {
        let mut queue = PlaybackQueue::new();
        queue.set_queue(ids.iter().map(|id| create_test_track(id)).collect());
        queue
    }

    fn id(s: &str) -> TrackId {
        TrackId::from(s)
    }

    #[test]
    fn test_playback_queue_creation() {
        let queue = PlaybackQueue::new();
        assert!(queue.queue().is_empty());
        assert!(queue.current_track_id().is_none());
        assert!(queue.current_song().is_none());
        assert!(!queue.is_playing());
        assert_eq!(queue.repeat_mode(), RepeatMode::None);
        assert!(!queue.shuffle());
    }

    #[test]
    fn test_set_queue_keeps_playback_state() {
        let mut queue = queue_of(&["a", "b"]);
        queue.play_track(&create_test_track("a"));

        queue.set_queue(vec![create_test_track("c")]);

        assert_eq!(queue.current_track_id(), Some(&id("a")));
        assert!(queue.is_playing());
        assert_eq!(queue.history(), &[id("a")]);
        // Current track no longer queued: degrades to nothing playing on read
        assert!(queue.current_song().is_none());
    }

    #[test]
    fn test_play_track_outside_queue() {
        let mut queue = queue_of(&["a"]);
        queue.play_track(&create_test_track("z"));

        assert_eq!(queue.current_track_id(), Some(&id("z")));
        assert!(queue.is_playing());
        assert!(queue.is_played(&id("z")));
        assert!(queue.current_song().is_none());
    }

    #[test]
    fn test_play_next_without_current_starts_at_first() {
        let mut queue = queue_of(&["a", "b"]);
        queue.play_next();
        assert_eq!(queue.current_song().unwrap().id, id("a"));
    }

    #[test]
    fn test_play_next_on_empty_queue_stops() {
        let mut queue = PlaybackQueue::new();
        queue.set_repeat_mode(RepeatMode::All);
        queue.play_next();
        assert!(queue.current_track_id().is_none());
        assert!(!queue.is_playing());
    }

    #[test]
    fn test_repeat_one_does_not_wrap() {
        let mut queue = queue_of(&["a", "b"]);
        queue.set_repeat_mode(RepeatMode::One);
        queue.play_track(&create_test_track("b"));

        queue.play_next();

        assert!(queue.current_track_id().is_none());
        assert!(!queue.is_playing());
    }

    #[test]
    fn test_play_previous_moves_back() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.play_track(&create_test_track("c"));

        queue.play_previous();
        assert_eq!(queue.current_song().unwrap().id, id("b"));
        queue.play_previous();
        assert_eq!(queue.current_song().unwrap().id, id("a"));
    }

    #[test]
    fn test_play_previous_without_current_is_noop() {
        let mut queue = queue_of(&["a", "b"]);
        queue.play_previous();
        assert!(queue.current_track_id().is_none());
        assert!(queue.history().is_empty());
    }

    #[test]
    fn test_toggle_play_leaves_current_alone() {
        let mut queue = queue_of(&["a"]);
        queue.play_track(&create_test_track("a"));

        queue.toggle_play();
        assert!(!queue.is_playing());
        assert_eq!(queue.current_track_id(), Some(&id("a")));

        queue.toggle_play();
        assert!(queue.is_playing());
        assert_eq!(queue.history().len(), 1);
    }

    #[test]
    fn test_delete_non_current_only_removes() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.play_track(&create_test_track("a"));

        queue.handle_song_deleted(&id("c"));

        assert_eq!(queue.current_track_id(), Some(&id("a")));
        assert_eq!(queue.history(), &[id("a")]);
        let ids: Vec<_> = queue.queue().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![id("a"), id("b")]);
    }

    #[test]
    fn test_delete_removes_duplicate_entries() {
        let mut queue = queue_of(&["a", "b", "a"]);
        queue.handle_song_deleted(&id("a"));
        let ids: Vec<_> = queue.queue().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![id("b")]);
    }

    #[test]
    fn test_delete_last_current_with_repeat_all_wraps() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.set_repeat_mode(RepeatMode::All);
        queue.play_track(&create_test_track("c"));

        queue.handle_song_deleted(&id("c"));

        assert_eq!(queue.current_song().unwrap().id, id("a"));
        assert_eq!(queue.queue().len(), 2);
    }

    #[test]
    fn test_shuffle_is_stored_only() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.set_shuffle(true);
        queue.play_track(&create_test_track("a"));

        queue.play_next();

        assert!(queue.shuffle());
        assert_eq!(queue.current_song().unwrap().id, id("b"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut queue = queue_of(&["b", "a"]);
        queue.play_next();
        queue.play_next();

        let snapshot = queue.snapshot();
        assert_eq!(snapshot.current_song.as_ref().map(|t| t.id.clone()), Some(id("a")));
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.history, vec![id("b"), id("a")]);
        assert_eq!(snapshot.played_history, vec![id("a"), id("b")]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["repeatMode"], "none");
        assert_eq!(json["playedHistory"][0], "a");
    }
}
