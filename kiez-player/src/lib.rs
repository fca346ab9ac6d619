//! # Kiez Playback Queue (kiez-player)
//!
//! Client-side playback state machine: tracks the current track, navigates
//! the queue under the repeat policy and absorbs library mutations (a song
//! deleted elsewhere) without losing consistency.
//!
//! Every operation is synchronous and total. Nothing here returns an error;
//! missing ids and out-of-range positions degrade to a no-op or to the
//! stopped state.

pub mod queue;
pub mod types;

pub use queue::PlaybackQueue;
pub use types::{QueueSnapshot, RepeatMode};
