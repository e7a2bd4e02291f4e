//! Sound effect identifiers
//!
//! Playback is owned by the host; the simulation only names what to play and
//! fires it through a [`crate::sinks::CueSink`].

use serde::Serialize;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundEffect {
    /// Looping slime squelch while a snail is allowed to move
    SlimeLoopStart,
    /// Stop the slime loop (snail disabled)
    SlimeLoopStop,
    /// Boost activated
    BoostStart,
    /// Territory claimed
    BlobCreate,
    /// Snail crashed
    Death,
}

impl SoundEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundEffect::SlimeLoopStart => "slime_loop_start",
            SoundEffect::SlimeLoopStop => "slime_loop_stop",
            SoundEffect::BoostStart => "boost",
            SoundEffect::BlobCreate => "blob_create",
            SoundEffect::Death => "death",
        }
    }
}
