//! Audio playback capability.
//!
//! Entities that make noise get a [`SharedSound`] handed in instead of reaching for
//! a global, so tests can pass a double and several entities can share one effect.

use std::{cell::RefCell, rc::Rc};

/// A loaded sound effect provided by the host's audio system.
pub trait SoundEffect {
    /// Moves the playback cursor to `seconds`.
    fn seek(&mut self, seconds: f32) -> anyhow::Result<()>;

    fn play(&mut self) -> anyhow::Result<()>;
}

pub type SharedSound = Rc<RefCell<dyn SoundEffect>>;

/// Rewinds and plays `sound`. Failures are logged and otherwise ignored.
pub fn play_from_start(sound: &SharedSound) {
    let Ok(mut sound) = sound.try_borrow_mut() else {
        log::warn!("Sound effect is busy, skipping playback.");
        return;
    };
    if let Err(e) = sound.seek(0.0).and_then(|_| sound.play()) {
        log::warn!("Could not play sound effect: {}", e);
    }
}
