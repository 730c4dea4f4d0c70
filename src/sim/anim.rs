//! Frame-sequence animations
//!
//! Animations are pure functions of the simulation clock: an `Animator`
//! records when its clip started and derives the current frame from `now`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Loop,
    Once,
}

/// A frame sequence played at a fixed rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    pub frames: u16,
    pub frame_rate: f32,
    pub repeat: Repeat,
}

impl AnimationClip {
    /// Full playback length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.frames as f32 * 1000.0 / self.frame_rate) as u64
    }
}

/// Player exhaust loop
pub const FLY: AnimationClip = AnimationClip {
    frames: 10,
    frame_rate: 10.0,
    repeat: Repeat::Loop,
};

/// Enemy flight loop
pub const ENEMY_FLY: AnimationClip = AnimationClip {
    frames: 10,
    frame_rate: 10.0,
    repeat: Repeat::Loop,
};

/// Enemy explosion, hidden when complete
pub const EXPLODE: AnimationClip = AnimationClip {
    frames: 7,
    frame_rate: 10.0,
    repeat: Repeat::Once,
};

/// Player explosion, hidden when complete
pub const PLAYER_EXPLODE: AnimationClip = AnimationClip {
    frames: 7,
    frame_rate: 10.0,
    repeat: Repeat::Once,
};

/// Playback of a clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animator {
    pub clip: AnimationClip,
    pub started_ms: u64,
}

impl Animator {
    pub fn play(clip: AnimationClip, now_ms: u64) -> Self {
        Self {
            clip,
            started_ms: now_ms,
        }
    }

    /// Frame index to display at `now_ms`
    pub fn frame_at(&self, now_ms: u64) -> u16 {
        let elapsed = now_ms.saturating_sub(self.started_ms) as f32;
        let raw = (elapsed * self.clip.frame_rate / 1000.0) as u64;
        let frames = self.clip.frames.max(1) as u64;
        match self.clip.repeat {
            Repeat::Loop => (raw % frames) as u16,
            Repeat::Once => raw.min(frames - 1) as u16,
        }
    }

    /// One-shot clips complete after their last frame has shown
    pub fn is_complete(&self, now_ms: u64) -> bool {
        match self.clip.repeat {
            Repeat::Loop => false,
            Repeat::Once => now_ms.saturating_sub(self.started_ms) >= self.clip.duration_ms(),
        }
    }
}
