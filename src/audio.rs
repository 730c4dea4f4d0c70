//! Sound cues
//!
//! `AudioManager` owns volume and mute state and forwards cues to a
//! backend. On the web the backend synthesizes effects with the Web Audio
//! API; the terminal host rings the bell.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bullet fired
    Shoot,
    /// Bullet hit an enemy, or an enemy hit the ship
    Hit,
    /// Run ended
    GameOver,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::BulletFired { .. } => Some(SoundEffect::Shoot),
            GameEvent::EnemyDestroyed { .. } | GameEvent::PlayerDestroyed { .. } => {
                Some(SoundEffect::Hit)
            }
            GameEvent::GameOver {
                new_high_score: true,
                ..
            } => Some(SoundEffect::HighScore),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Something that can make noise
pub trait AudioBackend {
    /// Play `effect` at `volume` (0.0 - 1.0, already mixed)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that drops every cue (headless runs)
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 0.5,
            muted: false,
        }
    }

    /// Take volume and mute from saved settings
    pub fn with_settings(backend: B, settings: &Settings) -> Self {
        let mut audio = Self::new(backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    /// Play the cues for a frame's events, in order
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Web Audio synthesizer - procedurally generated effects, no asset files
#[cfg(target_arch = "wasm32")]
pub struct WebAudioBackend {
    ctx: Option<web_sys::AudioContext>,
}

#[cfg(target_arch = "wasm32")]
impl WebAudioBackend {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = web_sys::AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &web_sys::AudioContext,
        freq: f32,
        osc_type: web_sys::OscillatorType,
    ) -> Option<(web_sys::OscillatorNode, web_sys::GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Downward sweep with an exponential decay
    fn sweep(
        ctx: &web_sys::AudioContext,
        osc_type: web_sys::OscillatorType,
        from_hz: f32,
        to_hz: f32,
        peak: f32,
        length: f64,
    ) {
        let Some((osc, gain)) = Self::create_osc(ctx, from_hz, osc_type) else {
            return;
        };
        let t = ctx.current_time();
        gain.gain().set_value_at_time(peak, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();
        osc.frequency().set_value_at_time(from_hz, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to_hz, t + length)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + length + 0.05).ok();
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioBackend for WebAudioBackend {
    fn play(&mut self, effect: SoundEffect, vol: f32) {
        use web_sys::OscillatorType;

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            // Laser pew
            SoundEffect::Shoot => {
                Self::sweep(ctx, OscillatorType::Square, 1200.0, 300.0, vol * 0.2, 0.12)
            }
            // Boom with a high crack on top
            SoundEffect::Hit => {
                Self::sweep(ctx, OscillatorType::Sawtooth, 100.0, 30.0, vol * 0.5, 0.4);
                Self::sweep(ctx, OscillatorType::Square, 1500.0, 800.0, vol * 0.2, 0.1);
            }
            // Slow descending tone
            SoundEffect::GameOver => {
                Self::sweep(ctx, OscillatorType::Triangle, 440.0, 110.0, vol * 0.4, 1.0)
            }
            // Rising arpeggio
            SoundEffect::HighScore => {
                for (i, freq) in [523.0, 659.0, 784.0, 1047.0].into_iter().enumerate() {
                    let Some((osc, gain)) =
                        Self::create_osc(ctx, freq, OscillatorType::Sine)
                    else {
                        continue;
                    };
                    let t = ctx.current_time() + i as f64 * 0.1;
                    gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start().ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }
    }
}
