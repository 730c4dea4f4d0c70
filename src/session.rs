//! Running game session
//!
//! Owns the simulation state plus the things the simulation must not touch:
//! durable storage, user settings and audio. Hosts feed it wall-clock
//! timestamps and input; it advances the simulation in fixed steps and
//! reacts to the resulting events.

use glam::Vec2;

use crate::audio::{AudioBackend, AudioManager};
use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_STEP_MS};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{FrameEvent, GameEvent, GameState, TickInput, tick};

/// Longest wall-clock gap fed to the simulation in one update
const MAX_FRAME_MS: u64 = 100;

pub struct Session<S: KeyValueStore, B: AudioBackend> {
    state: GameState,
    store: S,
    settings: Settings,
    audio: AudioManager<B>,
    /// Simulation clock
    clock_ms: u64,
    accumulator_ms: u64,
    last_host_ms: Option<u64>,
    input: TickInput,
}

impl<S: KeyValueStore, B: AudioBackend> Session<S, B> {
    /// Start a session, restoring the high score and settings from `store`
    pub fn new(config: GameConfig, seed: u64, store: S, backend: B) -> Self {
        let mut state = GameState::new(config, seed);
        let settings = Settings::load(&store);
        if state.config.has_high_score {
            state.high_score = HighScore::load(&store);
        }
        state.muted = settings.muted;
        let audio = AudioManager::with_settings(backend, &settings);
        log::info!(
            "Session started (seed {}, {}x{})",
            seed,
            state.config.screen_width,
            state.config.screen_height
        );
        Self {
            state,
            store,
            settings,
            audio,
            clock_ms: 0,
            accumulator_ms: 0,
            last_host_ms: None,
            input: TickInput::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioManager<B> {
        &self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Queue a discrete event for the next simulation step
    pub fn push_event(&mut self, event: FrameEvent) {
        self.input.events.push(event);
    }

    /// Current held-key state
    pub fn set_held(&mut self, axis: Vec2, fire: bool) {
        self.input.axis = axis;
        self.input.fire = fire;
    }

    pub fn autopilot(&self) -> bool {
        self.input.autopilot
    }

    pub fn set_autopilot(&mut self, on: bool) {
        if self.input.autopilot != on {
            log::info!("Autopilot {}", if on { "on" } else { "off" });
        }
        self.input.autopilot = on;
    }

    /// Advance to the host timestamp `host_ms`, running as many fixed steps
    /// as have accumulated. Returns every event produced along the way.
    pub fn update(&mut self, host_ms: u64) -> Vec<GameEvent> {
        let elapsed = match self.last_host_ms {
            Some(last) => host_ms.saturating_sub(last).min(MAX_FRAME_MS),
            None => SIM_STEP_MS,
        };
        self.last_host_ms = Some(host_ms);
        self.accumulator_ms += elapsed;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator_ms >= SIM_STEP_MS && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator_ms -= SIM_STEP_MS;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiraling
            self.accumulator_ms = 0;
        }
        events
    }

    /// Run exactly one fixed simulation step
    pub fn step(&mut self) -> Vec<GameEvent> {
        self.clock_ms += SIM_STEP_MS;
        let events = tick(&mut self.state, &self.input, self.clock_ms);
        // One-shot events are consumed by the step that saw them
        self.input.events.clear();
        self.handle_events(&events);
        events
    }

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::GameOver {
                    new_high_score: true,
                    ..
                } => self.state.high_score.save(&mut self.store),
                GameEvent::MuteToggled { muted } => {
                    self.settings.muted = muted;
                    self.audio.set_muted(muted);
                    self.settings.save(&mut self.store);
                }
                _ => {}
            }
        }
        self.audio.play_events(events);
    }
}
