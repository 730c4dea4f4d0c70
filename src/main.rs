//! Skyfire entry point
//!
//! Native builds play in the terminal, or run the autopilot headless and
//! print a summary. The browser build starts from `wasm_main`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    skyfire::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};

    use skyfire::audio::SilentBackend;
    use skyfire::config::{GameConfig, Preset};
    use skyfire::consts::SIM_STEP_MS;
    use skyfire::persistence::{FileStore, KeyValueStore, MemoryStore};
    use skyfire::platform::terminal::{self, BellBackend};
    use skyfire::session::Session;
    use skyfire::sim::{FrameEvent, GameEvent};

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum CliPreset {
        /// 800x600, no high score
        Classic,
        /// 1920x1080, everything on
        Hd,
    }

    impl From<CliPreset> for Preset {
        fn from(preset: CliPreset) -> Self {
            match preset {
                CliPreset::Classic => Preset::Classic,
                CliPreset::Hd => Preset::Hd,
            }
        }
    }

    #[derive(Parser, Debug)]
    #[command(name = "skyfire")]
    #[command(about = "Vertical arcade shooter for the terminal")]
    struct Cli {
        /// Game variant
        #[arg(long, value_enum, default_value_t = CliPreset::Hd)]
        preset: CliPreset,
        /// JSON config file; replaces the preset, missing fields use HD defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Write logs here (interactive mode logs nothing otherwise)
        #[arg(long)]
        log_file: Option<PathBuf>,
        /// Run the autopilot without a terminal UI and print a summary
        #[arg(long, default_value_t = false)]
        headless: bool,
        /// Simulated time for a headless run
        #[arg(long, default_value_t = 60_000)]
        duration_ms: u64,
        /// Where the high score and settings live (default ~/.skyfire)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Start with the autopilot flying
        #[arg(long, default_value_t = false)]
        autopilot: bool,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        init_logging(&cli)?;

        let config = match &cli.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Preset::from(cli.preset).config(),
        };
        let seed = cli.seed.unwrap_or_else(clock_seed);

        if cli.headless {
            run_headless(&cli, config, seed)
        } else {
            run_interactive(&cli, config, seed)
        }
    }

    fn init_logging(cli: &Cli) -> Result<()> {
        let env = env_logger::Env::default().default_filter_or("info");
        match (&cli.log_file, cli.headless) {
            // Logs on stderr would tear the alternate screen
            (Some(path), _) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create log file {}", path.display()))?;
                env_logger::Builder::from_env(env)
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            (None, true) => env_logger::Builder::from_env(env).init(),
            (None, false) => {}
        }
        Ok(())
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn run_interactive(cli: &Cli, config: GameConfig, seed: u64) -> Result<()> {
        let dir = cli.data_dir.clone().unwrap_or_else(FileStore::default_dir);
        let store: Box<dyn KeyValueStore> = Box::new(FileStore::new(dir));
        let mut session = Session::new(config, seed, store, BellBackend);
        session.set_autopilot(cli.autopilot);

        terminal::run(&mut session).context("terminal session failed")?;

        let state = session.state();
        if state.config.has_high_score {
            println!("High score: {}", state.high_score.best());
        }
        Ok(())
    }

    /// Totals for a headless run
    #[derive(Debug, Default)]
    struct Summary {
        games: u32,
        best_run: u64,
        kills: u64,
        shots: u64,
    }

    fn run_headless(cli: &Cli, config: GameConfig, seed: u64) -> Result<()> {
        let store: Box<dyn KeyValueStore> = match &cli.data_dir {
            Some(dir) => Box::new(FileStore::new(dir)),
            None => Box::new(MemoryStore::new()),
        };
        let mut session = Session::new(config, seed, store, SilentBackend);
        session.set_autopilot(true);

        let mut summary = Summary::default();
        let steps = cli.duration_ms / SIM_STEP_MS;
        for _ in 0..steps {
            for event in session.step() {
                match event {
                    GameEvent::BulletFired { .. } => summary.shots += 1,
                    GameEvent::EnemyDestroyed { .. } => summary.kills += 1,
                    GameEvent::GameOver { score, .. } => {
                        summary.games += 1;
                        summary.best_run = summary.best_run.max(score);
                    }
                    _ => {}
                }
            }
            if session.state().is_game_over() {
                session.push_event(FrameEvent::Restart);
            }
        }
        // A run still in progress counts too
        if !session.state().is_game_over() && session.state().frame > 0 {
            summary.games += 1;
            summary.best_run = summary.best_run.max(session.state().score);
        }

        log::info!("Headless run finished: {:?}", summary);
        println!(
            "seed {}: {} games over {}ms, best run {}, {} kills from {} shots, high score {}",
            seed,
            summary.games,
            steps * SIM_STEP_MS,
            summary.best_run,
            summary.kills,
            summary.shots,
            session.state().high_score.best()
        );
        Ok(())
    }
}
