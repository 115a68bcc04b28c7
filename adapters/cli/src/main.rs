#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Hiss & Go Seek experience.

mod session;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hiss_core::{Difficulty, GAME_TITLE};
use hiss_rendering::{Presentation, RenderingBackend};
use hiss_rendering_macroquad::MacroquadBackend;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

use crate::{session::Session, settings::GameSettings};

/// Track looked up in the working directory when no other path is configured.
const DEFAULT_MUSIC_PATH: &str = "snoozy beats - dreams in slow motion.mp3";

/// Snake delivery arcade game.
#[derive(Debug, Parser)]
#[command(name = "hiss-go-seek", version)]
struct CliArgs {
    /// Skips the menu and starts a round at the given difficulty.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Seeds obstacle and meal placement for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding grid size, target score, delivery window and obstacle count.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Background track looped while music is switched on.
    #[arg(long, value_name = "PATH")]
    music: Option<PathBuf>,
    /// Starts with music switched off; `M` still toggles it.
    #[arg(long)]
    no_music: bool,
    /// Synchronises presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Renders frames as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,
    /// Most verbose log level written to stderr.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

impl CliArgs {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Entry point for the Hiss & Go Seek command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();

    TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialise logging")?;

    let settings = match &args.settings {
        Some(path) => GameSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => GameSettings::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("starting {GAME_TITLE} with placement seed {seed}");

    let mut session = Session::new(
        settings.rules(),
        settings.obstacle_count,
        seed,
        !args.no_music,
    );
    if let Some(difficulty) = args.difficulty {
        session.start(difficulty.into());
    }

    let scene = session
        .initial_scene()
        .context("failed to describe the play area")?;
    let presentation = Presentation::new(GAME_TITLE, scene.palette.background, scene);

    let vsync = args.vsync_enabled();
    let music_path = args
        .music
        .or(settings.music)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MUSIC_PATH));
    let backend = MacroquadBackend::new()
        .with_vsync(vsync)
        .with_music_path(Some(music_path));

    backend.run(presentation, move |dt, input, scene| {
        session.advance(dt, input);
        session.populate_scene(scene);
    })
}
