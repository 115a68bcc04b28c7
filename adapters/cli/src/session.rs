use std::time::Duration;

use hiss_core::{Command, Difficulty, Event, Phase, Rules};
use hiss_rendering::{
    Countdown, FrameInput, GridPresentation, HudPresentation, Overlay, Palette, RenderingError,
    Scene,
};
use hiss_system_placement::{Config as PlacementConfig, Placement};
use hiss_world::{self as world, query, World};

/// Upper bound on ticks simulated in a single frame after a stall.
const MAX_TICKS_PER_FRAME: u32 = 8;

/// Owns the world and its systems for the lifetime of the process.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    placement: Placement,
    tick_accumulator: Duration,
    music_enabled: bool,
}

impl Session {
    pub(crate) fn new(rules: Rules, obstacle_count: u32, seed: u64, music_enabled: bool) -> Self {
        let mut session = Self {
            world: World::new(),
            placement: Placement::new(PlacementConfig::new(obstacle_count, seed)),
            tick_accumulator: Duration::ZERO,
            music_enabled,
        };
        session.execute(Command::Configure { rules });
        session
    }

    /// Skips the menu and starts a round straight away.
    pub(crate) fn start(&mut self, difficulty: Difficulty) {
        self.execute(Command::StartRound { difficulty });
    }

    /// Applies one frame of input and runs every tick that became due.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput) {
        if input.music_toggle {
            self.music_enabled = !self.music_enabled;
            log::info!(
                "music {}",
                if self.music_enabled { "enabled" } else { "disabled" }
            );
        }

        if query::phase(&self.world) == Phase::Menu {
            if let Some(difficulty) = input.difficulty {
                self.execute(Command::StartRound { difficulty });
            }
        } else {
            if input.restart {
                self.execute(Command::Restart);
            }
            if input.pause_toggle {
                self.execute(Command::TogglePause);
            }
            if let Some(direction) = input.direction {
                self.execute(Command::SteerSnake { direction });
            }
        }

        self.run_due_ticks(dt);
    }

    fn run_due_ticks(&mut self, dt: Duration) {
        let Some(difficulty) = query::difficulty(&self.world) else {
            return;
        };
        if query::phase(&self.world) != Phase::Running {
            self.tick_accumulator = Duration::ZERO;
            return;
        }

        let interval = Duration::from_secs(1) / difficulty.tick_rate();
        self.tick_accumulator = self.tick_accumulator.saturating_add(dt);

        let mut ticks = 0;
        while self.tick_accumulator >= interval {
            if ticks == MAX_TICKS_PER_FRAME {
                log::debug!("dropping {:?} of backlog", self.tick_accumulator);
                self.tick_accumulator = Duration::ZERO;
                break;
            }
            self.tick_accumulator -= interval;
            ticks += 1;

            self.execute(Command::Tick);
            if query::phase(&self.world) != Phase::Running {
                self.tick_accumulator = Duration::ZERO;
                break;
            }
        }
    }

    /// Applies a command and feeds the resulting events through the systems
    /// until no further commands are produced.
    fn execute(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            log_events(&events);

            let world = &self.world;
            self.placement.handle(
                &events,
                query::grid(world),
                |cell| query::is_blocked(world, cell),
                &mut pending,
            );
        }
    }

    /// Describes the initial frame for the rendering backend.
    pub(crate) fn initial_scene(&self) -> Result<Scene, RenderingError> {
        let grid = GridPresentation::from_grid(query::grid(&self.world))?;
        let mut scene = Scene::new(grid, Palette::classic(), query::home(&self.world));
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Refreshes the scene from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let snapshot = query::snapshot(&self.world);

        scene.snake = snapshot.snake;
        scene.obstacles = snapshot.obstacles;
        scene.home = snapshot.home;
        scene.meal = snapshot.meal;
        scene.hud = HudPresentation {
            score: snapshot.score,
            target_score: snapshot.target_score,
            high_score: snapshot.high_score,
            countdown: snapshot.difficulty.and_then(|difficulty| {
                Countdown::from_ticks(snapshot.delivery_timer, difficulty.tick_rate())
            }),
        };
        scene.overlay = match snapshot.phase {
            Phase::Menu => Some(Overlay::Menu),
            Phase::Running => None,
            Phase::Paused => Some(Overlay::Paused),
            Phase::Won => Some(Overlay::Won),
            Phase::Lost => Some(Overlay::Lost),
        };
        scene.music_enabled = self.music_enabled;
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::RoundStarted { difficulty } => {
                log::info!("round started on {}", difficulty.label());
            }
            Event::PhaseChanged {
                phase: phase @ (Phase::Won | Phase::Lost),
            } => {
                log::info!("round ended: {phase:?}");
            }
            Event::ObstacleStruck { cell } => {
                log::info!("snake struck obstacle at {cell:?}");
            }
            Event::DeliveryExpired => log::info!("delivery window expired"),
            Event::MealDelivered {
                value,
                score,
                deliveries,
            } => {
                log::info!(
                    "delivered {} point meal, score {score} after {deliveries} deliveries",
                    value.points()
                );
            }
            Event::HighScoreRaised { high_score } => {
                log::info!("new high score {high_score}");
            }
            other => log::trace!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiss_core::{CellCoord, Direction, Grid};

    const SEED: u64 = 0x0bad_5eed;

    fn session() -> Session {
        Session::new(Rules::default(), 8, SEED, true)
    }

    fn pick(difficulty: Difficulty) -> FrameInput {
        FrameInput {
            difficulty: Some(difficulty),
            ..FrameInput::default()
        }
    }

    #[test]
    fn menu_waits_for_difficulty() {
        let mut session = session();
        session.advance(Duration::from_secs(5), FrameInput::default());

        assert_eq!(query::phase(&session.world), Phase::Menu);
        assert_eq!(query::snake_head(&session.world), CellCoord::new(5, 5));
    }

    #[test]
    fn selecting_difficulty_populates_round() {
        let mut session = session();
        session.advance(Duration::ZERO, pick(Difficulty::Easy));

        assert_eq!(query::phase(&session.world), Phase::Running);
        assert_eq!(query::obstacles(&session.world).count(), 8);
        assert!(query::meal(&session.world).is_some());
    }

    #[test]
    fn frame_time_drives_tick_rate() {
        let mut session = Session::new(Rules::default(), 0, SEED, false);
        session.advance(Duration::ZERO, pick(Difficulty::Easy));

        // Easy runs at 8 ticks per second: 0.25 s covers exactly two ticks.
        session.advance(Duration::from_millis(250), FrameInput::default());
        assert_eq!(query::snake_head(&session.world), CellCoord::new(7, 5));

        session.advance(Duration::from_millis(100), FrameInput::default());
        assert_eq!(query::snake_head(&session.world), CellCoord::new(7, 5));
        session.advance(Duration::from_millis(25), FrameInput::default());
        assert_eq!(query::snake_head(&session.world), CellCoord::new(8, 5));
    }

    #[test]
    fn long_stall_is_capped() {
        let mut session = Session::new(Rules::default(), 0, SEED, false);
        session.advance(Duration::ZERO, pick(Difficulty::Hard));
        let before = query::snake_head(&session.world);

        session.advance(Duration::from_secs(10), FrameInput::default());

        let after = query::snake_head(&session.world);
        assert_eq!(after.column() - before.column(), MAX_TICKS_PER_FRAME);
        assert_eq!(session.tick_accumulator, Duration::ZERO);
    }

    #[test]
    fn paused_round_does_not_accumulate_time() {
        let mut session = session();
        session.advance(Duration::ZERO, pick(Difficulty::Medium));
        session.advance(
            Duration::ZERO,
            FrameInput {
                pause_toggle: true,
                ..FrameInput::default()
            },
        );
        let head = query::snake_head(&session.world);

        session.advance(Duration::from_secs(3), FrameInput::default());

        assert_eq!(query::phase(&session.world), Phase::Paused);
        assert_eq!(query::snake_head(&session.world), head);
        assert_eq!(session.tick_accumulator, Duration::ZERO);
    }

    #[test]
    fn steering_input_reaches_the_snake() {
        let mut session = Session::new(Rules::default(), 0, SEED, false);
        session.advance(Duration::ZERO, pick(Difficulty::Easy));
        session.advance(
            Duration::from_millis(125),
            FrameInput {
                direction: Some(Direction::South),
                ..FrameInput::default()
            },
        );

        assert_eq!(query::direction(&session.world), Direction::South);
        assert_eq!(query::snake_head(&session.world), CellCoord::new(5, 6));
    }

    #[test]
    fn music_toggle_flips_scene_flag() {
        let mut session = session();
        let mut scene = session.initial_scene().expect("valid grid");
        assert!(scene.music_enabled);

        session.advance(
            Duration::ZERO,
            FrameInput {
                music_toggle: true,
                ..FrameInput::default()
            },
        );
        session.populate_scene(&mut scene);

        assert!(!scene.music_enabled);
        assert_eq!(scene.overlay, Some(Overlay::Menu));
    }

    #[test]
    fn scene_mirrors_running_round() {
        let mut session = session();
        session.start(Difficulty::Medium);
        let mut scene = session.initial_scene().expect("valid grid");
        session.populate_scene(&mut scene);

        assert_eq!(scene.overlay, None);
        assert_eq!(scene.snake.len(), 3);
        assert_eq!(scene.obstacles.len(), 8);
        assert_eq!(scene.home, CellCoord::new(0, 29));
        assert_eq!(scene.meal, query::meal(&session.world));
        assert_eq!(scene.hud.target_score, 50);
        assert_eq!(scene.hud.countdown, None);
    }

    #[test]
    fn settings_rules_reach_the_world() {
        let rules = Rules::new(Grid::new(16, 12, 25), 20, 5);
        let mut session = Session::new(rules, 4, SEED, false);

        assert_eq!(query::rules(&session.world), rules);
        assert_eq!(query::phase(&session.world), Phase::Menu);
        assert_eq!(query::home(&session.world), CellCoord::new(0, 11));

        session.start(Difficulty::Medium);
        let scene = session.initial_scene().expect("valid grid");
        assert_eq!(scene.grid.width(), 400.0);
        assert_eq!(scene.hud.target_score, 20);
        assert_eq!(query::obstacles(&session.world).count(), 4);
    }

    #[test]
    fn restart_is_ignored_on_menu() {
        let mut session = session();
        session.advance(
            Duration::ZERO,
            FrameInput {
                restart: true,
                ..FrameInput::default()
            },
        );

        assert_eq!(query::phase(&session.world), Phase::Menu);
    }

    #[test]
    fn identical_seeds_replay_identical_sessions() {
        let run = || {
            let mut session = Session::new(
                Rules::new(Grid::new(20, 20, 20), 50, 8),
                10,
                SEED,
                false,
            );
            session.start(Difficulty::Easy);
            (
                query::obstacles(&session.world).collect::<Vec<_>>(),
                query::meal(&session.world),
            )
        };

        assert_eq!(run(), run());
    }
}
