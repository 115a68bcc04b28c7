#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Hiss & Go Seek.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Background music is compiled in only when this
//! crate's `audio` feature is enabled; otherwise the game runs silently and
//! logs a warning when a track was requested.

mod audio;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use glam::Vec2;
use hiss_core::{CellCoord, Difficulty, Direction};
use hiss_rendering::{Color, FrameInput, Overlay, Presentation, RenderingBackend, Scene};
use macroquad::input::{is_key_pressed, KeyCode};

use self::audio::BackgroundMusic;

/// Font size used for every line of text, in design pixels.
const FONT_SIZE: f32 = 20.0;
/// Radius of the eyes drawn on the snake's head, in design pixels.
const EYE_RADIUS: f32 = 2.0;
/// Distance between the eyes and the head's top corners, in design pixels.
const EYE_INSET: f32 = 4.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardShortcuts {
    quit_requested: bool,
    restart: bool,
    pause_toggle: bool,
    music_toggle: bool,
    direction: Option<Direction>,
    difficulty: Option<Difficulty>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self::from_pressed(is_key_pressed)
    }

    /// Builds the shortcut snapshot from a predicate reporting pressed keys.
    ///
    /// When several arrows are pressed on the same frame the last one in
    /// up, down, left, right order wins.
    pub fn from_pressed<F>(pressed: F) -> Self
    where
        F: Fn(KeyCode) -> bool,
    {
        let direction = [
            (KeyCode::Up, Direction::North),
            (KeyCode::Down, Direction::South),
            (KeyCode::Left, Direction::West),
            (KeyCode::Right, Direction::East),
        ]
        .into_iter()
        .filter(|(key, _)| pressed(*key))
        .map(|(_, direction)| direction)
        .last();

        let difficulty = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3]
            .into_iter()
            .zip(Difficulty::ALL)
            .find(|(key, _)| pressed(*key))
            .map(|(_, difficulty)| difficulty);

        Self {
            quit_requested: pressed(KeyCode::Escape) || pressed(KeyCode::Q),
            restart: pressed(KeyCode::R),
            pause_toggle: pressed(KeyCode::P),
            music_toggle: pressed(KeyCode::M),
            direction,
            difficulty,
        }
    }

    /// Whether `Escape` or `Q` asked the game loop to stop.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Converts the shortcuts into the input consumed by the scene update.
    #[must_use]
    pub fn into_frame_input(self) -> FrameInput {
        FrameInput {
            direction: self.direction,
            difficulty: self.difficulty,
            restart: self.restart,
            pause_toggle: self.pause_toggle,
            music_toggle: self.music_toggle,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    music_path: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures the track looped in the background while music is switched on.
    #[must_use]
    pub fn with_music_path(mut self, music_path: Option<PathBuf>) -> Self {
        self.music_path = music_path;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            music_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.grid.width().round() as i32,
            window_height: scene.grid.height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut music = BackgroundMusic::load(music_path.as_deref()).await;
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested() {
                    log::info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, keyboard.into_frame_input(), &mut scene);
                music.sync(scene.music_enabled);

                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_scene(&scene, &metrics);

                macroquad::window::next_frame().await;
            }

            music.sync(false);
        });

        Ok(())
    }
}

/// Maps the design-space grid onto the window, preserving its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let width = scene.grid.width();
        let height = scene.grid.height();
        let scale = if width <= f32::EPSILON || height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / width).min(screen_height / height)
        };

        let offset = Vec2::new(
            ((screen_width - width * scale) * 0.5).max(0.0),
            ((screen_height - height * scale) * 0.5).max(0.0),
        );

        Self { scale, offset }
    }

    fn to_screen(&self, design: Vec2) -> Vec2 {
        self.offset + design * self.scale
    }
}

/// Line of text placed by its top-left corner in design space.
#[derive(Clone, Debug, PartialEq)]
struct TextLine {
    text: String,
    position: Vec2,
    color: Color,
}

impl TextLine {
    fn new(text: impl Into<String>, x: f32, y: f32, color: Color) -> Self {
        Self {
            text: text.into(),
            position: Vec2::new(x, y),
            color,
        }
    }
}

fn menu_lines(scene: &Scene) -> Vec<TextLine> {
    let text = scene.palette.text;
    let mut lines = vec![
        TextLine::new(hiss_core::GAME_TITLE, 150.0, 80.0, text),
        TextLine::new("Select Difficulty:", 150.0, 140.0, text),
    ];
    for (index, difficulty) in Difficulty::ALL.iter().enumerate() {
        lines.push(TextLine::new(
            format!("{} - {}", index + 1, difficulty.label()),
            180.0,
            180.0 + 30.0 * index as f32,
            text,
        ));
    }
    let music_state = if scene.music_enabled { "on" } else { "off" };
    lines.push(TextLine::new(
        format!("M - Toggle Music ({music_state})"),
        150.0,
        280.0,
        text,
    ));
    lines
}

fn hud_lines(scene: &Scene) -> Vec<TextLine> {
    let palette = &scene.palette;
    let hud = scene.hud;
    let mut lines = vec![
        TextLine::new(
            format!("Score: {}/{}", hud.score, hud.target_score),
            10.0,
            10.0,
            palette.hud,
        ),
        TextLine::new(
            format!("High Score: {}", hud.high_score),
            (scene.grid.width() - 280.0).max(10.0),
            10.0,
            palette.hud,
        ),
    ];
    if let Some(countdown) = hud.countdown {
        let color = if countdown.urgent {
            palette.urgent
        } else {
            palette.hud
        };
        lines.push(TextLine::new(
            format!("Time Left: {}s", countdown.seconds_left),
            10.0,
            30.0,
            color,
        ));
    }
    lines
}

fn banner_line(scene: &Scene) -> Option<TextLine> {
    let palette = &scene.palette;
    let middle = scene.grid.height() * 0.5;
    match scene.overlay? {
        Overlay::Menu => None,
        Overlay::Paused => Some(TextLine::new(
            "PAUSED. Press P to resume",
            130.0,
            middle,
            palette.paused,
        )),
        Overlay::Won => Some(TextLine::new(
            "YOU WIN! Press R to restart",
            100.0,
            middle,
            palette.won,
        )),
        Overlay::Lost => Some(TextLine::new(
            "GAME OVER! Press R to restart",
            90.0,
            middle,
            palette.lost,
        )),
    }
}

/// Centers of the two eyes painted on a head whose top-left corner is `origin`.
fn eye_centers(origin: Vec2, cell_length: f32) -> [Vec2; 2] {
    [
        origin + Vec2::splat(EYE_INSET),
        origin + Vec2::new(cell_length - EYE_INSET, EYE_INSET),
    ]
}

/// Cells in paint order: the snake (body, then head) followed by home,
/// obstacles and the meal, so home stays visible under the head.
fn cell_layers(scene: &Scene) -> Vec<(CellCoord, Color)> {
    let palette = &scene.palette;
    let mut layers = Vec::with_capacity(scene.snake.len() + scene.obstacles.len() + 2);
    layers.extend(
        scene
            .snake
            .iter()
            .skip(1)
            .map(|segment| (*segment, palette.snake_body)),
    );
    layers.extend(scene.snake_head().map(|head| (head, palette.snake_head)));
    layers.push((scene.home, palette.home));
    layers.extend(
        scene
            .obstacles
            .iter()
            .map(|obstacle| (*obstacle, palette.obstacle)),
    );
    layers.extend(
        scene
            .meal
            .map(|meal| (meal.cell(), palette.meal(meal.value()))),
    );
    layers
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    if scene.overlay == Some(Overlay::Menu) {
        for line in menu_lines(scene) {
            draw_text_line(&line, metrics);
        }
        return;
    }

    let layers = cell_layers(scene);
    let (snake, terrain) = layers.split_at(scene.snake.len());
    for (cell, color) in snake {
        draw_cell(scene, metrics, *cell, *color);
    }
    if let Some(head) = scene.snake_head() {
        let eyes_color = to_macroquad_color(scene.palette.snake_eyes);
        for eye in eye_centers(scene.grid.cell_origin(head), scene.grid.cell_length) {
            let center = metrics.to_screen(eye);
            macroquad::shapes::draw_circle(
                center.x,
                center.y,
                EYE_RADIUS * metrics.scale,
                eyes_color,
            );
        }
    }
    for (cell, color) in terrain {
        draw_cell(scene, metrics, *cell, *color);
    }

    for line in hud_lines(scene).iter().chain(banner_line(scene).as_ref()) {
        draw_text_line(line, metrics);
    }
}

fn draw_cell(scene: &Scene, metrics: &SceneMetrics, cell: CellCoord, color: Color) {
    let origin = metrics.to_screen(scene.grid.cell_origin(cell));
    let side = scene.grid.cell_length * metrics.scale;
    macroquad::shapes::draw_rectangle(origin.x, origin.y, side, side, to_macroquad_color(color));
}

fn draw_text_line(line: &TextLine, metrics: &SceneMetrics) {
    // Macroquad anchors text at its baseline; lines are laid out by their top edge.
    let anchor = metrics.to_screen(line.position + Vec2::new(0.0, FONT_SIZE));
    let _ = macroquad::text::draw_text(
        &line.text,
        anchor.x,
        anchor.y,
        FONT_SIZE * metrics.scale,
        to_macroquad_color(line.color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
