#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Hiss & Go Seek adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use hiss_core::{CellCoord, Difficulty, Direction, Grid, Meal, MealValue};
use std::{error::Error, fmt, time::Duration};

/// Remaining seconds at or below which the delivery countdown turns urgent.
pub const URGENT_SECONDS: u32 = 3;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Colors used to paint every element of the play area and its overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Clear color behind the grid.
    pub background: Color,
    /// Body segments of the snake.
    pub snake_body: Color,
    /// Head segment of the snake.
    pub snake_head: Color,
    /// Eyes painted on the head.
    pub snake_eyes: Color,
    /// Static obstacles.
    pub obstacle: Color,
    /// Delivery point.
    pub home: Color,
    /// One point meals.
    pub meal_one: Color,
    /// Two point meals.
    pub meal_two: Color,
    /// Three point meals.
    pub meal_three: Color,
    /// Menu and default text.
    pub text: Color,
    /// Score line and relaxed countdown.
    pub hud: Color,
    /// Countdown once few seconds remain.
    pub urgent: Color,
    /// Pause banner.
    pub paused: Color,
    /// Victory banner.
    pub won: Color,
    /// Defeat banner.
    pub lost: Color,
}

impl Palette {
    /// Arcade palette the game ships with.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            background: Color::from_rgb_u8(0, 0, 0),
            snake_body: Color::from_rgb_u8(0, 200, 0),
            snake_head: Color::from_rgb_u8(50, 255, 50),
            snake_eyes: Color::from_rgb_u8(204, 102, 0),
            obstacle: Color::from_rgb_u8(0, 255, 255),
            home: Color::from_rgb_u8(100, 100, 100),
            meal_one: Color::from_rgb_u8(255, 176, 156),
            meal_two: Color::from_rgb_u8(255, 255, 150),
            meal_three: Color::from_rgb_u8(204, 102, 0),
            text: Color::from_rgb_u8(255, 255, 255),
            hud: Color::from_rgb_u8(255, 105, 180),
            urgent: Color::from_rgb_u8(255, 0, 0),
            paused: Color::from_rgb_u8(255, 0, 0),
            won: Color::from_rgb_u8(255, 215, 0),
            lost: Color::from_rgb_u8(139, 0, 0),
        }
    }

    /// Color of a meal worth the provided value.
    #[must_use]
    pub const fn meal(&self, value: MealValue) -> Color {
        match value {
            MealValue::One => self.meal_one,
            MealValue::Two => self.meal_two,
            MealValue::Three => self.meal_three,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Heading requested by the most recent arrow key press on this frame.
    pub direction: Option<Direction>,
    /// Difficulty picked from the menu on this frame.
    pub difficulty: Option<Difficulty>,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
    /// Whether the adapter detected a pause toggle on this frame.
    pub pause_toggle: bool,
    /// Whether the adapter detected a music toggle on this frame.
    pub music_toggle: bool,
}

/// Pixel layout of the grid the scene is drawn on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a cell in pixels.
    pub cell_length: f32,
}

impl GridPresentation {
    /// Creates a new grid presentation descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidCellLength`] when the cell length is
    /// not a positive number.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if cell_length.is_nan() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Describes the provided world grid.
    ///
    /// # Errors
    ///
    /// Propagates the validation performed by [`GridPresentation::new`].
    pub fn from_grid(grid: Grid) -> std::result::Result<Self, RenderingError> {
        Self::new(grid.columns(), grid.rows(), grid.cell_length() as f32)
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Top-left corner of the cell in pixels.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_length,
            cell.row() as f32 * self.cell_length,
        )
    }
}

/// Delivery countdown as shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    /// Whole seconds left, rounded down.
    pub seconds_left: u32,
    /// Whether the countdown should be highlighted.
    pub urgent: bool,
}

impl Countdown {
    /// Converts remaining ticks into a countdown for the given tick rate.
    ///
    /// Returns `None` when no countdown is running.
    #[must_use]
    pub fn from_ticks(ticks_left: u32, tick_rate: u32) -> Option<Self> {
        if ticks_left == 0 || tick_rate == 0 {
            return None;
        }

        Some(Self {
            seconds_left: ticks_left / tick_rate,
            urgent: ticks_left <= URGENT_SECONDS.saturating_mul(tick_rate),
        })
    }
}

/// Score line drawn above the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HudPresentation {
    /// Score banked during the round.
    pub score: u32,
    /// Score that wins the round.
    pub target_score: u32,
    /// Best score of the session.
    pub high_score: u32,
    /// Delivery countdown while a meal is carried.
    pub countdown: Option<Countdown>,
}

/// Banner drawn over the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// Difficulty selection screen.
    Menu,
    /// Round is frozen.
    Paused,
    /// Round ended in victory.
    Won,
    /// Round ended in defeat.
    Lost,
}

/// Describes the state of the game that should be rendered for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid the play area is laid out on.
    pub grid: GridPresentation,
    /// Colors used for every element.
    pub palette: Palette,
    /// Snake cells, head first.
    pub snake: Vec<CellCoord>,
    /// Static obstacles.
    pub obstacles: Vec<CellCoord>,
    /// Delivery point.
    pub home: CellCoord,
    /// Meal waiting for pickup.
    pub meal: Option<Meal>,
    /// Score line contents.
    pub hud: HudPresentation,
    /// Banner covering the play area, if any.
    pub overlay: Option<Overlay>,
    /// Whether background music is switched on.
    pub music_enabled: bool,
}

impl Scene {
    /// Creates an empty scene showing the menu.
    #[must_use]
    pub fn new(grid: GridPresentation, palette: Palette, home: CellCoord) -> Self {
        Self {
            grid,
            palette,
            snake: Vec::new(),
            obstacles: Vec::new(),
            home,
            meal: None,
            hud: HudPresentation::default(),
            overlay: Some(Overlay::Menu),
            music_enabled: false,
        }
    }

    /// Cell occupied by the snake's head, if the snake is shown.
    #[must_use]
    pub fn snake_head(&self) -> Option<CellCoord> {
        self.snake.first().copied()
    }
}

/// Top-level descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Hiss & Go Seek scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the elapsed frame time and
    /// the input captured by the adapter, and refreshes the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cells must have a positive side length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
