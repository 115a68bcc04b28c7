#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hiss & Go Seek engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Hiss & Go Seek";

/// Score that ends a round in victory unless configured otherwise.
pub const DEFAULT_TARGET_SCORE: u32 = 50;

/// Seconds the snake has to bring a picked-up meal home.
pub const DEFAULT_DELIVERY_SECONDS: u32 = 8;

/// Number of static obstacles scattered across the grid at round start.
pub const DEFAULT_OBSTACLE_COUNT: u32 = 8;

/// Side length of a grid cell in pixels.
pub const DEFAULT_CELL_LENGTH: u32 = 20;

/// Number of cell columns in the default 600 pixel wide play area.
pub const DEFAULT_GRID_COLUMNS: u32 = 30;

/// Number of cell rows in the default 600 pixel tall play area.
pub const DEFAULT_GRID_ROWS: u32 = 30;

/// Cells occupied by the snake when a round starts, head first.
pub const SNAKE_SEED: [CellCoord; 3] = [
    CellCoord::new(5, 5),
    CellCoord::new(4, 5),
    CellCoord::new(3, 5),
];

/// Heading of the snake when a round starts.
pub const SNAKE_SEED_DIRECTION: Direction = Direction::East;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Installs new round rules and returns the world to the menu.
    Configure {
        /// Rules applied to every subsequent round.
        rules: Rules,
    },
    /// Starts a fresh round at the provided difficulty.
    StartRound {
        /// Difficulty that governs the tick rate of the round.
        difficulty: Difficulty,
    },
    /// Starts a fresh round at the difficulty of the current one.
    Restart,
    /// Scatters the round's static obstacles.
    PlaceObstacles {
        /// Cells that become impassable for the rest of the round.
        cells: Vec<CellCoord>,
    },
    /// Places the next meal onto the grid.
    PlaceMeal {
        /// Meal to expose for pickup.
        meal: Meal,
    },
    /// Requests that the snake turn on the next tick.
    SteerSnake {
        /// Heading requested by the player.
        direction: Direction,
    },
    /// Pauses a running round or resumes a paused one.
    TogglePause,
    /// Advances the running round by a single tick.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh round began.
    RoundStarted {
        /// Difficulty selected for the round.
        difficulty: Difficulty,
    },
    /// Announces that the world entered a new phase.
    PhaseChanged {
        /// Phase that became active after processing the command.
        phase: Phase,
    },
    /// Confirms that a queued turn was applied.
    DirectionChanged {
        /// Heading the snake follows from now on.
        direction: Direction,
    },
    /// Confirms that the snake slid forward by one cell.
    SnakeAdvanced {
        /// Cell now occupied by the head.
        head: CellCoord,
        /// Cell released by the tail.
        vacated: CellCoord,
    },
    /// Reports that the head moved onto an obstacle.
    ObstacleStruck {
        /// Obstacle cell hit by the head.
        cell: CellCoord,
    },
    /// Confirms that the round's obstacles were scattered.
    ObstaclesPlaced {
        /// Number of obstacles accepted by the world.
        count: usize,
    },
    /// Confirms that a meal became available for pickup.
    MealPlaced {
        /// Meal placed onto the grid.
        meal: Meal,
    },
    /// Reports that the snake picked up the meal.
    MealPickedUp {
        /// Value now carried by the snake.
        value: MealValue,
        /// Ticks available to bring the meal home.
        timer_ticks: u32,
    },
    /// Reports that the carried meal reached home.
    MealDelivered {
        /// Value banked by the delivery.
        value: MealValue,
        /// Score after the delivery.
        score: u32,
        /// Number of deliveries completed during the round.
        deliveries: u32,
    },
    /// Reports that the session high score improved.
    HighScoreRaised {
        /// New high score.
        high_score: u32,
    },
    /// Reports that the delivery countdown ran out while carrying a meal.
    DeliveryExpired,
}

/// Phases of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to pick a difficulty.
    Menu,
    /// A round is in progress.
    Running,
    /// A round is frozen until resumed.
    Paused,
    /// The round ended after reaching the target score.
    Won,
    /// The round ended after a collision or a missed delivery.
    Lost,
}

impl Phase {
    /// Reports whether the phase ends the round until an explicit restart.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Difficulty levels selectable from the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Eight ticks per second.
    Easy,
    /// Twelve ticks per second.
    Medium,
    /// Eighteen ticks per second.
    Hard,
}

impl Difficulty {
    /// Every difficulty in menu order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Number of ticks the state machine runs per second.
    ///
    /// The same rate scales the delivery countdown, so the wall-clock time
    /// available for a delivery is identical at every difficulty.
    #[must_use]
    pub const fn tick_rate(self) -> u32 {
        match self {
            Self::Easy => 8,
            Self::Medium => 12,
            Self::Hard => 18,
        }
    }

    /// Human readable name shown on the menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// Axis along which a direction moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Movement along columns.
    Horizontal,
    /// Movement along rows.
    Vertical,
}

/// Cardinal headings available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit vector of the heading expressed as column and row deltas.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Axis the heading moves along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::East | Self::West => Axis::Horizontal,
            Self::North | Self::South => Axis::Vertical,
        }
    }

    /// Reports whether the snake may switch from `self` to `next`.
    ///
    /// Only perpendicular turns change the heading; a request along the
    /// current axis is either a no-op or a reversal and is never applied.
    #[must_use]
    pub fn turns_to(self, next: Direction) -> bool {
        self.axis() != next.axis()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Describes the discrete cell layout of the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_length: u32,
}

impl Grid {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_length: u32) -> Self {
        Self {
            columns,
            rows,
            cell_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in pixels.
    #[must_use]
    pub const fn cell_length(&self) -> u32 {
        self.cell_length
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.columns * self.cell_length
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.rows * self.cell_length
    }

    /// Number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Bottom-left cell of the grid, used as the delivery point.
    #[must_use]
    pub const fn bottom_left(&self) -> CellCoord {
        CellCoord::new(0, self.rows.saturating_sub(1))
    }

    /// Pixel position of the cell's top-left corner.
    #[must_use]
    pub const fn to_pixel(&self, cell: CellCoord) -> (u32, u32) {
        (
            cell.column() * self.cell_length,
            cell.row() * self.cell_length,
        )
    }

    /// Steps from `cell` one unit along `direction`, wrapping around the edges.
    ///
    /// Leaving the grid on one side re-enters on the opposite side. A grid
    /// without cells on an axis leaves that coordinate untouched.
    #[must_use]
    pub fn wrap(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        let (column_delta, row_delta) = direction.delta();
        CellCoord::new(
            wrap_axis(cell.column(), column_delta, self.columns),
            wrap_axis(cell.row(), row_delta, self.rows),
        )
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_CELL_LENGTH)
    }
}

fn wrap_axis(value: u32, delta: i32, count: u32) -> u32 {
    if count == 0 {
        return value;
    }

    let shifted = i64::from(value) + i64::from(delta);
    let wrapped = shifted.rem_euclid(i64::from(count));
    u32::try_from(wrapped).unwrap_or(0)
}

/// Point value of a meal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealValue {
    /// Common meal worth a single point.
    One,
    /// Uncommon meal worth two points.
    Two,
    /// Rare meal worth three points.
    Three,
}

impl MealValue {
    /// Every meal value ordered by points.
    pub const ALL: [MealValue; 3] = [Self::One, Self::Two, Self::Three];

    /// Points banked when the meal is delivered.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Resolves the meal value worth the provided number of points.
    #[must_use]
    pub const fn from_points(points: u32) -> Option<Self> {
        match points {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }
}

/// Meal waiting on the grid for pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meal {
    cell: CellCoord,
    value: MealValue,
}

impl Meal {
    /// Creates a meal located at `cell` worth `value`.
    #[must_use]
    pub const fn new(cell: CellCoord, value: MealValue) -> Self {
        Self { cell, value }
    }

    /// Cell occupied by the meal.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Point value of the meal.
    #[must_use]
    pub const fn value(&self) -> MealValue {
        self.value
    }
}

/// Tunable constants applied to every round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rules {
    grid: Grid,
    target_score: u32,
    delivery_seconds: u32,
}

impl Rules {
    /// Creates a new rule set.
    #[must_use]
    pub const fn new(grid: Grid, target_score: u32, delivery_seconds: u32) -> Self {
        Self {
            grid,
            target_score,
            delivery_seconds,
        }
    }

    /// Grid the round is played on.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Score that wins the round.
    #[must_use]
    pub const fn target_score(&self) -> u32 {
        self.target_score
    }

    /// Wall-clock seconds available for a delivery.
    #[must_use]
    pub const fn delivery_seconds(&self) -> u32 {
        self.delivery_seconds
    }

    /// Length of the delivery countdown in ticks at the provided difficulty.
    #[must_use]
    pub const fn delivery_ticks(&self, difficulty: Difficulty) -> u32 {
        self.delivery_seconds.saturating_mul(difficulty.tick_rate())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(
            Grid::default(),
            DEFAULT_TARGET_SCORE,
            DEFAULT_DELIVERY_SECONDS,
        )
    }
}
