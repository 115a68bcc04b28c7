#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Hiss & Go Seek.

use std::collections::{BTreeSet, VecDeque};

use hiss_core::{
    CellCoord, Command, Difficulty, Direction, Event, Grid, Meal, MealValue, Phase, Rules,
    SNAKE_SEED, SNAKE_SEED_DIRECTION,
};

/// Represents the authoritative Hiss & Go Seek world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    phase: Phase,
    difficulty: Option<Difficulty>,
    snake: Snake,
    pending_direction: Option<Direction>,
    obstacles: BTreeSet<CellCoord>,
    /// Set once obstacles arrive or the first tick runs; later placements are ignored.
    obstacles_closed: bool,
    home: CellCoord,
    meal: Option<Meal>,
    carrying: Option<MealValue>,
    timer: u32,
    score: u32,
    high_score: u32,
    deliveries: u32,
}

impl World {
    /// Creates a new world waiting on the menu with the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new world waiting on the menu with the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        let grid = rules.grid();
        Self {
            rules,
            phase: Phase::Menu,
            difficulty: None,
            snake: Snake::seeded(grid),
            pending_direction: None,
            obstacles: BTreeSet::new(),
            obstacles_closed: false,
            home: grid.bottom_left(),
            meal: None,
            carrying: None,
            timer: 0,
            score: 0,
            high_score: 0,
            deliveries: 0,
        }
    }

    fn reset_round(&mut self) {
        let grid = self.rules.grid();
        self.snake = Snake::seeded(grid);
        self.pending_direction = None;
        self.obstacles.clear();
        self.obstacles_closed = false;
        self.home = grid.bottom_left();
        self.meal = None;
        self.carrying = None;
        self.timer = 0;
        self.score = 0;
        self.deliveries = 0;
    }

    fn start_round(&mut self, difficulty: Difficulty, out_events: &mut Vec<Event>) {
        self.difficulty = Some(difficulty);
        self.reset_round();
        out_events.push(Event::RoundStarted { difficulty });
        self.set_phase(Phase::Running, out_events);
    }

    fn set_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        if self.phase != phase {
            self.phase = phase;
            out_events.push(Event::PhaseChanged { phase });
        }
    }

    fn is_blocked(&self, cell: CellCoord) -> bool {
        cell == self.home || self.obstacles.contains(&cell) || self.snake.occupies(cell)
    }

    fn place_obstacles(&mut self, cells: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        if self.obstacles_closed || !self.is_in_round() {
            return;
        }

        let grid = self.rules.grid();
        let meal_cell = self.meal.map(|meal| meal.cell());
        for cell in cells {
            if !grid.contains(cell) || self.is_blocked(cell) || Some(cell) == meal_cell {
                continue;
            }
            let _ = self.obstacles.insert(cell);
        }

        self.obstacles_closed = true;
        out_events.push(Event::ObstaclesPlaced {
            count: self.obstacles.len(),
        });
    }

    fn place_meal(&mut self, meal: Meal, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Menu || self.meal.is_some() || self.carrying.is_some() {
            return;
        }

        let cell = meal.cell();
        if !self.rules.grid().contains(cell) || self.is_blocked(cell) {
            return;
        }

        self.meal = Some(meal);
        out_events.push(Event::MealPlaced { meal });
    }

    fn is_in_round(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Running {
            return;
        }
        self.obstacles_closed = true;

        if let Some(requested) = self.pending_direction.take() {
            if self.snake.direction.turns_to(requested) {
                self.snake.direction = requested;
                out_events.push(Event::DirectionChanged {
                    direction: requested,
                });
            }
        }

        let head = self.rules.grid().wrap(self.snake.head(), self.snake.direction);

        let mut lost = false;
        if self.obstacles.contains(&head) {
            lost = true;
            out_events.push(Event::ObstacleStruck { cell: head });
        }

        // The move commits even on a fatal tick so the head is shown on the obstacle.
        if let Some(vacated) = self.snake.advance(head) {
            out_events.push(Event::SnakeAdvanced { head, vacated });
        }

        if let Some(meal) = self.meal.filter(|meal| meal.cell() == head) {
            let timer_ticks = self.rules.delivery_ticks(self.current_difficulty());
            self.meal = None;
            self.carrying = Some(meal.value());
            self.timer = timer_ticks;
            out_events.push(Event::MealPickedUp {
                value: meal.value(),
                timer_ticks,
            });
        }

        if head == self.home {
            if let Some(value) = self.carrying.take() {
                self.deliver(value, out_events);
            }
        }

        if self.timer > 0 {
            self.timer -= 1;
            if self.timer == 0 && self.carrying.is_some() {
                lost = true;
                out_events.push(Event::DeliveryExpired);
            }
        }

        if self.score >= self.rules.target_score() {
            self.set_phase(Phase::Won, out_events);
        } else if lost {
            self.set_phase(Phase::Lost, out_events);
        }
    }

    fn deliver(&mut self, value: MealValue, out_events: &mut Vec<Event>) {
        self.score = self.score.saturating_add(value.points());
        self.timer = 0;
        self.deliveries = self.deliveries.saturating_add(1);
        out_events.push(Event::MealDelivered {
            value,
            score: self.score,
            deliveries: self.deliveries,
        });

        if self.score > self.high_score {
            self.high_score = self.score;
            out_events.push(Event::HighScoreRaised {
                high_score: self.high_score,
            });
        }
    }

    fn current_difficulty(&self) -> Difficulty {
        self.difficulty.unwrap_or(Difficulty::Medium)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Configure { rules } => {
            world.rules = rules;
            world.difficulty = None;
            world.reset_round();
            world.set_phase(Phase::Menu, out_events);
        }
        Command::StartRound { difficulty } => {
            world.start_round(difficulty, out_events);
        }
        Command::Restart => {
            if world.phase == Phase::Menu {
                return;
            }
            if let Some(difficulty) = world.difficulty {
                world.start_round(difficulty, out_events);
            }
        }
        Command::PlaceObstacles { cells } => {
            world.place_obstacles(cells, out_events);
        }
        Command::PlaceMeal { meal } => {
            world.place_meal(meal, out_events);
        }
        Command::SteerSnake { direction } => {
            if world.phase == Phase::Running {
                world.pending_direction = Some(direction);
            }
        }
        Command::TogglePause => match world.phase {
            Phase::Running => world.set_phase(Phase::Paused, out_events),
            Phase::Paused => world.set_phase(Phase::Running, out_events),
            Phase::Menu | Phase::Won | Phase::Lost => {}
        },
        Command::Tick => world.tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use hiss_core::{CellCoord, Difficulty, Direction, Grid, Meal, MealValue, Phase, Rules};

    /// Phase the session is currently in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Difficulty of the current or most recent round, if one was started.
    #[must_use]
    pub fn difficulty(world: &World) -> Option<Difficulty> {
        world.difficulty
    }

    /// Rules applied to the current round.
    #[must_use]
    pub fn rules(world: &World) -> Rules {
        world.rules
    }

    /// Grid the current round is played on.
    #[must_use]
    pub fn grid(world: &World) -> Grid {
        world.rules.grid()
    }

    /// Cells occupied by the snake, head first.
    pub fn snake(world: &World) -> impl Iterator<Item = CellCoord> + '_ {
        world.snake.body.iter().copied()
    }

    /// Cell occupied by the snake's head.
    #[must_use]
    pub fn snake_head(world: &World) -> CellCoord {
        world.snake.head()
    }

    /// Number of cells the snake occupies.
    #[must_use]
    pub fn snake_length(world: &World) -> usize {
        world.snake.body.len()
    }

    /// Heading the snake currently follows.
    #[must_use]
    pub fn direction(world: &World) -> Direction {
        world.snake.direction
    }

    /// Obstacles scattered for the current round in row-major order.
    pub fn obstacles(world: &World) -> impl Iterator<Item = CellCoord> + '_ {
        world.obstacles.iter().copied()
    }

    /// Delivery point of the round.
    #[must_use]
    pub fn home(world: &World) -> CellCoord {
        world.home
    }

    /// Meal waiting for pickup, if any is visible.
    #[must_use]
    pub fn meal(world: &World) -> Option<Meal> {
        world.meal
    }

    /// Meal value the snake is carrying, if any.
    #[must_use]
    pub fn carrying(world: &World) -> Option<MealValue> {
        world.carrying
    }

    /// Remaining ticks of the delivery countdown; zero when inactive.
    #[must_use]
    pub fn delivery_timer(world: &World) -> u32 {
        world.timer
    }

    /// Score banked during the current round.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Highest score reached during this session.
    #[must_use]
    pub fn high_score(world: &World) -> u32 {
        world.high_score
    }

    /// Deliveries completed during the current round.
    #[must_use]
    pub fn deliveries(world: &World) -> u32 {
        world.deliveries
    }

    /// Reports whether the cell is taken by the snake, an obstacle, or home.
    ///
    /// Placement systems use this to keep new obstacles and meals off
    /// occupied cells.
    #[must_use]
    pub fn is_blocked(world: &World, cell: CellCoord) -> bool {
        world.is_blocked(cell)
    }

    /// Values required to present a single frame of the session.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct SessionSnapshot {
        /// Phase the session is in.
        pub phase: Phase,
        /// Difficulty of the current or most recent round.
        pub difficulty: Option<Difficulty>,
        /// Snake cells, head first.
        pub snake: Vec<CellCoord>,
        /// Heading of the snake.
        pub direction: Direction,
        /// Obstacles in row-major order.
        pub obstacles: Vec<CellCoord>,
        /// Delivery point.
        pub home: CellCoord,
        /// Meal waiting for pickup.
        pub meal: Option<Meal>,
        /// Meal value being carried.
        pub carrying: Option<MealValue>,
        /// Remaining ticks of the delivery countdown.
        pub delivery_timer: u32,
        /// Score banked during the round.
        pub score: u32,
        /// Score that wins the round.
        pub target_score: u32,
        /// Best score of the session.
        pub high_score: u32,
    }

    /// Captures everything the presentation layer reads in one pass.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            phase: world.phase,
            difficulty: world.difficulty,
            snake: snake(world).collect(),
            direction: world.snake.direction,
            obstacles: obstacles(world).collect(),
            home: world.home,
            meal: world.meal,
            carrying: world.carrying,
            delivery_timer: world.timer,
            score: world.score,
            target_score: world.rules.target_score(),
            high_score: world.high_score,
        }
    }
}

#[derive(Clone, Debug)]
struct Snake {
    body: VecDeque<CellCoord>,
    direction: Direction,
}

impl Snake {
    fn seeded(grid: Grid) -> Self {
        let body = SNAKE_SEED
            .iter()
            .map(|cell| fit_to_grid(*cell, grid))
            .collect();
        Self {
            body,
            direction: SNAKE_SEED_DIRECTION,
        }
    }

    fn head(&self) -> CellCoord {
        self.body.front().copied().unwrap_or(SNAKE_SEED[0])
    }

    fn occupies(&self, cell: CellCoord) -> bool {
        self.body.contains(&cell)
    }

    /// Slides the body forward, returning the released tail cell.
    fn advance(&mut self, head: CellCoord) -> Option<CellCoord> {
        self.body.push_front(head);
        self.body.pop_back()
    }
}

fn fit_to_grid(cell: CellCoord, grid: Grid) -> CellCoord {
    let column = if grid.columns() == 0 {
        0
    } else {
        cell.column() % grid.columns()
    };
    let row = if grid.rows() == 0 {
        0
    } else {
        cell.row() % grid.rows()
    };
    CellCoord::new(column, row)
}
