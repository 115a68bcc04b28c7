#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded placement system that scatters obstacles and spawns meals.

use std::collections::BTreeSet;

use hiss_core::{CellCoord, Command, Event, Grid, Meal, MealValue};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Percentage chance of each meal value when no bonus is due.
const MEAL_WEIGHTS: [(MealValue, u32); 3] = [
    (MealValue::One, 70),
    (MealValue::Two, 20),
    (MealValue::Three, 10),
];

/// Every delivery count divisible by this guarantees a high-value meal.
const BONUS_INTERVAL: u32 = 10;

/// Random probes attempted before falling back to a full scan of the grid.
const MAX_PROBES: usize = 256;

/// Configuration parameters required to construct the placement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    obstacle_count: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided obstacle count and seed.
    #[must_use]
    pub const fn new(obstacle_count: u32, rng_seed: u64) -> Self {
        Self {
            obstacle_count,
            rng_seed,
        }
    }

    /// Number of obstacles scattered at the start of every round.
    #[must_use]
    pub const fn obstacle_count(&self) -> u32 {
        self.obstacle_count
    }

    /// Seed feeding the placement random number generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Pure system that reacts to round and delivery events with placement commands.
#[derive(Debug)]
pub struct Placement {
    obstacle_count: u32,
    rng: ChaCha8Rng,
}

impl Placement {
    /// Creates a new placement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            obstacle_count: config.obstacle_count,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and emits obstacle and meal placements.
    ///
    /// `is_blocked` must report cells occupied by the snake, obstacles or the
    /// home cell as observed after the events were produced.
    pub fn handle<F>(&mut self, events: &[Event], grid: Grid, is_blocked: F, out: &mut Vec<Command>)
    where
        F: Fn(CellCoord) -> bool,
    {
        for event in events {
            match event {
                Event::RoundStarted { .. } => self.populate_round(grid, &is_blocked, out),
                Event::MealDelivered { deliveries, .. } => {
                    if let Some(meal) = self.next_meal(grid, &is_blocked, *deliveries) {
                        out.push(Command::PlaceMeal { meal });
                    }
                }
                _ => {}
            }
        }
    }

    fn populate_round<F>(&mut self, grid: Grid, is_blocked: &F, out: &mut Vec<Command>)
    where
        F: Fn(CellCoord) -> bool,
    {
        let mut taken = BTreeSet::new();
        for _ in 0..self.obstacle_count {
            let candidate =
                random_free_cell(&mut self.rng, grid, |cell| is_blocked(cell) || taken.contains(&cell));
            match candidate {
                Some(cell) => {
                    let _ = taken.insert(cell);
                }
                None => break,
            }
        }

        out.push(Command::PlaceObstacles {
            cells: taken.iter().copied().collect(),
        });

        let blocked = |cell: CellCoord| is_blocked(cell) || taken.contains(&cell);
        if let Some(meal) = self.next_meal(grid, &blocked, 0) {
            out.push(Command::PlaceMeal { meal });
        }
    }

    fn next_meal<F>(&mut self, grid: Grid, is_blocked: &F, deliveries: u32) -> Option<Meal>
    where
        F: Fn(CellCoord) -> bool,
    {
        let value = meal_value(&mut self.rng, deliveries);
        let cell = random_free_cell(&mut self.rng, grid, is_blocked)?;
        Some(Meal::new(cell, value))
    }
}

/// Draws the value of the next meal given the number of completed deliveries.
///
/// Every tenth delivery guarantees a two or three point meal with equal odds;
/// otherwise one, two and three points are drawn at 70, 20 and 10 percent.
pub fn meal_value<R: Rng>(rng: &mut R, deliveries: u32) -> MealValue {
    if deliveries > 0 && deliveries % BONUS_INTERVAL == 0 {
        return if rng.gen_bool(0.5) {
            MealValue::Two
        } else {
            MealValue::Three
        };
    }

    let mut roll = rng.gen_range(0..100);
    for (value, weight) in MEAL_WEIGHTS {
        if roll < weight {
            return value;
        }
        roll -= weight;
    }
    MealValue::One
}

/// Picks a uniformly random cell for which `is_blocked` reports `false`.
///
/// Returns `None` when every cell of the grid is blocked.
pub fn random_free_cell<R, F>(rng: &mut R, grid: Grid, is_blocked: F) -> Option<CellCoord>
where
    R: Rng,
    F: Fn(CellCoord) -> bool,
{
    if grid.columns() == 0 || grid.rows() == 0 {
        return None;
    }

    for _ in 0..MAX_PROBES {
        let cell = CellCoord::new(
            rng.gen_range(0..grid.columns()),
            rng.gen_range(0..grid.rows()),
        );
        if !is_blocked(cell) {
            return Some(cell);
        }
    }

    // Crowded grid: pick among the remaining cells directly.
    let free: Vec<CellCoord> = grid.cells().filter(|cell| !is_blocked(*cell)).collect();
    if free.is_empty() {
        return None;
    }
    Some(free[rng.gen_range(0..free.len())])
}
