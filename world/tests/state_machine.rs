use hiss_core::{
    CellCoord, Command, Difficulty, Direction, Event, Grid, Meal, MealValue, Phase, Rules,
};
use hiss_world::{self as world, query, World};

fn start(difficulty: Difficulty) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRound { difficulty }, &mut events);
    world
}

fn start_with_rules(rules: Rules, difficulty: Difficulty) -> World {
    let mut world = World::with_rules(rules);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRound { difficulty }, &mut events);
    world
}

fn tick(world: &mut World, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        world::apply(world, Command::Tick, &mut events);
    }
    events
}

fn place_meal(world: &mut World, column: u32, row: u32, value: MealValue) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlaceMeal {
            meal: Meal::new(CellCoord::new(column, row), value),
        },
        &mut events,
    );
    assert_eq!(events.len(), 1, "meal should be accepted");
}

fn steer(world: &mut World, direction: Direction) {
    let mut events = Vec::new();
    world::apply(world, Command::SteerSnake { direction }, &mut events);
}

/// Drives a freshly seeded snake to the home cell in the bottom-left corner.
///
/// Twenty-five ticks east wrap the head onto column zero, six ticks north then
/// wrap it through the top edge onto the last row.
fn drive_home(world: &mut World) -> Vec<Event> {
    let mut events = tick(world, 25);
    assert_eq!(query::snake_head(world), CellCoord::new(0, 5));
    steer(world, Direction::North);
    events.extend(tick(world, 6));
    events
}

#[test]
fn snake_length_never_changes() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 9, 5, MealValue::Two);

    for _ in 0..120 {
        let _ = tick(&mut world, 1);
        assert_eq!(query::snake_length(&world), 3);
        if query::phase(&world) != Phase::Running {
            break;
        }
    }
}

#[test]
fn head_wraps_through_right_edge() {
    let mut world = start(Difficulty::Easy);

    let _ = tick(&mut world, 24);
    assert_eq!(query::snake_head(&world), CellCoord::new(29, 5));

    let events = tick(&mut world, 1);
    assert_eq!(query::snake_head(&world), CellCoord::new(0, 5));
    assert_eq!(
        events,
        vec![Event::SnakeAdvanced {
            head: CellCoord::new(0, 5),
            vacated: CellCoord::new(27, 5),
        }]
    );
}

#[test]
fn reversal_request_is_discarded() {
    let mut world = start(Difficulty::Medium);
    steer(&mut world, Direction::West);

    let events = tick(&mut world, 1);

    assert_eq!(query::direction(&world), Direction::East);
    assert_eq!(query::snake_head(&world), CellCoord::new(6, 5));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::DirectionChanged { .. })));
}

#[test]
fn latest_steering_request_wins() {
    let mut world = start(Difficulty::Medium);
    steer(&mut world, Direction::North);
    steer(&mut world, Direction::South);

    let events = tick(&mut world, 1);

    assert_eq!(query::direction(&world), Direction::South);
    assert_eq!(query::snake_head(&world), CellCoord::new(5, 6));
    assert_eq!(
        events.first(),
        Some(&Event::DirectionChanged {
            direction: Direction::South
        })
    );
}

#[test]
fn pickup_starts_countdown_and_hides_meal() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Three);

    let events = tick(&mut world, 2);

    assert!(events.contains(&Event::MealPickedUp {
        value: MealValue::Three,
        timer_ticks: 64,
    }));
    assert_eq!(query::meal(&world), None);
    assert_eq!(query::carrying(&world), Some(MealValue::Three));
    assert_eq!(query::delivery_timer(&world), 63);
}

#[test]
fn revisiting_pickup_cell_changes_nothing() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Two);
    let _ = tick(&mut world, 2);
    assert_eq!(query::delivery_timer(&world), 63);

    // One full lap of the thirty-column grid brings the head back onto the pickup cell.
    let events = tick(&mut world, 30);

    assert_eq!(query::snake_head(&world), CellCoord::new(7, 5));
    assert_eq!(query::carrying(&world), Some(MealValue::Two));
    assert_eq!(query::delivery_timer(&world), 33);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MealPickedUp { .. })));
}

#[test]
fn second_meal_is_rejected_while_carrying() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::One);
    let _ = tick(&mut world, 2);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceMeal {
            meal: Meal::new(CellCoord::new(15, 15), MealValue::Two),
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(query::meal(&world), None);
}

#[test]
fn delivery_banks_points_and_raises_high_score() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Three);

    let events = drive_home(&mut world);

    assert_eq!(query::snake_head(&world), query::home(&world));
    assert!(events.contains(&Event::MealDelivered {
        value: MealValue::Three,
        score: 3,
        deliveries: 1,
    }));
    assert!(events.contains(&Event::HighScoreRaised { high_score: 3 }));
    assert_eq!(query::score(&world), 3);
    assert_eq!(query::high_score(&world), 3);
    assert_eq!(query::carrying(&world), None);
    assert_eq!(query::delivery_timer(&world), 0);
    assert_eq!(query::phase(&world), Phase::Running);
}

#[test]
fn reaching_home_empty_handed_banks_nothing() {
    let mut world = start(Difficulty::Easy);

    let events = drive_home(&mut world);

    assert_eq!(query::snake_head(&world), query::home(&world));
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::deliveries(&world), 0);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MealDelivered { .. })));
}

#[test]
fn expired_countdown_loses_round() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::One);

    let _ = tick(&mut world, 64);
    assert_eq!(query::phase(&world), Phase::Running);
    assert_eq!(query::delivery_timer(&world), 1);

    let events = tick(&mut world, 1);
    assert_eq!(
        &events[events.len() - 2..],
        &[
            Event::DeliveryExpired,
            Event::PhaseChanged { phase: Phase::Lost },
        ]
    );
    assert_eq!(query::phase(&world), Phase::Lost);
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::carrying(&world), Some(MealValue::One));
}

#[test]
fn idle_countdown_never_expires() {
    let mut world = start(Difficulty::Hard);

    let events = tick(&mut world, 200);

    assert_eq!(query::delivery_timer(&world), 0);
    assert_eq!(query::phase(&world), Phase::Running);
    assert!(!events.contains(&Event::DeliveryExpired));
}

#[test]
fn obstacle_collision_ends_round_with_head_on_obstacle() {
    let mut world = start(Difficulty::Easy);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceObstacles {
            cells: vec![CellCoord::new(8, 5)],
        },
        &mut events,
    );

    let events = tick(&mut world, 3);

    assert!(events.contains(&Event::ObstacleStruck {
        cell: CellCoord::new(8, 5)
    }));
    assert_eq!(query::phase(&world), Phase::Lost);
    assert_eq!(query::snake_head(&world), CellCoord::new(8, 5));
    assert_eq!(query::snake_length(&world), 3);

    let after = tick(&mut world, 5);
    assert!(after.is_empty(), "terminal phase must ignore ticks");
    assert_eq!(query::snake_head(&world), CellCoord::new(8, 5));
}

#[test]
fn obstacles_are_rejected_once_ticking_begins() {
    let mut world = start(Difficulty::Easy);
    let _ = tick(&mut world, 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceObstacles {
            cells: vec![CellCoord::new(20, 20)],
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(query::obstacles(&world).count(), 0);
}

#[test]
fn pause_freezes_the_round() {
    let mut world = start(Difficulty::Medium);
    place_meal(&mut world, 7, 5, MealValue::One);
    let _ = tick(&mut world, 2);
    let timer = query::delivery_timer(&world);
    let head = query::snake_head(&world);

    let mut events = Vec::new();
    world::apply(&mut world, Command::TogglePause, &mut events);
    assert_eq!(query::phase(&world), Phase::Paused);

    steer(&mut world, Direction::South);
    let frozen = tick(&mut world, 10);
    assert!(frozen.is_empty());
    assert_eq!(query::snake_head(&world), head);
    assert_eq!(query::delivery_timer(&world), timer);

    world::apply(&mut world, Command::TogglePause, &mut events);
    assert_eq!(query::phase(&world), Phase::Running);
    let _ = tick(&mut world, 1);
    assert_eq!(query::direction(&world), Direction::East);
    assert_eq!(query::delivery_timer(&world), timer - 1);
}

#[test]
fn pause_is_ignored_in_terminal_phases() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::One);
    let _ = tick(&mut world, 65);
    assert_eq!(query::phase(&world), Phase::Lost);

    let mut events = Vec::new();
    world::apply(&mut world, Command::TogglePause, &mut events);

    assert!(events.is_empty());
    assert_eq!(query::phase(&world), Phase::Lost);
}

#[test]
fn restart_resets_round_but_keeps_high_score() {
    let mut world = start(Difficulty::Hard);
    place_meal(&mut world, 7, 5, MealValue::Two);
    let _ = drive_home(&mut world);
    assert_eq!(query::high_score(&world), 2);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Restart, &mut events);

    assert_eq!(
        events.first(),
        Some(&Event::RoundStarted {
            difficulty: Difficulty::Hard
        })
    );
    assert_eq!(query::phase(&world), Phase::Running);
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::deliveries(&world), 0);
    assert_eq!(query::high_score(&world), 2);
    assert_eq!(query::snake_head(&world), CellCoord::new(5, 5));
    assert_eq!(query::direction(&world), Direction::East);
    assert_eq!(query::meal(&world), None);
}

#[test]
fn reaching_target_score_wins() {
    let rules = Rules::new(Grid::default(), 3, 8);
    let mut world = start_with_rules(rules, Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Three);

    let events = drive_home(&mut world);

    assert_eq!(
        events.last(),
        Some(&Event::PhaseChanged { phase: Phase::Won })
    );
    assert_eq!(query::phase(&world), Phase::Won);
    assert!(tick(&mut world, 3).is_empty());
}

#[test]
fn medium_round_scales_countdown_by_tick_rate() {
    let mut world = start(Difficulty::Medium);
    place_meal(&mut world, 6, 5, MealValue::One);

    let events = tick(&mut world, 1);

    assert!(events.contains(&Event::MealPickedUp {
        value: MealValue::One,
        timer_ticks: 96,
    }));
    assert_eq!(query::delivery_timer(&world), 95);
}

#[test]
fn snapshot_mirrors_individual_queries() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Two);
    let _ = tick(&mut world, 2);

    let snapshot = query::snapshot(&world);

    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.difficulty, Some(Difficulty::Easy));
    assert_eq!(snapshot.snake, query::snake(&world).collect::<Vec<_>>());
    assert_eq!(snapshot.snake[0], CellCoord::new(7, 5));
    assert_eq!(snapshot.meal, None);
    assert_eq!(snapshot.carrying, Some(MealValue::Two));
    assert_eq!(snapshot.delivery_timer, 63);
    assert_eq!(snapshot.target_score, 50);
    assert_eq!(snapshot.home, CellCoord::new(0, 29));
}

#[test]
fn blocked_cells_cover_snake_obstacles_and_home() {
    let mut world = start(Difficulty::Easy);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceObstacles {
            cells: vec![CellCoord::new(12, 12)],
        },
        &mut events,
    );

    assert!(query::is_blocked(&world, CellCoord::new(4, 5)));
    assert!(query::is_blocked(&world, CellCoord::new(12, 12)));
    assert!(query::is_blocked(&world, CellCoord::new(0, 29)));
    assert!(!query::is_blocked(&world, CellCoord::new(13, 12)));
}

#[test]
fn default_target_score_wins_after_seventeen_bonus_deliveries() {
    let mut world = start(Difficulty::Easy);
    place_meal(&mut world, 7, 5, MealValue::Three);
    let _ = drive_home(&mut world);
    assert_eq!(query::score(&world), 3);

    // Heading north from home, pick up just above it and lap the column back down.
    let events = loop {
        place_meal(&mut world, 0, 28, MealValue::Three);
        let events = tick(&mut world, 30);
        assert_eq!(query::snake_head(&world), query::home(&world));
        if query::phase(&world) != Phase::Running {
            break events;
        }
    };

    assert_eq!(query::score(&world), 51);
    assert_eq!(query::deliveries(&world), 17);
    assert_eq!(query::high_score(&world), 51);
    assert_eq!(query::phase(&world), Phase::Won);
    assert_eq!(
        events.last(),
        Some(&Event::PhaseChanged { phase: Phase::Won })
    );
    assert!(tick(&mut world, 1).is_empty());
}
