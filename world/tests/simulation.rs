//! Step-level scenarios driven through the command surface.
//!
//! Every scenario uses a zero-delay clock so each `FrameTick` past the first
//! fires a step, and parks the food on a known cell via the scaffolding
//! feature so the RNG cannot interfere with the path under test.

use grid_snake_core::{palette, BoardConfig, Command, Direction, Event, GameOverCause, GridVec3};
use grid_snake_world::{apply, query, scaffold, World};

const FAST: BoardConfig = BoardConfig::new(20, 20, 0, 0, 1000);

/// Out-of-the-way cell the scripted paths never cross.
const PARKED_FOOD: GridVec3 = GridVec3::new(0.0, 0.0, 0.0);

fn fast_world(seed: u64) -> World {
    let mut world = World::with_config(FAST, seed);
    scaffold::place_food(&mut world, PARKED_FOOD);
    world
}

fn queue(world: &mut World, direction: Direction) {
    let mut events = Vec::new();
    apply(world, Command::QueueDirection { direction }, &mut events);
    assert!(events.is_empty(), "queueing must not emit events");
}

/// Ticks frames until a step fires, returning the events it produced.
fn advance_step(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..64 {
        apply(world, Command::FrameTick, &mut events);
        if !events.is_empty() {
            return events;
        }
    }
    panic!("no simulation step fired within 64 frames");
}

fn cell(x: f32, y: f32) -> GridVec3 {
    GridVec3::new(x, y, 0.0)
}

#[test]
fn head_advances_one_cell_per_step() {
    let mut world = fast_world(1);

    let events = advance_step(&mut world);

    assert_eq!(events, vec![Event::Stepped { head: cell(11.0, 10.0) }]);
    assert_eq!(query::head(&world).position, cell(11.0, 10.0));
}

#[test]
fn bare_head_may_reverse_direction() {
    let mut world = fast_world(2);

    queue(&mut world, Direction::Left);
    let _ = advance_step(&mut world);

    assert_eq!(query::head(&world).position, cell(9.0, 10.0));
    assert_eq!(query::head(&world).direction, Direction::Left.unit_vector());
}

#[test]
fn reversal_is_rejected_once_tail_exists() {
    let mut world = fast_world(3);
    scaffold::extend_tail(&mut world, 1);

    queue(&mut world, Direction::Left);
    let _ = advance_step(&mut world);

    assert_eq!(query::head(&world).direction, Direction::Right.unit_vector());
    assert_eq!(query::head(&world).position, cell(11.0, 10.0));
}

#[test]
fn perpendicular_turn_applies_with_tail() {
    let mut world = fast_world(3);
    scaffold::extend_tail(&mut world, 1);

    queue(&mut world, Direction::Up);
    let _ = advance_step(&mut world);

    assert_eq!(query::head(&world).position, cell(10.0, 11.0));
}

#[test]
fn tail_segments_follow_their_leader() {
    let mut world = fast_world(5);
    scaffold::extend_tail(&mut world, 3);

    let view = query::entities(&world);
    let head_index = view.head_index();
    let before: Vec<_> = view.iter().map(|entity| entity.position).collect();

    let _ = advance_step(&mut world);

    let view = query::entities(&world);
    for index in head_index + 1..view.len() {
        let segment = view.get(index).expect("segment present");
        assert_eq!(
            segment.position,
            before[index - 1],
            "segment {index} must take its leader's previous cell"
        );
    }
}

#[test]
fn one_queued_direction_is_consumed_per_step() {
    let mut world = fast_world(8);

    queue(&mut world, Direction::Up);
    queue(&mut world, Direction::Left);

    let _ = advance_step(&mut world);
    assert_eq!(query::head(&world).position, cell(10.0, 11.0));

    let _ = advance_step(&mut world);
    assert_eq!(query::head(&world).position, cell(9.0, 11.0));
}

#[test]
fn input_burst_overflow_keeps_only_the_newest_direction() {
    let mut world = fast_world(8);

    queue(&mut world, Direction::Up);
    queue(&mut world, Direction::Left);
    queue(&mut world, Direction::Down);

    let _ = advance_step(&mut world);
    assert_eq!(query::head(&world).position, cell(10.0, 9.0));
}

#[test]
fn eating_food_grows_the_snake_and_ramps_the_clock() {
    let mut world = World::with_config(BoardConfig::new(20, 20, 5, 3, 1000), 9);
    let food_cell = cell(11.0, 10.0);
    scaffold::place_food(&mut world, food_cell);

    let events = advance_step(&mut world);

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], Event::Stepped { head: food_cell });
    assert_eq!(
        events[1],
        Event::FoodEaten {
            at: food_cell,
            step_delay: 4,
        }
    );
    assert_eq!(events[2], Event::SnakeGrew { segment: food_cell });
    assert!(matches!(events[3], Event::FoodRelocated { .. }));

    assert_eq!(query::tail_length(&world), 1);
    assert_eq!(query::step_delay(&world), 4);

    let view = query::entities(&world);
    let segment = view.get(view.head_index() + 1).expect("new segment");
    assert_eq!(segment.position, food_cell);
    assert!(segment.waiting, "fresh segment must hold its cell");
    let (delta_red, delta_green, delta_blue) = palette::TAIL_SHADE_SHIFT;
    assert_eq!(
        segment.color,
        palette::HEAD.shifted(delta_red, delta_green, delta_blue)
    );
}

#[test]
fn fresh_segment_holds_still_for_exactly_one_step() {
    let mut world = fast_world(9);
    let food_cell = cell(11.0, 10.0);
    scaffold::place_food(&mut world, food_cell);

    let _ = advance_step(&mut world);
    scaffold::place_food(&mut world, PARKED_FOOD);
    let _ = advance_step(&mut world);

    assert_eq!(query::head(&world).position, cell(12.0, 10.0));
    let view = query::entities(&world);
    let segment = view.get(view.head_index() + 1).expect("segment present");
    assert_eq!(segment.position, food_cell);
    assert!(!segment.waiting, "hold expires after one step");
}

#[test]
fn speed_ramp_never_drops_below_the_floor() {
    let mut world = World::with_config(BoardConfig::new(20, 20, 4, 3, 1000), 12);

    scaffold::place_food(&mut world, cell(11.0, 10.0));
    let _ = advance_step(&mut world);
    assert_eq!(query::step_delay(&world), 3);

    scaffold::place_food(&mut world, cell(12.0, 10.0));
    let events = advance_step(&mut world);
    assert_eq!(query::step_delay(&world), 3);

    let eaten_delay = events.iter().find_map(|event| match event {
        Event::FoodEaten { step_delay, .. } => Some(*step_delay),
        _ => None,
    });
    assert_eq!(eaten_delay, Some(3));
}

#[test]
fn leaving_the_board_ends_the_session() {
    let mut world = fast_world(4);

    for _ in 0..9 {
        let events = advance_step(&mut world);
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::GameEnded { .. })));
    }
    assert_eq!(query::head(&world).position, cell(19.0, 10.0));

    let events = advance_step(&mut world);
    assert_eq!(
        events,
        vec![Event::GameEnded {
            cause: GameOverCause::OutOfBounds,
        }]
    );
    assert_eq!(query::head(&world).position, cell(19.0, 10.0));
    assert!(!query::is_running(&world));

    let mut events = Vec::new();
    for _ in 0..8 {
        apply(&mut world, Command::FrameTick, &mut events);
    }
    assert!(events.is_empty(), "ended session must hold its final frame");
}

#[test]
fn biting_the_tail_ends_the_session() {
    let mut world = fast_world(6);
    scaffold::extend_tail(&mut world, 4);

    queue(&mut world, Direction::Up);
    let _ = advance_step(&mut world);
    queue(&mut world, Direction::Left);
    let _ = advance_step(&mut world);
    assert_eq!(query::head(&world).position, cell(9.0, 11.0));

    queue(&mut world, Direction::Down);
    let events = advance_step(&mut world);

    assert_eq!(
        events,
        vec![Event::GameEnded {
            cause: GameOverCause::TailCollision,
        }]
    );
    assert_eq!(query::head(&world).position, cell(9.0, 11.0));
    assert!(!query::is_running(&world));
}

#[test]
fn unpausing_fires_promptly_after_a_long_pause() {
    let mut world = World::with_config(BoardConfig::new(20, 20, 10, 3, 1000), 14);
    scaffold::place_food(&mut world, PARKED_FOOD);
    let mut events = Vec::new();

    apply(&mut world, Command::TogglePause, &mut events);
    for _ in 0..30 {
        apply(&mut world, Command::FrameTick, &mut events);
    }
    assert_eq!(events, vec![Event::PauseToggled { paused: true }]);

    events.clear();
    apply(&mut world, Command::TogglePause, &mut events);
    apply(&mut world, Command::FrameTick, &mut events);

    assert!(
        events.contains(&Event::Stepped { head: cell(11.0, 10.0) }),
        "accumulated frames must open the gate on the first unpaused tick"
    );
}
