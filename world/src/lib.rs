#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for grid-snake.
//!
//! The world owns every mutable piece of the session: the entity arena, the
//! bounded input queue, the step clock, the seeded RNG, and the running and
//! wireframe flags. Adapters mutate it exclusively through
//! [`apply`] and observe it exclusively through [`query`], so a frame always
//! sees either the state before a step or the state after it, never a
//! half-advanced tail.

use grid_snake_core::{
    palette, BoardConfig, Command, Direction, Event, GameOverCause, GridVec3, Rgba,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Chance, out of 100, that a board tile uses the lighter platform shade.
const LIGHT_TILE_CHANCE_PERCENT: u32 = 3;

/// Bounded FIFO of pending directional commands.
///
/// Holds at most two entries. Pushing into a full queue drops everything
/// pending and starts fresh with the new command, which keeps rapid input
/// bursts from playing out stale turns several steps later.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputQueue {
    pending: [Option<Direction>; 2],
    length: usize,
}

impl InputQueue {
    /// Maximum number of buffered directions.
    pub const CAPACITY: usize = 2;

    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: [None, None],
            length: 0,
        }
    }

    /// Appends a direction, clearing the queue first if it is full.
    pub fn push(&mut self, direction: Direction) {
        if self.length >= Self::CAPACITY {
            self.length = 0;
        }
        self.pending[self.length] = Some(direction);
        self.length += 1;
    }

    /// Removes and returns the oldest entry, or `None` when empty.
    pub fn pop(&mut self) -> Option<Direction> {
        if self.length == 0 {
            return None;
        }
        let result = self.pending[0].take();
        if self.length > 1 {
            self.pending[0] = self.pending[1].take();
        }
        self.length -= 1;
        result
    }

    /// Number of buffered directions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Reports whether no directions are buffered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Frame counter gating simulation steps against a delay threshold.
#[derive(Clone, Copy, Debug)]
pub struct StepClock {
    counter: u32,
    step_delay: u32,
    paused: bool,
}

impl StepClock {
    /// Creates a clock with the provided initial delay threshold.
    #[must_use]
    pub const fn new(step_delay: u32) -> Self {
        Self {
            counter: 0,
            step_delay,
            paused: false,
        }
    }

    /// Reports whether the gate is open: the counter exceeded the threshold
    /// and the clock is not paused.
    #[must_use]
    pub const fn should_step(&self) -> bool {
        self.counter > self.step_delay && !self.paused
    }

    /// Counts one rendered frame and returns whether a step fires.
    ///
    /// The counter resets when the gate opens and keeps counting while
    /// paused, so unpausing after a long pause fires on the next frame.
    pub fn advance_frame(&mut self) -> bool {
        let fire = self.should_step();
        if fire {
            self.counter = 0;
        }
        self.counter += 1;
        fire
    }

    /// Shrinks the delay threshold by one frame, never below `floor`.
    pub fn ramp_up(&mut self, floor: u32) {
        if self.step_delay > floor {
            self.step_delay -= 1;
        }
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Current delay threshold in frames.
    #[must_use]
    pub const fn step_delay(&self) -> u32 {
        self.step_delay
    }

    /// Reports whether stepping is suppressed.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    position: GridVec3,
    direction: GridVec3,
    color: Rgba,
    waiting: bool,
}

impl Entity {
    fn tile(position: GridVec3, color: Rgba) -> Self {
        Self {
            position,
            direction: GridVec3::ZERO,
            color,
            waiting: false,
        }
    }

    fn food(position: GridVec3) -> Self {
        Self {
            position,
            direction: GridVec3::ZERO,
            color: palette::FOOD,
            waiting: false,
        }
    }

    fn head(position: GridVec3, direction: GridVec3) -> Self {
        Self {
            position,
            direction,
            color: palette::HEAD,
            waiting: false,
        }
    }

    fn tail(position: GridVec3, color: Rgba) -> Self {
        Self {
            position,
            direction: GridVec3::ZERO,
            color,
            waiting: true,
        }
    }
}

/// Append-only arena holding every simulated entity for the session.
#[derive(Clone, Debug)]
struct EntityStore {
    entities: Vec<Entity>,
    capacity: usize,
}

impl EntityStore {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entity. Exceeding the fixed capacity is a fatal
    /// precondition violation, not a recoverable error.
    fn push(&mut self, entity: Entity) {
        assert!(
            self.entities.len() < self.capacity,
            "entity arena exhausted: capacity {} reached",
            self.capacity
        );
        self.entities.push(entity);
    }

    fn len(&self) -> usize {
        self.entities.len()
    }

    fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    fn entity_mut(&mut self, index: usize) -> &mut Entity {
        &mut self.entities[index]
    }

    fn last(&self) -> &Entity {
        self.entities
            .last()
            .expect("entity arena is never empty after initialisation")
    }

    fn as_slice(&self) -> &[Entity] {
        &self.entities
    }
}

/// Represents the authoritative grid-snake session state.
#[derive(Clone, Debug)]
pub struct World {
    board: BoardConfig,
    entities: EntityStore,
    food_index: usize,
    head_index: usize,
    tail_length: u32,
    input: InputQueue,
    clock: StepClock,
    rng: ChaCha8Rng,
    running: bool,
    wireframe: bool,
}

impl World {
    /// Creates a session on the default board, seeded for reproducibility.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(BoardConfig::default(), seed)
    }

    /// Creates a session with an explicit board configuration.
    ///
    /// Panics when the configuration cannot hold the board tiles plus the
    /// food and head entities, or when the board has no area.
    #[must_use]
    pub fn with_config(board: BoardConfig, seed: u64) -> Self {
        assert!(
            board.columns() > 0 && board.rows() > 0,
            "board must have at least one tile"
        );
        let tile_count = board.columns() as usize * board.rows() as usize;
        assert!(
            board.max_entities() >= tile_count + 2,
            "max_entities {} cannot hold {} tiles plus food and head",
            board.max_entities(),
            tile_count
        );

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut entities = EntityStore::with_capacity(board.max_entities());

        for y in 0..board.rows() {
            for x in 0..board.columns() {
                let color = if rng.gen_range(0..100_u32) < LIGHT_TILE_CHANCE_PERCENT {
                    palette::PLATFORM_LIGHT
                } else {
                    palette::PLATFORM
                };
                entities.push(Entity::tile(GridVec3::new(x as f32, y as f32, 0.0), color));
            }
        }

        let food_index = entities.len();
        let food_cell = random_cell(&mut rng, &board);
        entities.push(Entity::food(food_cell));

        let head_index = entities.len();
        let head_cell = GridVec3::new(
            (board.columns() / 2) as f32,
            (board.rows() / 2) as f32,
            0.0,
        );
        entities.push(Entity::head(head_cell, Direction::Right.unit_vector()));

        Self {
            clock: StepClock::new(board.initial_step_delay()),
            board,
            entities,
            food_index,
            head_index,
            tail_length: 0,
            input: InputQueue::new(),
            rng,
            running: true,
            wireframe: false,
        }
    }

    /// One simulation step: tail advance, direction update, head advance,
    /// collision check, food resolution. Runs to completion before any query
    /// can observe the world again.
    fn step(&mut self, out_events: &mut Vec<Event>) {
        self.advance_tail();
        self.apply_queued_direction();

        let head = self.entities.entity(self.head_index);
        let candidate = head.position.translated(head.direction);

        if self.is_out_of_bounds(candidate) {
            self.running = false;
            out_events.push(Event::GameEnded {
                cause: GameOverCause::OutOfBounds,
            });
            return;
        }
        if self.is_tail_cell(candidate) {
            self.running = false;
            out_events.push(Event::GameEnded {
                cause: GameOverCause::TailCollision,
            });
            return;
        }

        self.entities.entity_mut(self.head_index).position = candidate;
        out_events.push(Event::Stepped { head: candidate });

        if candidate == self.entities.entity(self.food_index).position {
            self.clock.ramp_up(self.board.min_step_delay());
            out_events.push(Event::FoodEaten {
                at: candidate,
                step_delay: self.clock.step_delay(),
            });
            self.grow_snake(out_events);

            // Deliberately unguarded: the relocated food may land on the
            // snake's own body.
            let relocated = random_cell(&mut self.rng, &self.board);
            self.entities.entity_mut(self.food_index).position = relocated;
            out_events.push(Event::FoodRelocated { to: relocated });
        }
    }

    /// Shifts tail segments forward, far end first. A segment created on the
    /// previous food step holds its cell for exactly one step instead.
    fn advance_tail(&mut self) {
        for index in ((self.head_index + 1)..self.entities.len()).rev() {
            if self.entities.entity(index).waiting {
                self.entities.entity_mut(index).waiting = false;
            } else {
                let ahead = self.entities.entity(index - 1).position;
                self.entities.entity_mut(index).position = ahead;
            }
        }
    }

    /// Consumes at most one buffered direction. Reversing into the neck is
    /// rejected once tail segments exist; a bare head may reverse freely.
    fn apply_queued_direction(&mut self) {
        let Some(direction) = self.input.pop() else {
            return;
        };
        let requested = direction.unit_vector();
        let tail_length = self.tail_length;
        let head = self.entities.entity_mut(self.head_index);
        if tail_length == 0 || !head.direction.is_opposite_of(&requested) {
            head.direction = requested;
        }
    }

    fn is_out_of_bounds(&self, cell: GridVec3) -> bool {
        cell.x >= self.board.columns() as f32
            || cell.y >= self.board.rows() as f32
            || cell.x < 0.0
            || cell.y < 0.0
    }

    fn is_tail_cell(&self, cell: GridVec3) -> bool {
        self.entities.as_slice()[self.head_index + 1..]
            .iter()
            .any(|segment| segment.position == cell)
    }

    /// Appends a waiting segment stacked on the current last snake entity.
    /// The duplicate resolves itself on the next step: the older segment
    /// moves on while the new one holds still.
    fn grow_snake(&mut self, out_events: &mut Vec<Event>) {
        let last = *self.entities.last();
        let (delta_red, delta_green, delta_blue) = palette::TAIL_SHADE_SHIFT;
        let shade = last.color.shifted(delta_red, delta_green, delta_blue);
        self.entities.push(Entity::tail(last.position, shade));
        self.tail_length += 1;
        out_events.push(Event::SnakeGrew {
            segment: last.position,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::QueueDirection { direction } => {
            world.input.push(direction);
        }
        Command::TogglePause => {
            let paused = world.clock.toggle_pause();
            out_events.push(Event::PauseToggled { paused });
        }
        Command::ToggleWireframe => {
            world.wireframe = !world.wireframe;
            out_events.push(Event::WireframeToggled {
                enabled: world.wireframe,
            });
        }
        Command::FrameTick => {
            if !world.running {
                return;
            }
            if world.clock.advance_frame() {
                world.step(out_events);
            }
        }
    }
}

fn random_cell(rng: &mut ChaCha8Rng, board: &BoardConfig) -> GridVec3 {
    let x = rng.gen_range(0..board.columns());
    let y = rng.gen_range(0..board.rows());
    GridVec3::new(x as f32, y as f32, 0.0)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Entity, World};
    use grid_snake_core::{BoardConfig, GridVec3, Rgba};

    /// Captures an ordered view of every entity in the arena.
    #[must_use]
    pub fn entities(world: &World) -> EntityView<'_> {
        EntityView {
            entities: world.entities.as_slice(),
            head_index: world.head_index,
            food_index: world.food_index,
        }
    }

    /// Board configuration active for this session.
    #[must_use]
    pub fn board(world: &World) -> BoardConfig {
        world.board
    }

    /// Reports whether the session is still accepting simulation steps.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Reports whether stepping is currently suppressed by the pause flag.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.clock.is_paused()
    }

    /// Reports whether the diagnostic wireframe overlay is active.
    #[must_use]
    pub fn wireframe_enabled(world: &World) -> bool {
        world.wireframe
    }

    /// Current step delay threshold in frames.
    #[must_use]
    pub fn step_delay(world: &World) -> u32 {
        world.clock.step_delay()
    }

    /// Number of tail segments trailing the head.
    #[must_use]
    pub fn tail_length(world: &World) -> u32 {
        world.tail_length
    }

    /// Snapshot of the head entity.
    #[must_use]
    pub fn head(world: &World) -> EntitySnapshot {
        EntitySnapshot::from(world.entities.entity(world.head_index))
    }

    /// Snapshot of the food entity.
    #[must_use]
    pub fn food(world: &World) -> EntitySnapshot {
        EntitySnapshot::from(world.entities.entity(world.food_index))
    }

    /// Read-only, order-preserving window into the entity arena.
    ///
    /// Index ranges follow the arena convention: board tiles first, then the
    /// food entity, then the head, then tail segments newest-last.
    #[derive(Clone, Copy, Debug)]
    pub struct EntityView<'a> {
        entities: &'a [Entity],
        head_index: usize,
        food_index: usize,
    }

    impl EntityView<'_> {
        /// Number of entities currently in the arena.
        #[must_use]
        pub fn len(&self) -> usize {
            self.entities.len()
        }

        /// Reports whether the arena is empty (never true after init).
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.entities.is_empty()
        }

        /// Index of the head entity; larger indices are tail segments.
        #[must_use]
        pub fn head_index(&self) -> usize {
            self.head_index
        }

        /// Index of the food entity.
        #[must_use]
        pub fn food_index(&self) -> usize {
            self.food_index
        }

        /// Snapshot of the entity at `index`, if it exists.
        #[must_use]
        pub fn get(&self, index: usize) -> Option<EntitySnapshot> {
            self.entities.get(index).map(EntitySnapshot::from)
        }

        /// Iterator over entity snapshots in arena order.
        pub fn iter(&self) -> impl Iterator<Item = EntitySnapshot> + '_ {
            self.entities.iter().map(EntitySnapshot::from)
        }
    }

    /// Immutable description of a single entity used by queries and rendering.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EntitySnapshot {
        /// Grid cell the entity occupies.
        pub position: GridVec3,
        /// Movement direction; only meaningful for the head.
        pub direction: GridVec3,
        /// Display color.
        pub color: Rgba,
        /// True for a tail segment that skips its next follow-advance.
        pub waiting: bool,
    }

    impl From<&Entity> for EntitySnapshot {
        fn from(entity: &Entity) -> Self {
            Self {
                position: entity.position,
                direction: entity.direction,
                color: entity.color,
                waiting: entity.waiting,
            }
        }
    }
}

/// Test-only world surgery for constructing exact scenarios.
///
/// Gated behind the `scenario_scaffolding` feature so integration tests can
/// pin food placement and tail length without steering through the RNG.
#[cfg(feature = "scenario_scaffolding")]
pub mod scaffold {
    use super::{Entity, World};
    use grid_snake_core::{palette, GridVec3};

    /// Moves the food entity to an exact cell.
    pub fn place_food(world: &mut World, position: GridVec3) {
        world.entities.entity_mut(world.food_index).position = position;
    }

    /// Appends `count` settled (non-waiting) tail segments trailing the head
    /// in a straight line opposite its current direction.
    pub fn extend_tail(world: &mut World, count: u32) {
        for _ in 0..count {
            let last = *world.entities.last();
            let head = world.entities.entity(world.head_index);
            let backwards = GridVec3::new(
                -head.direction.x,
                -head.direction.y,
                -head.direction.z,
            );
            let (delta_red, delta_green, delta_blue) = palette::TAIL_SHADE_SHIFT;
            let mut segment = Entity::tail(
                last.position.translated(backwards),
                last.color.shifted(delta_red, delta_green, delta_blue),
            );
            segment.waiting = false;
            world.entities.push(segment);
            world.tail_length += 1;
        }
    }
}
