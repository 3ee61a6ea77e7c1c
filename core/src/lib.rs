#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid-snake workspace.
//!
//! This crate defines the message surface that connects adapters and the
//! authoritative world. Adapters submit [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values describing what actually happened.
//! The shared vocabulary types (grid vectors, colors, directions, board
//! configuration) live here so that no crate reaches into another's
//! internals.

use serde::{Deserialize, Serialize};

/// Three-component vector used for both grid positions and unit directions.
///
/// Positions keep `x` and `y` integral-valued with `z` pinned to zero.
/// Directions have exactly one axis at ±1.0, or are the zero vector meaning
/// "no change". Components only ever hold whole numbers, so the exact float
/// comparisons below are well defined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridVec3 {
    /// Column-axis component.
    pub x: f32,
    /// Row-axis component.
    pub y: f32,
    /// Depth component; zero for every simulated entity.
    pub z: f32,
}

impl GridVec3 {
    /// The zero vector, meaning "no movement" when used as a direction.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector from explicit components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns this vector translated component-wise by `delta`.
    #[must_use]
    pub fn translated(self, delta: Self) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Reports whether every component is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Reports whether `self` and `other` are exact opposites along the x or
    /// y axis (±1 on the same axis with opposite signs).
    #[must_use]
    pub fn is_opposite_of(&self, other: &Self) -> bool {
        (self.x == 1.0 && other.x == -1.0)
            || (self.x == -1.0 && other.x == 1.0)
            || (self.y == 1.0 && other.y == -1.0)
            || (self.y == -1.0 && other.y == 1.0)
    }
}

/// RGBA color with floating point channels conceptually in `0.0..=1.0`.
///
/// The simulation never clamps channels; tail shading may push a channel
/// outside the nominal range and presentation backends render it as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel intensity.
    pub red: f32,
    /// Green channel intensity.
    pub green: f32,
    /// Blue channel intensity.
    pub blue: f32,
    /// Alpha channel intensity.
    pub alpha: f32,
}

impl Rgba {
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

    /// Returns a copy with the RGB channels offset by the provided deltas.
    ///
    /// Alpha is preserved and no clamping is applied.
    #[must_use]
    pub fn shifted(self, delta_red: f32, delta_green: f32, delta_blue: f32) -> Self {
        Self {
            red: self.red + delta_red,
            green: self.green + delta_green,
            blue: self.blue + delta_blue,
            alpha: self.alpha,
        }
    }
}

/// Fixed palette shared by the simulation and the render translation layer.
pub mod palette {
    use super::Rgba;

    /// Fill color of a regular platform tile, also used for segment borders.
    pub const PLATFORM: Rgba = Rgba::new(0.2, 0.2, 0.2, 1.0);

    /// Slightly lighter platform tile sprinkled across the board.
    pub const PLATFORM_LIGHT: Rgba = Rgba::new(0.21, 0.21, 0.21, 1.0);

    /// Fill color of the snake head.
    pub const HEAD: Rgba = Rgba::new(1.0, 0.05, 0.95, 1.0);

    /// Fill color of the food entity.
    pub const FOOD: Rgba = Rgba::new(0.30, 0.4, 0.9, 1.0);

    /// Flat color used by the diagnostic wireframe overlay pass.
    pub const WIREFRAME: Rgba = Rgba::new(0.3, 0.3, 0.3, 1.0);

    /// Solid color used to clear each frame.
    pub const CLEAR: Rgba = Rgba::new(0.3, 0.3, 0.3, 1.0);

    /// Per-channel offset applied when deriving a tail segment's shade from
    /// the previous last segment.
    pub const TAIL_SHADE_SHIFT: (f32, f32, f32) = (-0.05, 0.05, 0.05);
}

/// The four directional input symbols produced by the host's keyboard layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Translates the symbol into a unit movement vector.
    #[must_use]
    pub const fn unit_vector(self) -> GridVec3 {
        match self {
            Self::Up => GridVec3::new(0.0, 1.0, 0.0),
            Self::Left => GridVec3::new(-1.0, 0.0, 0.0),
            Self::Down => GridVec3::new(0.0, -1.0, 0.0),
            Self::Right => GridVec3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Compile-time-equivalent configuration for a simulation session.
///
/// There is no runtime configuration surface; the binary always runs the
/// default board and tests construct variants directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardConfig {
    columns: u32,
    rows: u32,
    initial_step_delay: u32,
    min_step_delay: u32,
    max_entities: usize,
}

impl BoardConfig {
    /// Creates a new configuration from explicit values.
    ///
    /// `max_entities` must accommodate `columns * rows` board tiles plus the
    /// food, the head, and every tail segment the board can hold; the world
    /// asserts this at construction.
    #[must_use]
    pub const fn new(
        columns: u32,
        rows: u32,
        initial_step_delay: u32,
        min_step_delay: u32,
        max_entities: usize,
    ) -> Self {
        Self {
            columns,
            rows,
            initial_step_delay,
            min_step_delay,
            max_entities,
        }
    }

    /// Number of tile columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Rendered frames between simulation steps at session start.
    #[must_use]
    pub const fn initial_step_delay(&self) -> u32 {
        self.initial_step_delay
    }

    /// Floor the step delay never drops below as food is eaten.
    #[must_use]
    pub const fn min_step_delay(&self) -> u32 {
        self.min_step_delay
    }

    /// Fixed capacity of the entity arena.
    #[must_use]
    pub const fn max_entities(&self) -> usize {
        self.max_entities
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(20, 20, 30, 3, 1000)
    }
}

/// Reasons the simulation transitions into its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    /// The head's candidate cell left the board rectangle.
    OutOfBounds,
    /// The head's candidate cell overlapped an existing tail segment.
    TailCollision,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Buffers a directional input for the next simulation steps.
    QueueDirection {
        /// Direction the player requested.
        direction: Direction,
    },
    /// Signals that one frame was rendered; advances the step clock and
    /// fires at most one simulation step when the gate opens.
    FrameTick,
    /// Flips the pause flag. Tick counting continues while paused.
    TogglePause,
    /// Flips the diagnostic wireframe overlay flag. No simulation effect.
    ToggleWireframe,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// A simulation step committed a head move.
    Stepped {
        /// Cell the head occupies after the step.
        head: GridVec3,
    },
    /// The head reached the food cell during a step.
    FoodEaten {
        /// Cell where the food was consumed.
        at: GridVec3,
        /// Step delay threshold after the speed ramp was applied.
        step_delay: u32,
    },
    /// A new waiting tail segment was appended.
    SnakeGrew {
        /// Cell the new segment occupies.
        segment: GridVec3,
    },
    /// The food entity was moved to a fresh cell.
    FoodRelocated {
        /// Cell the food now occupies.
        to: GridVec3,
    },
    /// The simulation entered its terminal state.
    GameEnded {
        /// Collision that ended the session.
        cause: GameOverCause,
    },
    /// The pause flag was flipped.
    PauseToggled {
        /// Pause state after the toggle.
        paused: bool,
    },
    /// The wireframe overlay flag was flipped.
    WireframeToggled {
        /// Overlay state after the toggle.
        enabled: bool,
    },
}
