#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a grid-snake session.
//!
//! Wires the authoritative world to the macroquad backend: each frame the
//! backend's input becomes commands, the world applies them plus one
//! `FrameTick`, and the scene is repopulated from the entity query before
//! the backend rasterises it.

use anyhow::Result;
use clap::Parser;
use grid_snake_core::{palette, Command, Event};
use grid_snake_rendering::{
    FrameInput, LoopControl, Presentation, RenderingBackend, Scene, SceneCell,
};
use grid_snake_rendering_macroquad::MacroquadBackend;
use grid_snake_world::{self as world, query, World};

/// Command-line options for the grid-snake session.
#[derive(Debug, Parser)]
#[command(name = "grid-snake", about = "Grid-based snake on a fixed-step frame clock")]
struct Args {
    /// Seed for the session RNG; drawn from OS entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Render as fast as possible instead of synchronising with the display.
    #[arg(long)]
    no_vsync: bool,
}

/// Entry point for the grid-snake command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut session = World::new(seed);

    let mut scene = Scene::new(Vec::new(), 0);
    populate_scene(&session, &mut scene);
    let presentation = Presentation::new("grid-snake", palette::CLEAR, scene);

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    let mut events = Vec::new();
    backend.run(presentation, move |input: FrameInput, scene: &mut Scene| {
        if input.quit {
            return LoopControl::Exit;
        }

        events.clear();
        if let Some(direction) = input.direction {
            world::apply(&mut session, Command::QueueDirection { direction }, &mut events);
        }
        if input.toggle_pause {
            world::apply(&mut session, Command::TogglePause, &mut events);
        }
        if input.toggle_wireframe {
            world::apply(&mut session, Command::ToggleWireframe, &mut events);
        }
        world::apply(&mut session, Command::FrameTick, &mut events);

        for event in &events {
            if let Event::GameEnded { cause } = event {
                println!("game over: {cause:?} (seed {seed})");
            }
        }

        populate_scene(&session, scene);
        LoopControl::Continue
    })
}

/// Rebuilds the scene's cell list from the entity arena, preserving order.
fn populate_scene(session: &World, scene: &mut Scene) {
    let view = query::entities(session);
    scene.cells.clear();
    scene.cells.extend(view.iter().map(|entity| SceneCell {
        position: entity.position,
        color: entity.color,
    }));
    scene.snake_start = view.head_index();
    scene.wireframe = query::wireframe_enabled(session);
}
