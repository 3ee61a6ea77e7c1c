#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for grid-snake.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.
//!
//! The backend owns the OS window and render loop. Each frame it polls
//! edge-triggered keyboard input, hands it to the frame callback, then
//! rasterises the scene's draw request stream: model-view-projection,
//! perspective divide, and a viewport map into macroquad's y-down screen
//! space.

use anyhow::Result;
use glam::Vec4;
use grid_snake_core::{Direction, Rgba};
use grid_snake_rendering::{
    draw_requests, DrawRequest, FrameInput, FrameTransforms, LoopControl, Presentation,
    RasterMode, RenderingBackend, Scene, Topology,
};
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::shapes::{draw_line, draw_triangle, draw_triangle_lines};
use std::{
    collections::VecDeque,
    sync::mpsc,
    time::{Duration, Instant},
};

const LINE_THICKNESS: f32 = 1.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    up: bool,
    left: bool,
    down: bool,
    right: bool,
    /// `Space` toggles the pause flag.
    pause: bool,
    /// `W` toggles the diagnostic wireframe overlay.
    wireframe: bool,
    /// `Q` or `Escape` to quit the render loop.
    quit: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            up: is_key_pressed(KeyCode::Up),
            left: is_key_pressed(KeyCode::Left),
            down: is_key_pressed(KeyCode::Down),
            right: is_key_pressed(KeyCode::Right),
            pause: is_key_pressed(KeyCode::Space),
            wireframe: is_key_pressed(KeyCode::W),
            quit: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }

    /// First directional key observed this frame, scanned in a fixed order so
    /// simultaneous presses resolve deterministically.
    fn direction(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.left {
            Some(Direction::Left)
        } else if self.down {
            Some(Direction::Down)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
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

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing
    /// ten-second averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        if seconds <= f32::EPSILON {
            self.elapsed = Duration::ZERO;
            self.frames = 0;
            self.render_accum = Duration::ZERO;
            return None;
        }

        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut frame: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> LoopControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 960,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (transform_init_sender, transform_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut init_sender = Some(transform_init_sender);
            let mut scene = scene;
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            // The aspect ratio is sampled once; the projection stays fixed
            // even if the window is resized afterwards.
            let aspect_ratio =
                macroquad::window::screen_width() / macroquad::window::screen_height();
            let transforms = match FrameTransforms::new(aspect_ratio) {
                Ok(transforms) => {
                    if let Some(sender) = init_sender.take() {
                        let _ = sender.send(Ok(()));
                    }
                    transforms
                }
                Err(error) => {
                    if let Some(sender) = init_sender.take() {
                        let _ = sender.send(Err(error.into()));
                    }
                    return;
                }
            };

            loop {
                let keyboard = KeyboardShortcuts::poll();
                let frame_input = FrameInput {
                    direction: keyboard.direction(),
                    toggle_pause: keyboard.pause,
                    toggle_wireframe: keyboard.wireframe,
                    quit: keyboard.quit,
                };

                if let LoopControl::Exit = frame(frame_input, &mut scene) {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let render_start = Instant::now();
                for request in draw_requests(&scene) {
                    rasterise(&request, &transforms, screen_width, screen_height);
                }
                let render_duration = render_start.elapsed();

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_render,
                    }) = fps_counter.record_frame(frame_dt, render_duration)
                    {
                        println!(
                            "FPS: {:.2} (10s avg: {:.2}) | render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        transform_init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

/// Projects one draw request and submits its primitives to macroquad.
///
/// Vertices behind the camera plane (non-positive clip `w`) drop the whole
/// request; with the session's fixed camera this never happens for on-board
/// cells.
fn rasterise(
    request: &DrawRequest,
    transforms: &FrameTransforms,
    screen_width: f32,
    screen_height: f32,
) {
    let mvp = transforms.projection * transforms.view * request.model;
    let color = to_macroquad_color(request.color);

    let vertices = request.source.vertices();
    let mut projected = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let clip = mvp * Vec4::new(vertex[0], vertex[1], vertex[2], 1.0);
        if clip.w <= f32::EPSILON {
            return;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        projected.push(MacroquadVec2::new(
            (ndc_x + 1.0) * 0.5 * screen_width,
            (1.0 - ndc_y) * 0.5 * screen_height,
        ));
    }

    match request.topology {
        Topology::TriangleList => {
            for triangle in projected.chunks_exact(3) {
                match request.raster {
                    RasterMode::Solid => {
                        draw_triangle(triangle[0], triangle[1], triangle[2], color);
                    }
                    RasterMode::Wireframe => {
                        draw_triangle_lines(
                            triangle[0],
                            triangle[1],
                            triangle[2],
                            LINE_THICKNESS,
                            color,
                        );
                    }
                }
            }
        }
        Topology::LineList => {
            for segment in projected.chunks_exact(2) {
                draw_line(
                    segment[0].x,
                    segment[0].y,
                    segment[1].x,
                    segment[1].y,
                    LINE_THICKNESS,
                    color,
                );
            }
        }
    }
}

fn to_macroquad_color(color: Rgba) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::FpsCounter;
    use std::time::Duration;

    #[test]
    fn fps_counter_reports_after_one_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(100);
        let render = Duration::from_millis(2);

        for _ in 0..9 {
            assert!(counter.record_frame(frame, render).is_none());
        }
        let metrics = counter
            .record_frame(frame, render)
            .expect("one second of frames recorded");
        assert!((metrics.per_second - 10.0).abs() < 0.5);
        assert!(metrics.avg_render >= render);
    }

    #[test]
    fn fps_counter_resets_between_reports() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(500);

        assert!(counter.record_frame(frame, Duration::ZERO).is_none());
        assert!(counter.record_frame(frame, Duration::ZERO).is_some());
        assert!(counter.record_frame(frame, Duration::ZERO).is_none());
    }
}
