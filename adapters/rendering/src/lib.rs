#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contract between the simulation and rendering backends.
//!
//! The world never draws; adapters publish a [`Scene`] describing what to
//! show and this crate translates it into an ordered stream of
//! [`DrawRequest`] values. The translation is a pure function of the scene,
//! so two identical scenes always yield identical request streams and the
//! stream can be asserted on in tests without any graphics context.

use glam::{Mat4, Vec3, Vec4};
use grid_snake_core::{palette, Direction, GridVec3, Rgba};
use thiserror::Error;

/// Fixed camera position used by every session.
pub const CAMERA_POSITION: GridVec3 = GridVec3::new(8.0, 9.0, -22.0);

const PROJECTION_NEAR: f32 = 1.0;
const PROJECTION_FAR: f32 = 100.0;
const PROJECTION_PLANE_HEIGHT: f32 = 1.0;

/// Unit quad triangulated as two triangles, wound for a triangle list.
const FILLED_QUAD_VERTICES: [[f32; 3]; 6] = [
    [-0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [0.5, -0.5, 0.0],
];

/// Unit quad perimeter as four closed line segments.
const OUTLINE_QUAD_VERTICES: [[f32; 3]; 8] = [
    [-0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, -0.5, 0.0],
];

/// Shared vertex data referenced by draw requests.
///
/// Every entity renders as the same unit quad; only the model transform and
/// color vary between requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexSource {
    /// Two-triangle unit quad for filled passes.
    FilledQuad,
    /// Four-segment unit quad perimeter for outline passes.
    OutlineQuad,
}

impl VertexSource {
    /// Model-space vertices for this source.
    #[must_use]
    pub const fn vertices(self) -> &'static [[f32; 3]] {
        match self {
            Self::FilledQuad => &FILLED_QUAD_VERTICES,
            Self::OutlineQuad => &OUTLINE_QUAD_VERTICES,
        }
    }

    /// How the vertex stream groups into primitives.
    #[must_use]
    pub const fn topology(self) -> Topology {
        match self {
            Self::FilledQuad => Topology::TriangleList,
            Self::OutlineQuad => Topology::LineList,
        }
    }
}

/// Primitive grouping of a vertex stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Consecutive vertex triples form independent triangles.
    TriangleList,
    /// Consecutive vertex pairs form independent line segments.
    LineList,
}

/// Rasterisation mode requested for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RasterMode {
    /// Primitives are filled.
    Solid,
    /// Primitive edges only; used by the diagnostic overlay pass.
    Wireframe,
}

/// A single backend-agnostic draw instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRequest {
    /// Model transform placing the unit quad on its grid cell.
    pub model: Mat4,
    /// Flat color for every vertex of the primitive.
    pub color: Rgba,
    /// Vertex data to submit.
    pub source: VertexSource,
    /// Primitive grouping of the vertex data.
    pub topology: Topology,
    /// Fill or edge rasterisation.
    pub raster: RasterMode,
}

/// Errors raised while deriving per-frame transforms.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// The viewport aspect ratio was zero, negative, or not finite.
    #[error("viewport aspect ratio {aspect_ratio} is not positive and finite")]
    InvalidAspectRatio {
        /// Offending width over height value.
        aspect_ratio: f32,
    },
}

/// View and projection matrices fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransforms {
    /// World-to-camera transform.
    pub view: Mat4,
    /// Camera-to-clip transform with a left-handed depth range of `0..=1`.
    pub projection: Mat4,
}

impl FrameTransforms {
    /// Derives the session transforms from the viewport aspect ratio.
    pub fn new(aspect_ratio: f32) -> Result<Self, TransformError> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(TransformError::InvalidAspectRatio { aspect_ratio });
        }

        let view = Mat4::from_translation(Vec3::new(
            -CAMERA_POSITION.x,
            -CAMERA_POSITION.y,
            -CAMERA_POSITION.z,
        ));

        let near = PROJECTION_NEAR;
        let far = PROJECTION_FAR;
        let height = PROJECTION_PLANE_HEIGHT;
        let projection = Mat4::from_cols(
            Vec4::new(2.0 * near / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far / (far - near), 1.0),
            Vec4::new(0.0, 0.0, near * far / (near - far), 0.0),
        );

        Ok(Self { view, projection })
    }
}

/// One renderable cell: a unit quad at a grid position with a flat color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCell {
    /// Grid cell the quad occupies.
    pub position: GridVec3,
    /// Fill color of the quad.
    pub color: Rgba,
}

/// Everything a backend needs to draw one frame.
///
/// Cells keep arena order: board tiles first, then the food, then the head,
/// then tail segments newest-last. `snake_start` is the head's index; the
/// border pass outlines that suffix of the cell list.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Every cell to draw, in arena order.
    pub cells: Vec<SceneCell>,
    /// Index of the first snake cell (the head).
    pub snake_start: usize,
    /// Outline color for the border pass.
    pub border_color: Rgba,
    /// Flat color for the diagnostic wireframe pass.
    pub wireframe_color: Rgba,
    /// Whether the wireframe overlay pass is emitted.
    pub wireframe: bool,
}

impl Scene {
    /// Creates a scene with the session palette defaults.
    #[must_use]
    pub fn new(cells: Vec<SceneCell>, snake_start: usize) -> Self {
        Self {
            cells,
            snake_start,
            border_color: palette::PLATFORM,
            wireframe_color: palette::WIREFRAME,
            wireframe: false,
        }
    }
}

/// Translates a scene into its ordered draw request stream.
///
/// Pass order is fixed: a filled pass over every cell, a border pass over
/// the snake cells, and, when enabled, a wireframe pass over every cell.
/// Within a pass, requests follow cell order.
#[must_use]
pub fn draw_requests(scene: &Scene) -> Vec<DrawRequest> {
    let mut requests = Vec::with_capacity(scene.cells.len() * 2);

    for cell in &scene.cells {
        requests.push(DrawRequest {
            model: model_transform(cell.position),
            color: cell.color,
            source: VertexSource::FilledQuad,
            topology: Topology::TriangleList,
            raster: RasterMode::Solid,
        });
    }

    let snake_cells = scene.cells.get(scene.snake_start..).unwrap_or(&[]);
    for cell in snake_cells {
        requests.push(DrawRequest {
            model: model_transform(cell.position),
            color: scene.border_color,
            source: VertexSource::OutlineQuad,
            topology: Topology::LineList,
            raster: RasterMode::Solid,
        });
    }

    if scene.wireframe {
        for cell in &scene.cells {
            requests.push(DrawRequest {
                model: model_transform(cell.position),
                color: scene.wireframe_color,
                source: VertexSource::FilledQuad,
                topology: Topology::TriangleList,
                raster: RasterMode::Wireframe,
            });
        }
    }

    requests
}

/// Model transform placing the unit quad on `position`.
#[must_use]
pub fn model_transform(position: GridVec3) -> Mat4 {
    Mat4::from_translation(Vec3::new(position.x, position.y, position.z))
}

/// Edge-triggered input gathered by a backend during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Directional key pressed this frame, if any.
    pub direction: Option<Direction>,
    /// Pause toggle key pressed this frame.
    pub toggle_pause: bool,
    /// Wireframe toggle key pressed this frame.
    pub toggle_wireframe: bool,
    /// Quit key pressed or window close requested this frame.
    pub quit: bool,
}

/// Outcome of one frame callback invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Keep the render loop running.
    Continue,
    /// Tear the window down and return from the backend.
    Exit,
}

/// Static presentation hand-off from the session to a backend.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title for the backend's window.
    pub window_title: String,
    /// Color the backend clears to each frame.
    pub clear_color: Rgba,
    /// Initial scene; the frame callback mutates it in place.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a presentation hand-off.
    #[must_use]
    pub fn new(window_title: impl Into<String>, clear_color: Rgba, scene: Scene) -> Self {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Contract implemented by rendering backends.
///
/// The backend owns the OS loop. Each frame it polls input, invokes the
/// frame callback with that input and the mutable scene, rasterises the
/// scene's draw requests, and presents.
pub trait RenderingBackend {
    /// Runs the render loop until the callback exits or the window closes.
    fn run<F>(self, presentation: Presentation, frame: F) -> anyhow::Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> LoopControl + 'static;
}
