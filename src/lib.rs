//! Pen-plotter art tools and an AxiDraw driver, in Rust.
//!
//! This library covers the whole trip from generative geometry to ink on
//! paper: geo/geo_types helpers for flattening and arranging drawings,
//! a path optimizer that cuts down pen-up travel, Hershey-style vector
//! text, turtle graphics, SVG import/preview, and a serial backend that
//! speaks the EiBotBoard protocol to a real AxiDraw.
//!
//! All distances are in inches unless a function says otherwise, because
//! that is what the AxiDraw's step scale is specified in.

/// Extensions/traits for geo_types geometry: flattening to pen strokes,
/// fitting drawings to a page, shading polygons, plot metrics, SVG in/out.
pub mod geo_types;

/// Layered drawings: one `MultiLineString` per pen/color pass.
pub mod drawing;

/// Path optimization: joining, sorting, relooping and pruning pen strokes.
pub mod optimizer;

/// Turtle graphics implementation emitting stroke geometry.
pub mod turtle;

/// Single-stroke (Hershey) vector font text rendering.
pub mod text;

/// AxiDraw device control over serial, plus the motion planner.
pub mod device;

/// Standard paper sizes, in inches.
pub mod sizes;

/// Easing curves for animating generative parameters.
pub mod easing;

/// Library-wide error types.
pub mod errors;

/// Make your life easy! Just import prelude::* and ignore all the warnings!
/// One stop shopping at the expense of a slightly more complex dependency graph.
pub mod prelude {
    pub use crate::device::planner::{Plan, Planner};
    pub use crate::device::{axidraw_available, Device, DeviceConfig, DeviceError};
    pub use crate::drawing::Drawing;
    pub use crate::geo_types::svg::{load_svg, render_svg, RenderOptions};
    pub use crate::geo_types::{flatten_lines, metrics, size, up_length, Fit, Metrics, Shade};
    pub use crate::optimizer::Optimizer;
    pub use crate::sizes::PaperSize;
    pub use crate::text::{text, Font, HersheyFont, TextAlign};
    pub use crate::turtle::{degrees, Turtle};
}
