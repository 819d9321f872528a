//! Wavyte FX is a software filter graph over premultiplied BGRA8 rasters.
//!
//! A [`FilterGraph`] holds leaf rasters and a DAG of filter nodes (blur, morphology, color
//! matrices, component transfer, convolution, displacement, lighting, turbulence, compositing
//! and geometry). Nodes are evaluated lazily, rectangle by rectangle:
//!
//! 1. **Output rect**: ask a node what part of a requested rectangle it can produce content for.
//!    The query walks upstream, each node applying its own geometry (margins, offsets, crops).
//! 2. **Render**: produce pixels for exactly that rectangle, rendering upstream nodes over the
//!    rectangles they are asked for and synthesizing missing margins with an [`EdgeMode`].
//!
//! [`Evaluator::draw`] chains both phases and hands the result to a [`DrawTarget`].
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded and deterministic**: a render is a pure function of the graph and the rect.
//! - **Configuration errors surface early**: bad slots, attributes and cycles are rejected when
//!   the graph is built or validated, never mid-render.
//! - **Premultiplied BGRA8** end-to-end, byte order B, G, R, A.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod filters;
mod foundation;
mod graph;
mod raster;

pub use filters::blend::BlendMode;
pub use filters::blur::BlurDirection;
pub use filters::color_matrix::AlphaMode;
pub use filters::composite::CompositeOperator;
pub use filters::displacement::ColorChannel;
pub use filters::geometry::SamplingFilter;
pub use filters::morphology::MorphologyOperator;
pub use filters::turbulence::TurbulenceType;
pub use foundation::core::{
    A, Affine, B, Color, G, IntPoint, IntRect, IntSize, Matrix5x4, Point, R, Rect, Size, Vec2,
};
pub use foundation::error::{FxError, FxResult};
pub use graph::arena::FilterGraph;
pub use graph::attr::AttributeValue;
pub use graph::draw::{DrawOperator, DrawOptions, DrawTarget, RasterDrawTarget};
pub use graph::eval::{EvalOptions, EvalStats, Evaluator};
pub use graph::node::{Input, NodeId, NodeKind, SurfaceId};
pub use raster::buffer::RasterBuffer;
pub use raster::edge::{EdgeMode, extend_to_rect};
