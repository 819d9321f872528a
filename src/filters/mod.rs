//! Per-kind filter algorithms behind the two-phase contract.

pub(crate) mod alpha;
pub(crate) mod blend;
pub(crate) mod blur;
pub(crate) mod color_matrix;
pub(crate) mod composite;
pub(crate) mod convolve;
pub(crate) mod displacement;
pub(crate) mod geometry;
pub(crate) mod lighting;
pub(crate) mod morphology;
pub(crate) mod transfer;
pub(crate) mod turbulence;

use crate::foundation::core::IntRect;
use crate::foundation::error::{FxError, FxResult};
use crate::graph::attr::AttributeValue;
use crate::graph::eval::NodeCx;
use crate::graph::node::NodeKind;
use crate::raster::buffer::RasterBuffer;

use self::alpha::AlphaFilter;
use self::blend::BlendFilter;
use self::blur::{DirectionalBlurFilter, GaussianBlurFilter};
use self::color_matrix::ColorMatrixFilter;
use self::composite::{ArithmeticFilter, CompositeFilter, FloodFilter};
use self::convolve::ConvolveFilter;
use self::displacement::DisplacementFilter;
use self::geometry::{CropFilter, OffsetFilter, TileFilter, TransformFilter};
use self::lighting::{LightKind, LightingFilter, Shading};
use self::morphology::MorphologyFilter;
use self::transfer::{TransferFilter, TransferKind};
use self::turbulence::TurbulenceFilter;

/// Two-phase contract every node kind implements.
///
/// `output_rect` may return more than `rect`; the evaluator intersects. `render` returns `None`
/// for fully transparent output, otherwise a buffer sized exactly to `rect`.
pub(crate) trait Filter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()>;

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect>;

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>>;
}

pub(crate) fn unknown_attribute(name: &str) -> FxError {
    FxError::configuration(format!("unknown attribute `{name}`"))
}

#[derive(Clone, Debug)]
pub(crate) enum FilterNode {
    Blend(BlendFilter),
    Morphology(MorphologyFilter),
    ColorMatrix(ColorMatrixFilter),
    Flood(FloodFilter),
    Tile(TileFilter),
    Transfer(TransferFilter),
    Convolve(ConvolveFilter),
    Offset(OffsetFilter),
    Displacement(DisplacementFilter),
    Turbulence(Box<TurbulenceFilter>),
    Arithmetic(ArithmeticFilter),
    Composite(CompositeFilter),
    GaussianBlur(GaussianBlurFilter),
    DirectionalBlur(DirectionalBlurFilter),
    Crop(CropFilter),
    Alpha(AlphaFilter),
    Transform(TransformFilter),
    Lighting(LightingFilter),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            FilterNode::Blend($f) => $body,
            FilterNode::Morphology($f) => $body,
            FilterNode::ColorMatrix($f) => $body,
            FilterNode::Flood($f) => $body,
            FilterNode::Tile($f) => $body,
            FilterNode::Transfer($f) => $body,
            FilterNode::Convolve($f) => $body,
            FilterNode::Offset($f) => $body,
            FilterNode::Displacement($f) => $body,
            FilterNode::Turbulence($f) => $body,
            FilterNode::Arithmetic($f) => $body,
            FilterNode::Composite($f) => $body,
            FilterNode::GaussianBlur($f) => $body,
            FilterNode::DirectionalBlur($f) => $body,
            FilterNode::Crop($f) => $body,
            FilterNode::Alpha($f) => $body,
            FilterNode::Transform($f) => $body,
            FilterNode::Lighting($f) => $body,
        }
    };
}

impl FilterNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Blend => Self::Blend(BlendFilter::default()),
            NodeKind::Morphology => Self::Morphology(MorphologyFilter::default()),
            NodeKind::ColorMatrix => Self::ColorMatrix(ColorMatrixFilter::default()),
            NodeKind::Flood => Self::Flood(FloodFilter::default()),
            NodeKind::Tile => Self::Tile(TileFilter::default()),
            NodeKind::TableTransfer => Self::Transfer(TransferFilter::new(TransferKind::Table)),
            NodeKind::DiscreteTransfer => {
                Self::Transfer(TransferFilter::new(TransferKind::Discrete))
            }
            NodeKind::LinearTransfer => Self::Transfer(TransferFilter::new(TransferKind::Linear)),
            NodeKind::GammaTransfer => Self::Transfer(TransferFilter::new(TransferKind::Gamma)),
            NodeKind::ConvolveMatrix => Self::Convolve(ConvolveFilter::default()),
            NodeKind::Offset => Self::Offset(OffsetFilter::default()),
            NodeKind::DisplacementMap => Self::Displacement(DisplacementFilter::default()),
            NodeKind::Turbulence => Self::Turbulence(Box::default()),
            NodeKind::ArithmeticCombine => Self::Arithmetic(ArithmeticFilter::default()),
            NodeKind::Composite => Self::Composite(CompositeFilter::default()),
            NodeKind::GaussianBlur => Self::GaussianBlur(GaussianBlurFilter::default()),
            NodeKind::DirectionalBlur => Self::DirectionalBlur(DirectionalBlurFilter::default()),
            NodeKind::Crop => Self::Crop(CropFilter::default()),
            NodeKind::Premultiply => Self::Alpha(AlphaFilter::premultiply()),
            NodeKind::Unpremultiply => Self::Alpha(AlphaFilter::unpremultiply()),
            NodeKind::Transform => Self::Transform(TransformFilter::default()),
            NodeKind::DiffusePointLight => light(Shading::Diffuse, LightKind::Point),
            NodeKind::DiffuseSpotLight => light(Shading::Diffuse, LightKind::Spot),
            NodeKind::DiffuseDistantLight => light(Shading::Diffuse, LightKind::Distant),
            NodeKind::SpecularPointLight => light(Shading::Specular, LightKind::Point),
            NodeKind::SpecularSpotLight => light(Shading::Specular, LightKind::Spot),
            NodeKind::SpecularDistantLight => light(Shading::Specular, LightKind::Distant),
        }
    }
}

fn light(shading: Shading, kind: LightKind) -> FilterNode {
    FilterNode::Lighting(LightingFilter::new(shading, kind))
}

impl Filter for FilterNode {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        dispatch!(self, f => f.set_attribute(name, value))
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        dispatch!(self, f => f.output_rect(cx, rect))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        dispatch!(self, f => f.render(cx, rect))
    }
}
