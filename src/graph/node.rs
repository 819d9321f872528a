use smallvec::SmallVec;

/// Handle to a node stored in a [`FilterGraph`](crate::FilterGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a leaf raster registered with
/// [`FilterGraph::add_surface`](crate::FilterGraph::add_surface).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub(crate) u32);

impl SurfaceId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an input slot is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    /// A leaf raster. Leaves sit at the filter-space origin and cover their own size.
    Surface(SurfaceId),
    /// Output of another node.
    Node(NodeId),
}

impl From<SurfaceId> for Input {
    fn from(v: SurfaceId) -> Self {
        Self::Surface(v)
    }
}

impl From<NodeId> for Input {
    fn from(v: NodeId) -> Self {
        Self::Node(v)
    }
}

/// Closed set of node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Separable blend of `in` (foreground) over `in2` (background).
    Blend,
    /// Erode or dilate.
    Morphology,
    /// 5x4 color matrix.
    ColorMatrix,
    /// Constant color generator.
    Flood,
    /// Periodic repeat of a source sub-rectangle.
    Tile,
    /// Component transfer with interpolated tables.
    TableTransfer,
    /// Component transfer with step tables.
    DiscreteTransfer,
    /// Component transfer `slope * x + intercept`.
    LinearTransfer,
    /// Component transfer `amplitude * x^exponent + offset`.
    GammaTransfer,
    /// General 2D convolution.
    ConvolveMatrix,
    /// Integer translation.
    Offset,
    /// Per-pixel displacement of `in` driven by `in2`.
    DisplacementMap,
    /// Perlin turbulence or fractal noise generator.
    Turbulence,
    /// `k1*i1*i2 + k2*i1 + k3*i2 + k4` per channel.
    ArithmeticCombine,
    /// N-ary Porter-Duff composite over `in0..inN`.
    Composite,
    /// Triple box approximation of a Gaussian blur on both axes.
    GaussianBlur,
    /// Triple box blur on one axis.
    DirectionalBlur,
    /// Clip to a fixed rectangle.
    Crop,
    /// Straight to premultiplied alpha.
    Premultiply,
    /// Premultiplied to straight alpha.
    Unpremultiply,
    /// Affine resampling.
    Transform,
    /// Diffuse lighting with a point light.
    DiffusePointLight,
    /// Diffuse lighting with a spot light.
    DiffuseSpotLight,
    /// Diffuse lighting with a distant light.
    DiffuseDistantLight,
    /// Specular lighting with a point light.
    SpecularPointLight,
    /// Specular lighting with a spot light.
    SpecularSpotLight,
    /// Specular lighting with a distant light.
    SpecularDistantLight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arity {
    Fixed(usize),
    Variadic,
}

impl NodeKind {
    /// Every node kind, in declaration order.
    pub const ALL: [NodeKind; 27] = [
        Self::Blend,
        Self::Morphology,
        Self::ColorMatrix,
        Self::Flood,
        Self::Tile,
        Self::TableTransfer,
        Self::DiscreteTransfer,
        Self::LinearTransfer,
        Self::GammaTransfer,
        Self::ConvolveMatrix,
        Self::Offset,
        Self::DisplacementMap,
        Self::Turbulence,
        Self::ArithmeticCombine,
        Self::Composite,
        Self::GaussianBlur,
        Self::DirectionalBlur,
        Self::Crop,
        Self::Premultiply,
        Self::Unpremultiply,
        Self::Transform,
        Self::DiffusePointLight,
        Self::DiffuseSpotLight,
        Self::DiffuseDistantLight,
        Self::SpecularPointLight,
        Self::SpecularSpotLight,
        Self::SpecularDistantLight,
    ];

    /// Stable name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blend => "blend",
            Self::Morphology => "morphology",
            Self::ColorMatrix => "color_matrix",
            Self::Flood => "flood",
            Self::Tile => "tile",
            Self::TableTransfer => "table_transfer",
            Self::DiscreteTransfer => "discrete_transfer",
            Self::LinearTransfer => "linear_transfer",
            Self::GammaTransfer => "gamma_transfer",
            Self::ConvolveMatrix => "convolve_matrix",
            Self::Offset => "offset",
            Self::DisplacementMap => "displacement_map",
            Self::Turbulence => "turbulence",
            Self::ArithmeticCombine => "arithmetic_combine",
            Self::Composite => "composite",
            Self::GaussianBlur => "gaussian_blur",
            Self::DirectionalBlur => "directional_blur",
            Self::Crop => "crop",
            Self::Premultiply => "premultiply",
            Self::Unpremultiply => "unpremultiply",
            Self::Transform => "transform",
            Self::DiffusePointLight => "diffuse_point_light",
            Self::DiffuseSpotLight => "diffuse_spot_light",
            Self::DiffuseDistantLight => "diffuse_distant_light",
            Self::SpecularPointLight => "specular_point_light",
            Self::SpecularSpotLight => "specular_spot_light",
            Self::SpecularDistantLight => "specular_distant_light",
        }
    }

    /// Number of input slots of a fixed-arity kind; `None` for [`NodeKind::Composite`], which
    /// takes any number.
    pub fn fixed_inputs(self) -> Option<usize> {
        match self.arity() {
            Arity::Fixed(n) => Some(n),
            Arity::Variadic => None,
        }
    }

    pub(crate) fn arity(self) -> Arity {
        match self {
            Self::Flood | Self::Turbulence => Arity::Fixed(0),
            Self::Blend | Self::DisplacementMap | Self::ArithmeticCombine => Arity::Fixed(2),
            Self::Composite => Arity::Variadic,
            _ => Arity::Fixed(1),
        }
    }

    /// Resolve a slot name to an input index: `in`/`in2` for fixed kinds, `in0`..`inN` for
    /// composite.
    pub(crate) fn slot_index(self, slot: &str) -> Option<usize> {
        match self.arity() {
            Arity::Fixed(n) => {
                let idx = match slot {
                    "in" => 0,
                    "in2" => 1,
                    _ => return None,
                };
                (idx < n).then_some(idx)
            }
            Arity::Variadic => {
                let digits = slot.strip_prefix("in")?;
                if digits.is_empty()
                    || !digits.bytes().all(|b| b.is_ascii_digit())
                    || (digits.len() > 1 && digits.starts_with('0'))
                {
                    return None;
                }
                digits.parse::<usize>().ok().filter(|&i| i < MAX_VARIADIC_INPUTS)
            }
        }
    }

    pub(crate) fn slot_name(self, idx: usize) -> String {
        match (self.arity(), idx) {
            (Arity::Variadic, i) => format!("in{i}"),
            (_, 0) => "in".to_owned(),
            (_, i) => format!("in{}", i + 1),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) const MAX_VARIADIC_INPUTS: usize = 4096;

pub(crate) type InputSlots = SmallVec<[Option<Input>; 2]>;

pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) filter: crate::filters::FilterNode,
    pub(crate) inputs: InputSlots,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        let inputs = match kind.arity() {
            Arity::Fixed(n) => smallvec::smallvec![None; n],
            Arity::Variadic => SmallVec::new(),
        };
        Self {
            kind,
            filter: crate::filters::FilterNode::new(kind),
            inputs,
        }
    }

    pub(crate) fn bind(&mut self, idx: usize, input: Input) {
        if self.inputs.len() <= idx {
            self.inputs.resize(idx + 1, None);
        }
        self.inputs[idx] = Some(input);
    }

    pub(crate) fn bound_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.iter().filter_map(|i| match i {
            Some(Input::Node(n)) => Some(*n),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/node.rs"]
mod tests;
