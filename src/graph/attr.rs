use crate::foundation::core::{
    Affine, Color, IntPoint, IntRect, IntSize, Matrix5x4, Point, Rect, Size,
};
use crate::foundation::error::{FxError, FxResult};

/// Untyped attribute value accepted by
/// [`FilterGraph::set_attribute`](crate::FilterGraph::set_attribute).
///
/// Every typed configuration value converts into one of these shapes; each node kind coerces it
/// back to its own field type and rejects mismatched shapes:
///
/// - scalars (`f32`, `i32`, `u32`) become `Float`
/// - points, sizes and colors become `Floats` (`[x, y]`, `[w, h]`, `[r, g, b, a]`)
/// - rectangles become `Floats` as `[x, y, width, height]`
/// - `Matrix5x4` becomes 20 row-major floats, `Affine` its 6 coefficients
/// - enums become their snake_case name as `Text`; plain strings are taken as that name
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Single number.
    Float(f64),
    /// Fixed or variable length number list.
    Floats(Vec<f64>),
    /// Enum name.
    Text(String),
}

impl AttributeValue {
    fn shape(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "number",
            Self::Floats(_) => "number list",
            Self::Text(_) => "text",
        }
    }

    fn mismatch(&self, name: &str, expected: &str) -> FxError {
        FxError::configuration(format!(
            "attribute `{name}` expects {expected}, got {}",
            self.shape()
        ))
    }

    pub(crate) fn to_bool(&self, name: &str) -> FxResult<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(name, "bool")),
        }
    }

    pub(crate) fn to_f32(&self, name: &str) -> FxResult<f32> {
        match self {
            Self::Float(v) if v.is_finite() => Ok(*v as f32),
            Self::Float(_) => Err(FxError::configuration(format!(
                "attribute `{name}` must be finite"
            ))),
            _ => Err(self.mismatch(name, "number")),
        }
    }

    pub(crate) fn to_i32(&self, name: &str) -> FxResult<i32> {
        match self {
            Self::Float(v) => integral(name, *v),
            _ => Err(self.mismatch(name, "integer")),
        }
    }

    pub(crate) fn to_u32(&self, name: &str) -> FxResult<u32> {
        let v = self.to_i32(name)?;
        u32::try_from(v).map_err(|_| {
            FxError::configuration(format!("attribute `{name}` must be >= 0, got {v}"))
        })
    }

    pub(crate) fn to_floats(&self, name: &str) -> FxResult<Vec<f32>> {
        match self {
            Self::Floats(v) => {
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(FxError::configuration(format!(
                        "attribute `{name}` must contain only finite numbers"
                    )));
                }
                Ok(v.iter().map(|&x| x as f32).collect())
            }
            _ => Err(self.mismatch(name, "number list")),
        }
    }

    fn to_fixed<const N: usize>(&self, name: &str) -> FxResult<[f64; N]> {
        match self {
            Self::Floats(v) if v.len() == N && v.iter().all(|x| x.is_finite()) => {
                let mut out = [0.0f64; N];
                out.copy_from_slice(v);
                Ok(out)
            }
            Self::Floats(v) => Err(FxError::configuration(format!(
                "attribute `{name}` expects {N} finite numbers, got {}",
                v.len()
            ))),
            _ => Err(self.mismatch(name, &format!("{N} numbers"))),
        }
    }

    pub(crate) fn to_int_size(&self, name: &str) -> FxResult<IntSize> {
        let [w, h] = self.to_fixed::<2>(name)?;
        Ok(IntSize::new(integral(name, w)?, integral(name, h)?))
    }

    pub(crate) fn to_int_point(&self, name: &str) -> FxResult<IntPoint> {
        let [x, y] = self.to_fixed::<2>(name)?;
        Ok(IntPoint::new(integral(name, x)?, integral(name, y)?))
    }

    pub(crate) fn to_int_rect(&self, name: &str) -> FxResult<IntRect> {
        let [x, y, w, h] = self.to_fixed::<4>(name)?;
        Ok(IntRect::new(
            integral(name, x)?,
            integral(name, y)?,
            integral(name, w)?,
            integral(name, h)?,
        ))
    }

    pub(crate) fn to_rect(&self, name: &str) -> FxResult<Rect> {
        let [x, y, w, h] = self.to_fixed::<4>(name)?;
        Ok(Rect::new(x, y, x + w, y + h))
    }

    pub(crate) fn to_size(&self, name: &str) -> FxResult<Size> {
        let [w, h] = self.to_fixed::<2>(name)?;
        Ok(Size::new(w, h))
    }

    pub(crate) fn to_point3(&self, name: &str) -> FxResult<[f32; 3]> {
        let [x, y, z] = self.to_fixed::<3>(name)?;
        Ok([x as f32, y as f32, z as f32])
    }

    pub(crate) fn to_color(&self, name: &str) -> FxResult<Color> {
        let [r, g, b, a] = self.to_fixed::<4>(name)?;
        Ok(Color::new(r as f32, g as f32, b as f32, a as f32))
    }

    pub(crate) fn to_matrix(&self, name: &str) -> FxResult<Matrix5x4> {
        let v = self.to_fixed::<20>(name)?;
        let mut m = [0.0f32; 20];
        for (dst, src) in m.iter_mut().zip(v) {
            *dst = src as f32;
        }
        Ok(Matrix5x4::from_row_major(&m))
    }

    pub(crate) fn to_affine(&self, name: &str) -> FxResult<Affine> {
        Ok(Affine::new(self.to_fixed::<6>(name)?))
    }

    pub(crate) fn to_enum<T>(&self, name: &str) -> FxResult<T>
    where
        T: std::str::FromStr<Err = FxError>,
    {
        match self {
            Self::Text(s) => s.parse::<T>().map_err(|e| {
                FxError::configuration(format!("attribute `{name}`: {e}"))
            }),
            _ => Err(self.mismatch(name, "name")),
        }
    }

    /// Parse a JSON attribute value (number, bool, string or number array).
    pub fn from_json(name: &str, value: &serde_json::Value) -> FxResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            FxError::configuration(format!("attribute `{name}` has unsupported JSON value: {e}"))
        })
    }
}

fn integral(name: &str, v: f64) -> FxResult<i32> {
    if !v.is_finite() || v.fract() != 0.0 || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return Err(FxError::configuration(format!(
            "attribute `{name}` expects an integer, got {v}"
        )));
    }
    Ok(v as i32)
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<f32>> for AttributeValue {
    fn from(v: Vec<f32>) -> Self {
        Self::Floats(v.into_iter().map(f64::from).collect())
    }
}

impl From<&[f32]> for AttributeValue {
    fn from(v: &[f32]) -> Self {
        Self::Floats(v.iter().map(|&x| f64::from(x)).collect())
    }
}

impl<const N: usize> From<[f32; N]> for AttributeValue {
    fn from(v: [f32; N]) -> Self {
        Self::Floats(v.iter().map(|&x| f64::from(x)).collect())
    }
}

impl<const N: usize> From<[f64; N]> for AttributeValue {
    fn from(v: [f64; N]) -> Self {
        Self::Floats(v.to_vec())
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Floats(v)
    }
}

impl From<IntSize> for AttributeValue {
    fn from(v: IntSize) -> Self {
        Self::Floats(vec![f64::from(v.width), f64::from(v.height)])
    }
}

impl From<IntPoint> for AttributeValue {
    fn from(v: IntPoint) -> Self {
        Self::Floats(vec![f64::from(v.x), f64::from(v.y)])
    }
}

impl From<IntRect> for AttributeValue {
    fn from(v: IntRect) -> Self {
        Self::Floats(vec![
            f64::from(v.x),
            f64::from(v.y),
            f64::from(v.width),
            f64::from(v.height),
        ])
    }
}

impl From<Rect> for AttributeValue {
    fn from(v: Rect) -> Self {
        Self::Floats(vec![v.x0, v.y0, v.width(), v.height()])
    }
}

impl From<Point> for AttributeValue {
    fn from(v: Point) -> Self {
        Self::Floats(vec![v.x, v.y])
    }
}

impl From<Size> for AttributeValue {
    fn from(v: Size) -> Self {
        Self::Floats(vec![v.width, v.height])
    }
}

impl From<Affine> for AttributeValue {
    fn from(v: Affine) -> Self {
        Self::Floats(v.as_coeffs().to_vec())
    }
}

impl From<Color> for AttributeValue {
    fn from(v: Color) -> Self {
        Self::from([v.r, v.g, v.b, v.a])
    }
}

impl From<Matrix5x4> for AttributeValue {
    fn from(v: Matrix5x4) -> Self {
        Self::from(v.to_row_major())
    }
}

/// Declares a closed attribute enum with a stable snake_case name per variant, plus the
/// `FromStr`, serde and [`AttributeValue`] conversions every attribute enum shares.
macro_rules! attribute_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:tt,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Stable attribute name of this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::foundation::error::FxError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::foundation::error::FxError::configuration(format!(
                        "unknown {} `{}`",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for $crate::graph::attr::AttributeValue {
            fn from(v: $name) -> Self {
                $crate::graph::attr::AttributeValue::Text(v.as_str().to_owned())
            }
        }
    };
}

pub(crate) use attribute_enum;

#[cfg(test)]
#[path = "../../tests/unit/graph/attr.rs"]
mod tests;
