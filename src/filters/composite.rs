use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, Color, IntRect};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::fast_div255;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Porter-Duff operator folded over the inputs of a composite node.
    pub enum CompositeOperator {
        /// Source over destination.
        #[default]
        Over => "over",
        /// Source where destination is.
        In => "in",
        /// Source where destination is not.
        Out => "out",
        /// Source over destination, kept only where destination is.
        Atop => "atop",
        /// Source and destination where they do not overlap.
        Xor => "xor",
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CompositeFilter {
    operator: CompositeOperator,
}

impl Filter for CompositeFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "operator" => self.operator = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let mut out = IntRect::ZERO;
        for idx in 0..cx.input_count()? {
            let r = cx.input_rect(idx, rect)?;
            out = if self.operator == CompositeOperator::In && idx > 0 {
                out.intersect(&r)
            } else {
                out.union(&r)
            };
        }
        Ok(out)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let count = cx.input_count()?;
        let mut dest = cx.fetch_input(0, rect, EdgeMode::None, None)?;
        for idx in 1..count {
            let src = cx.fetch_input(idx, rect, EdgeMode::None, None)?;
            dest = match (dest, src) {
                (Some(mut d), Some(s)) => {
                    composite_in_place(self.operator, &mut d, &s);
                    Some(d)
                }
                (d, None) => match self.operator {
                    CompositeOperator::In | CompositeOperator::Out => None,
                    _ => d,
                },
                (None, s) => match self.operator {
                    CompositeOperator::In | CompositeOperator::Atop => None,
                    _ => s,
                },
            };
        }
        Ok(dest)
    }
}

/// `dest = src OP dest` for every channel, alpha included.
pub(crate) fn composite_in_place(
    op: CompositeOperator,
    dest: &mut RasterBuffer,
    src: &RasterBuffer,
) {
    for y in 0..dest.height() {
        let s_row = src.row(y);
        let d_row = dest.row_mut(y);
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let qa = u32::from(d[A]);
            let qb = u32::from(s[A]);
            for i in 0..4 {
                let ca = u32::from(d[i]);
                let cb = u32::from(s[i]);
                let v = match op {
                    CompositeOperator::Over => ca * (255 - qb) + cb * 255,
                    CompositeOperator::In => cb * qa,
                    CompositeOperator::Out => cb * (255 - qa),
                    CompositeOperator::Atop => cb * qa + ca * (255 - qb),
                    CompositeOperator::Xor => cb * (255 - qa) + ca * (255 - qb),
                };
                d[i] = fast_div255(v).min(255) as u8;
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ArithmeticFilter {
    k: [f32; 4],
}

impl Filter for ArithmeticFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "coefficients" => {
                let v = value.to_floats(name)?;
                self.k = v.as_slice().try_into().map_err(|_| {
                    FxError::configuration(format!(
                        "attribute `{name}` expects 4 numbers, got {}",
                        v.len()
                    ))
                })?;
            }
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let [k1, k2, k3, k4] = self.k;
        if k4 > 0.0 {
            return Ok(rect);
        }
        let r1 = cx.input_rect(0, rect)?;
        let r2 = cx.input_rect(1, rect)?;
        let mut out = IntRect::ZERO;
        if k1 > 0.0 {
            out = r1.intersect(&r2);
        }
        if k2 > 0.0 {
            out = out.union(&r1);
        }
        if k3 > 0.0 {
            out = out.union(&r2);
        }
        Ok(out)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let i1 = cx.fetch_input(0, rect, EdgeMode::None, None)?;
        let i2 = cx.fetch_input(1, rect, EdgeMode::None, None)?;
        let [mut k1, mut k2, mut k3, k4] = self.k;
        let (i1, i2) = match (i1, i2) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => {
                k1 = 0.0;
                k3 = 0.0;
                (a.clone(), a)
            }
            (None, Some(b)) => {
                k1 = 0.0;
                k2 = 0.0;
                (b.clone(), b)
            }
            (None, None) => {
                if k4 <= 0.0 {
                    return Ok(None);
                }
                let t = RasterBuffer::with_size(rect.size())?;
                (t.clone(), t)
            }
        };
        let mut out = i1;
        for y in 0..out.height() {
            let row2 = i2.row(y);
            for (a, b) in out.row_mut(y).iter_mut().zip(row2) {
                let (x1, x2) = (f32::from(*a), f32::from(*b));
                let v = k1 * x1 * x2 / 255.0 + k2 * x1 + k3 * x2 + k4 * 255.0;
                *a = if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 };
            }
        }
        Ok(Some(out))
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FloodFilter {
    color: Color,
}

impl Filter for FloodFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "color" => self.color = value.to_color(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(rect)
    }

    fn render(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let px = self.color.to_premul_bgra();
        if px == [0; 4] {
            return Ok(None);
        }
        RasterBuffer::filled(rect.width as u32, rect.height as u32, px).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/composite.rs"]
mod tests;
