use std::collections::HashMap;

use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{Affine, IntPoint, IntRect, Point};
use crate::foundation::error::FxResult;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::{EdgeMode, extend_to_rect};

#[derive(Clone, Debug, Default)]
pub(crate) struct OffsetFilter {
    offset: IntPoint,
}

impl Filter for OffsetFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "offset" => self.offset = value.to_int_point(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(cx
            .input_rect(0, rect.translate(-self.offset))?
            .translate(self.offset))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        cx.fetch_input(0, rect.translate(-self.offset), EdgeMode::None, None)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CropFilter {
    rect: IntRect,
}

impl Filter for CropFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "rect" => self.rect = IntRect::round(value.to_rect(name)?),
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(cx.input_rect(0, rect)?.intersect(&self.rect))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let inside = rect.intersect(&self.rect);
        let Some(buf) = cx.fetch_input(0, inside, EdgeMode::None, None)? else {
            return Ok(None);
        };
        extend_to_rect(buf, inside, rect, EdgeMode::None).map(Some)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TileFilter {
    source_rect: IntRect,
}

impl Filter for TileFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "source_rect" => self.source_rect = value.to_int_rect(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(rect)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let tile = self.source_rect;
        if tile.is_empty() {
            tracing::debug!("tile with empty source rect renders transparent");
            return Ok(None);
        }
        if tile.contains_rect(&rect) {
            return cx.fetch_input(0, rect, EdgeMode::None, None);
        }

        let (w, h) = (i64::from(tile.width), i64::from(tile.height));
        let index = |v: i64, origin: i32, size: i64| (v - i64::from(origin)).div_euclid(size);
        let (ix0, ix1) = (index(i64::from(rect.x), tile.x, w), index(rect.x_most() - 1, tile.x, w));
        let (iy0, iy1) = (index(i64::from(rect.y), tile.y, h), index(rect.y_most() - 1, tile.y, h));

        let mut inputs: HashMap<IntRect, Option<RasterBuffer>> = HashMap::new();
        let mut out: Option<RasterBuffer> = None;
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                let shift = IntPoint::new((ix * w) as i32, (iy * h) as i32);
                let dest = rect.intersect(&tile.translate(shift));
                let src = dest.translate(-shift);
                if src.is_empty() {
                    continue;
                }
                if !inputs.contains_key(&src) {
                    let fetched = cx.fetch_input(0, src, EdgeMode::None, None)?;
                    inputs.insert(src, fetched);
                }
                let Some(Some(input)) = inputs.get(&src) else {
                    continue;
                };
                if out.is_none() {
                    out = Some(RasterBuffer::with_size(rect.size())?);
                }
                let Some(target) = out.as_mut() else {
                    continue;
                };
                target.copy_rect_from(
                    input,
                    IntRect::from_origin_size(IntPoint::ZERO, src.size()),
                    dest.top_left() - rect.top_left(),
                );
            }
        }
        Ok(out)
    }
}

attribute_enum! {
    /// Resampling used by the transform node.
    pub enum SamplingFilter {
        /// Nearest pixel.
        Point => "point",
        /// Bilinear interpolation of premultiplied pixels.
        #[default]
        Linear => "linear",
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TransformFilter {
    matrix: Affine,
    sampling: SamplingFilter,
}

impl Default for TransformFilter {
    fn default() -> Self {
        Self {
            matrix: Affine::IDENTITY,
            sampling: SamplingFilter::Linear,
        }
    }
}

impl TransformFilter {
    fn inverse(&self) -> Option<Affine> {
        let det = self.matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(self.matrix.inverse())
    }

    /// Input pixels needed to produce `rect`, before asking the input what it has.
    fn needed_rect(&self, rect: IntRect) -> Option<IntRect> {
        let inv = self.inverse()?;
        Some(IntRect::round_out(inv.transform_rect_bbox(rect.to_rect())))
    }
}

impl Filter for TransformFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "matrix" => self.matrix = value.to_affine(name)?,
            "sampling_filter" => self.sampling = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let Some(needed) = self.needed_rect(rect) else {
            return Ok(IntRect::ZERO);
        };
        let src = cx.input_rect(0, needed)?;
        if src.is_empty() {
            return Ok(IntRect::ZERO);
        }
        Ok(IntRect::round_out(self.matrix.transform_rect_bbox(src.to_rect())))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let (Some(inv), Some(needed)) = (self.inverse(), self.needed_rect(rect)) else {
            tracing::debug!("non-invertible transform renders transparent");
            return Ok(None);
        };
        if needed == rect && self.matrix == Affine::IDENTITY {
            return cx.fetch_input(0, rect, EdgeMode::None, None);
        }
        // One extra ring so linear taps at the request edge read real neighbors.
        let content = cx.input_rect(0, needed.inflate(1, 1))?;
        let Some(src) = cx.fetch_input(0, content, EdgeMode::None, None)? else {
            return Ok(None);
        };
        let bounds = content.to_rect();

        let mut out = RasterBuffer::with_size(rect.size())?;
        for y in 0..rect.height {
            for x in 0..rect.width {
                let p = Point::new(f64::from(rect.x + x) + 0.5, f64::from(rect.y + y) + 0.5);
                let q = inv * p;
                // Only pixels whose centers map into the input content are covered.
                if q.x < bounds.x0 || q.y < bounds.y0 || q.x >= bounds.x1 || q.y >= bounds.y1 {
                    continue;
                }
                let px = match self.sampling {
                    SamplingFilter::Point => {
                        sample_clamped(&src, content, q.x.floor() as i64, q.y.floor() as i64)
                    }
                    SamplingFilter::Linear => sample_linear(&src, content, q.x - 0.5, q.y - 0.5),
                };
                out.set_pixel(x as u32, y as u32, px);
            }
        }
        Ok(Some(out))
    }
}

/// Pixel at filter-space `(x, y)` of `src`, which covers `area`; coordinates clamp into `area`.
fn sample_clamped(src: &RasterBuffer, area: IntRect, x: i64, y: i64) -> [u8; 4] {
    let sx = x.clamp(i64::from(area.x), area.x_most() - 1) - i64::from(area.x);
    let sy = y.clamp(i64::from(area.y), area.y_most() - 1) - i64::from(area.y);
    src.pixel(sx as u32, sy as u32)
}

/// Bilinear sample at filter-space `(x, y)`, where integer coordinates are pixel centers.
fn sample_linear(src: &RasterBuffer, area: IntRect, x: f64, y: f64) -> [u8; 4] {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (ix, iy) = (x0 as i64, y0 as i64);
    let taps = [
        (ix, iy, (1.0 - fx) * (1.0 - fy)),
        (ix + 1, iy, fx * (1.0 - fy)),
        (ix, iy + 1, (1.0 - fx) * fy),
        (ix + 1, iy + 1, fx * fy),
    ];
    let mut acc = [0.0f64; 4];
    for (tx, ty, w) in taps {
        if w == 0.0 {
            continue;
        }
        let px = sample_clamped(src, area, tx, ty);
        for (a, v) in acc.iter_mut().zip(px) {
            *a += w * f64::from(v);
        }
    }
    acc.map(|v| v.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/geometry.rs"]
mod tests;
