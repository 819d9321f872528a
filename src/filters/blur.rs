use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::IntRect;
use crate::foundation::error::FxResult;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Axis of a directional blur.
    pub enum BlurDirection {
        /// Horizontal.
        #[default]
        X => "x",
        /// Vertical.
        Y => "y",
    }
}

const MAX_BOX_SIZE: u32 = 1024;

/// Box width approximating a Gaussian of `std_deviation` with three passes.
pub(crate) fn blur_box_size(std_deviation: f32) -> u32 {
    if !std_deviation.is_finite() || std_deviation <= 0.0 {
        return 0;
    }
    let d = f64::from(std_deviation) * 3.0 * (2.0 * std::f64::consts::PI).sqrt() / 4.0;
    ((d + 0.5).floor() as u64).min(u64::from(MAX_BOX_SIZE)) as u32
}

/// `(left, right)` lobes of the three passes for box size `d`.
pub(crate) fn box_lobes(d: u32) -> [(usize, usize); 3] {
    let long = (d / 2) as usize;
    if d % 2 == 1 {
        [(long, long); 3]
    } else {
        let short = long.saturating_sub(1);
        [(long, short), (short, long), (long, long)]
    }
}

/// Pixels of margin the three passes read beyond the output on each side.
fn margin(d: u32) -> i32 {
    (3 * d.div_ceil(2)) as i32
}

/// One box pass over a line. Sample positions are clamped to the line.
pub(crate) fn box_blur_line(input: &[u8], output: &mut [u8], left: usize, right: usize) {
    let len = input.len();
    if len == 0 {
        return;
    }
    let box_size = left + right + 1;
    if box_size == 1 {
        output.copy_from_slice(input);
        return;
    }
    let reciprocal = u64::from(u32::MAX / 255 / box_size as u32);
    let last = len as isize - 1;
    let at = |pos: isize| u64::from(input[pos.clamp(0, last) as usize]);

    let mut sum: u64 = (0..box_size as isize).map(|i| at(i - left as isize)).sum();
    for (x, out) in output.iter_mut().enumerate() {
        *out = ((sum * reciprocal) >> 24).min(255) as u8;
        let leaving = x as isize - left as isize;
        sum = sum + at(leaving + box_size as isize) - at(leaving);
    }
}

/// Triple box blur of every channel along rows (`horizontal`) or columns, in place.
pub(crate) fn blur_axis(buf: &mut RasterBuffer, d: u32, horizontal: bool) {
    if d == 0 {
        return;
    }
    let lobes = box_lobes(d);
    let (w, h) = (buf.width() as usize, buf.height() as usize);
    let len = if horizontal { w } else { h };
    let lines = if horizontal { h } else { w };
    let mut a = vec![0u8; len];
    let mut b = vec![0u8; len];

    for line in 0..lines {
        for c in 0..4 {
            for (i, v) in a.iter_mut().enumerate() {
                *v = if horizontal {
                    buf.row(line as u32)[i * 4 + c]
                } else {
                    buf.row(i as u32)[line * 4 + c]
                };
            }
            for (left, right) in lobes {
                box_blur_line(&a, &mut b, left, right);
                std::mem::swap(&mut a, &mut b);
            }
            for (i, &v) in a.iter().enumerate() {
                if horizontal {
                    buf.row_mut(line as u32)[i * 4 + c] = v;
                } else {
                    buf.row_mut(i as u32)[line * 4 + c] = v;
                }
            }
        }
    }
}

/// Shared rect logic for blurs with box sizes `dx`, `dy`.
fn blur_output_rect(cx: &NodeCx<'_, '_>, rect: IntRect, dx: u32, dy: u32) -> FxResult<IntRect> {
    let (mx, my) = (margin(dx), margin(dy));
    Ok(cx.input_rect(0, rect.inflate(mx, my))?.inflate(mx, my))
}

fn blur_render(
    cx: &NodeCx<'_, '_>,
    rect: IntRect,
    dx: u32,
    dy: u32,
) -> FxResult<Option<RasterBuffer>> {
    let (mx, my) = (margin(dx), margin(dy));
    let src_rect = rect.inflate(mx, my);
    let Some(mut buf) = cx.fetch_input(0, src_rect, EdgeMode::None, None)? else {
        return Ok(None);
    };
    if dx == 0 && dy == 0 {
        return Ok(Some(buf));
    }
    blur_axis(&mut buf, dx, true);
    blur_axis(&mut buf, dy, false);
    buf.sub_buffer(IntRect::new(mx, my, rect.width, rect.height)).map(Some)
}

#[derive(Clone, Debug, Default)]
pub(crate) struct GaussianBlurFilter {
    std_deviation: f32,
}

impl Filter for GaussianBlurFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "std_deviation" => self.std_deviation = value.to_f32(name)?.max(0.0),
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let d = blur_box_size(self.std_deviation);
        blur_output_rect(cx, rect, d, d)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let d = blur_box_size(self.std_deviation);
        blur_render(cx, rect, d, d)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DirectionalBlurFilter {
    std_deviation: f32,
    direction: BlurDirection,
}

impl DirectionalBlurFilter {
    fn box_sizes(&self) -> (u32, u32) {
        let d = blur_box_size(self.std_deviation);
        match self.direction {
            BlurDirection::X => (d, 0),
            BlurDirection::Y => (0, d),
        }
    }
}

impl Filter for DirectionalBlurFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "std_deviation" => self.std_deviation = value.to_f32(name)?.max(0.0),
            "direction" => self.direction = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let (dx, dy) = self.box_sizes();
        blur_output_rect(cx, rect, dx, dy)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let (dx, dy) = self.box_sizes();
        blur_render(cx, rect, dx, dy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/blur.rs"]
mod tests;
