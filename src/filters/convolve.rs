use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, B, G, IntPoint, IntRect, IntSize, R, Size};
use crate::foundation::error::FxResult;
use crate::graph::attr::AttributeValue;
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

#[derive(Clone, Debug)]
pub(crate) struct ConvolveFilter {
    kernel_size: IntSize,
    kernel_matrix: Vec<f32>,
    divisor: f32,
    bias: f32,
    target: IntPoint,
    edge_mode: EdgeMode,
    preserve_alpha: bool,
    kernel_unit_length: Size,
    source_rect: IntRect,
}

impl Default for ConvolveFilter {
    fn default() -> Self {
        Self {
            kernel_size: IntSize::default(),
            kernel_matrix: Vec::new(),
            divisor: 1.0,
            bias: 0.0,
            target: IntPoint::ZERO,
            edge_mode: EdgeMode::Duplicate,
            preserve_alpha: false,
            kernel_unit_length: Size::new(1.0, 1.0),
            source_rect: IntRect::ZERO,
        }
    }
}

/// Per-side pixel margins `(left, top, right, bottom)`.
type Margins = (i32, i32, i32, i32);

impl ConvolveFilter {
    /// Why the configuration cannot produce pixels, if it cannot.
    fn degenerate(&self) -> Option<&'static str> {
        let IntSize { width, height } = self.kernel_size;
        if width <= 0 || height <= 0 {
            return Some("non-positive kernel size");
        }
        if self.kernel_matrix.len() as u64 != width as u64 * height as u64 {
            return Some("kernel matrix length does not match kernel size");
        }
        if !IntRect::new(0, 0, width, height).contains_point(self.target) {
            return Some("target outside kernel");
        }
        if self.divisor == 0.0 {
            return Some("zero divisor");
        }
        let kul = self.kernel_unit_length;
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !(positive(kul.width) && positive(kul.height)) {
            return Some("non-positive kernel unit length");
        }
        None
    }

    /// Source pixels read beyond each side of the output.
    fn source_margins(&self) -> Margins {
        let kul = self.kernel_unit_length;
        let (tx, ty) = (f64::from(self.target.x), f64::from(self.target.y));
        let (w, h) = (
            f64::from(self.kernel_size.width),
            f64::from(self.kernel_size.height),
        );
        (
            (tx * kul.width).ceil() as i32,
            (ty * kul.height).ceil() as i32,
            ((w - tx - 1.0) * kul.width).ceil() as i32,
            ((h - ty - 1.0) * kul.height).ceil() as i32,
        )
    }
}

impl Filter for ConvolveFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "kernel_size" => self.kernel_size = value.to_int_size(name)?,
            "kernel_matrix" => self.kernel_matrix = value.to_floats(name)?,
            "divisor" => self.divisor = value.to_f32(name)?,
            "bias" => self.bias = value.to_f32(name)?,
            "target" => self.target = value.to_int_point(name)?,
            "edge_mode" => self.edge_mode = value.to_enum(name)?,
            "preserve_alpha" => self.preserve_alpha = value.to_bool(name)?,
            "kernel_unit_length" => self.kernel_unit_length = value.to_size(name)?,
            "source_rect" => self.source_rect = value.to_int_rect(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        if self.degenerate().is_some() {
            return Ok(IntRect::ZERO);
        }
        let (l, t, r, b) = self.source_margins();
        let src = cx.input_rect(0, rect.inflate_margin(l, t, r, b))?;
        Ok(src.inflate_margin(r, b, l, t))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        if let Some(reason) = self.degenerate() {
            tracing::debug!(reason, "convolve matrix renders transparent");
            return Ok(None);
        }
        let (l, t, r, b) = self.source_margins();
        // One extra pixel for bilinear taps at fractional unit lengths.
        let src_rect = rect.inflate_margin(l, t, r, b).inflate(1, 1);
        let padded = (!self.source_rect.is_empty()).then_some(self.source_rect);
        let Some(src) = cx.fetch_input(0, src_rect, self.edge_mode, padded)? else {
            return Ok(None);
        };

        let offset = rect.top_left() - src_rect.top_left();
        let (kw, kh) = (self.kernel_size.width, self.kernel_size.height);
        let len = self.kernel_matrix.len();
        let channels: &[usize] = if self.preserve_alpha {
            &[R, G, B]
        } else {
            &[R, G, B, A]
        };
        let kul = self.kernel_unit_length;
        let integral_steps = kul.width.fract() == 0.0 && kul.height.fract() == 0.0;
        let bias = self.bias * 255.0;

        let mut out = RasterBuffer::with_size(rect.size())?;
        for y in 0..rect.height {
            for x in 0..rect.width {
                let (sx, sy) = (x + offset.x, y + offset.y);
                let mut sum = [0.0f32; 4];
                for ky in 0..kh {
                    let py = f64::from(sy) + f64::from(ky - self.target.y) * kul.height;
                    for kx in 0..kw {
                        let px = f64::from(sx) + f64::from(kx - self.target.x) * kul.width;
                        let weight = self.kernel_matrix[len - 1 - (ky * kw + kx) as usize];
                        if weight == 0.0 {
                            continue;
                        }
                        for (acc, &c) in sum.iter_mut().zip(channels) {
                            let v = if integral_steps {
                                component_at(&src, px as i32, py as i32, c)
                            } else {
                                component_bilinear(&src, px, py, c)
                            };
                            *acc += weight * f32::from(v);
                        }
                    }
                }

                let mut pixel = [0u8; 4];
                for (acc, &c) in sum.iter().zip(channels) {
                    let v = acc / self.divisor + bias;
                    pixel[c] = if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 };
                }
                if self.preserve_alpha {
                    pixel[A] = component_at(&src, sx, sy, A);
                }
                out.set_pixel(x as u32, y as u32, pixel);
            }
        }
        Ok(Some(out))
    }
}

fn component_at(src: &RasterBuffer, x: i32, y: i32, c: usize) -> u8 {
    let x = x.clamp(0, src.width() as i32 - 1) as usize;
    let y = y.clamp(0, src.height() as i32 - 1) as u32;
    src.row(y)[x * 4 + c]
}

/// 8-bit fixed-point bilinear tap.
fn component_bilinear(src: &RasterBuffer, x: f64, y: f64, c: usize) -> u8 {
    const F: u32 = 256;
    let (lx, ly) = (x.floor(), y.floor());
    let tux = ((x - lx) * f64::from(F)) as u32;
    let tuy = ((y - ly) * f64::from(F)) as u32;
    let (tlx, tly) = (F - tux, F - tuy);
    let (lx, ly) = (lx as i32, ly as i32);
    let cll = u32::from(component_at(src, lx, ly, c));
    let cul = u32::from(component_at(src, lx + 1, ly, c));
    let clu = u32::from(component_at(src, lx, ly + 1, c));
    let cuu = u32::from(component_at(src, lx + 1, ly + 1, c));
    (((cll * tlx + cul * tux) * tly + (clu * tlx + cuu * tux) * tuy + F * F / 2) / (F * F)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filters/convolve.rs"]
mod tests;
