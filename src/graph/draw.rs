use crate::foundation::core::{A, IntRect, Point, Rect, Vec2};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::{fast_div255, mul_div255};
use crate::graph::attr::attribute_enum;
use crate::raster::buffer::RasterBuffer;

attribute_enum! {
    /// How a blit combines with the existing destination pixels.
    pub enum DrawOperator {
        /// Source over destination.
        #[default]
        Over => "over",
        /// Replace destination.
        Source => "source",
    }
}

/// Blit parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawOptions {
    /// Global opacity in `[0, 1]`.
    pub alpha: f32,
    /// Compositing operator.
    pub operator: DrawOperator,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            operator: DrawOperator::Over,
        }
    }
}

/// Destination of a filter draw.
///
/// `dest` and `source` are float rectangles of equal size: `source` is in the pixel space of
/// `surface`, `dest` in the target's.
pub trait DrawTarget {
    /// Blit `source` of `surface` onto `dest`.
    fn draw_surface(
        &mut self,
        surface: &RasterBuffer,
        dest: Rect,
        source: Rect,
        options: &DrawOptions,
    ) -> FxResult<()>;
}

/// Map the rendered `output_rect` of a filter back onto the caller's (possibly sub-pixel)
/// `source_rect` and hand it to the target.
pub(crate) fn draw_buffer(
    target: &mut dyn DrawTarget,
    buf: &RasterBuffer,
    output_rect: IntRect,
    source_rect: Rect,
    dest_point: Point,
    options: &DrawOptions,
) -> FxResult<()> {
    let source_to_dest: Vec2 = dest_point - source_rect.origin();
    let rendered = output_rect.to_rect().intersect(source_rect);
    if rendered.width() <= 0.0 || rendered.height() <= 0.0 {
        return Ok(());
    }
    let dest = rendered + source_to_dest;
    let in_buffer = rendered - output_rect.to_rect().origin().to_vec2();
    target.draw_surface(buf, dest, in_buffer, options)
}

/// CPU draw target owning a premultiplied BGRA raster.
///
/// Destination pixels whose centers fall inside `dest` sample the nearest source pixel.
#[derive(Clone, Debug)]
pub struct RasterDrawTarget {
    buffer: RasterBuffer,
}

impl RasterDrawTarget {
    /// Transparent target of the given size.
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        Ok(Self {
            buffer: RasterBuffer::new(width, height)?,
        })
    }

    /// Target that draws over an existing raster.
    pub fn from_buffer(buffer: RasterBuffer) -> Self {
        Self { buffer }
    }

    /// Current pixels.
    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    /// Consume the target and return its pixels.
    pub fn into_buffer(self) -> RasterBuffer {
        self.buffer
    }
}

impl DrawTarget for RasterDrawTarget {
    fn draw_surface(
        &mut self,
        surface: &RasterBuffer,
        dest: Rect,
        source: Rect,
        options: &DrawOptions,
    ) -> FxResult<()> {
        if !options.alpha.is_finite() {
            return Err(FxError::evaluation("draw alpha must be finite"));
        }
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        let opacity = (options.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let sx = source.width() / dest.width();
        let sy = source.height() / dest.height();

        let covered = IntRect::round_out(dest).intersect(&self.buffer.bounds());
        for y in covered.y..covered.y_most() as i32 {
            let cy = f64::from(y) + 0.5;
            if cy < dest.y0 || cy >= dest.y1 {
                continue;
            }
            let src_y = (source.y0 + (cy - dest.y0) * sy).floor();
            if src_y < 0.0 || src_y >= f64::from(surface.height()) {
                continue;
            }
            for x in covered.x..covered.x_most() as i32 {
                let cx = f64::from(x) + 0.5;
                if cx < dest.x0 || cx >= dest.x1 {
                    continue;
                }
                let src_x = (source.x0 + (cx - dest.x0) * sx).floor();
                if src_x < 0.0 || src_x >= f64::from(surface.width()) {
                    continue;
                }
                let mut src = surface.pixel(src_x as u32, src_y as u32);
                if opacity != 255 {
                    for c in &mut src {
                        *c = mul_div255(*c, opacity);
                    }
                }
                let out = match options.operator {
                    DrawOperator::Source => src,
                    DrawOperator::Over => over(self.buffer.pixel(x as u32, y as u32), src),
                };
                self.buffer.set_pixel(x as u32, y as u32, out);
            }
        }
        Ok(())
    }
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let inv = 255 - u32::from(src[A]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = u32::from(src[i]) + fast_div255(u32::from(dst[i]) * inv);
        out[i] = v.min(255) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/graph/draw.rs"]
mod tests;
