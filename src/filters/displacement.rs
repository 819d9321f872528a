use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, B, G, IntRect, R};
use crate::foundation::error::FxResult;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Channel of the displacement map that drives one axis.
    pub enum ColorChannel {
        /// Red.
        #[default]
        R => "r",
        /// Green.
        G => "g",
        /// Blue.
        B => "b",
        /// Alpha.
        A => "a",
    }
}

impl ColorChannel {
    fn byte_offset(self) -> usize {
        match self {
            Self::R => R,
            Self::G => G,
            Self::B => B,
            Self::A => A,
        }
    }
}

const IN: usize = 0;
const MAP: usize = 1;

#[derive(Clone, Debug)]
pub(crate) struct DisplacementFilter {
    scale: f32,
    x_channel: ColorChannel,
    y_channel: ColorChannel,
}

impl Default for DisplacementFilter {
    fn default() -> Self {
        Self {
            scale: 0.0,
            x_channel: ColorChannel::R,
            y_channel: ColorChannel::G,
        }
    }
}

impl DisplacementFilter {
    fn margin(&self) -> i32 {
        (self.scale.abs() / 2.0).ceil() as i32
    }
}

impl Filter for DisplacementFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "scale" => self.scale = value.to_f32(name)?,
            "x_channel" => self.x_channel = value.to_enum(name)?,
            "y_channel" => self.y_channel = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let m = self.margin();
        Ok(cx.input_rect(IN, rect.inflate(m, m))?.inflate(m, m))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let m = self.margin();
        let src_rect = rect.inflate(m, m);
        let Some(src) = cx.fetch_input(IN, src_rect, EdgeMode::None, None)? else {
            return Ok(None);
        };
        let Some(map) = cx.fetch_input(MAP, rect, EdgeMode::None, None)? else {
            return Ok(None);
        };

        let offset = rect.top_left() - src_rect.top_left();
        let (xc, yc) = (self.x_channel.byte_offset(), self.y_channel.byte_offset());
        let scale_over_255 = self.scale / 255.0;
        let adjustment = 0.5 - self.scale / 2.0;
        let (sw, sh) = (src.width() as i64, src.height() as i64);

        let mut out = RasterBuffer::with_size(rect.size())?;
        for y in 0..rect.height as u32 {
            for x in 0..rect.width as u32 {
                let mp = map.pixel(x, y);
                let dx = (scale_over_255 * f32::from(mp[xc]) + adjustment).floor() as i64;
                let dy = (scale_over_255 * f32::from(mp[yc]) + adjustment).floor() as i64;
                let sx = i64::from(x) + dx + i64::from(offset.x);
                let sy = i64::from(y) + dy + i64::from(offset.y);
                if sx < 0 || sy < 0 || sx >= sw || sy >= sh {
                    continue;
                }
                out.set_pixel(x, y, src.pixel(sx as u32, sy as u32));
            }
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/displacement.rs"]
mod tests;
