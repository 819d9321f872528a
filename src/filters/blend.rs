use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, IntRect};
use crate::foundation::error::FxResult;
use crate::foundation::math::fast_div255;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Separable blend function applied by [`NodeKind::Blend`](crate::NodeKind::Blend).
    pub enum BlendMode {
        /// `fg * bg` plus the uncovered parts of each.
        #[default]
        Multiply => "multiply",
        /// Complement of the product of complements.
        Screen => "screen",
        /// Per-channel minimum.
        Darken => "darken",
        /// Per-channel maximum.
        Lighten => "lighten",
    }
}

const IN: usize = 0;
const IN2: usize = 1;

#[derive(Clone, Debug, Default)]
pub(crate) struct BlendFilter {
    mode: BlendMode,
}

impl Filter for BlendFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "blend_mode" => self.mode = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(cx.input_rect(IN, rect)?.union(&cx.input_rect(IN2, rect)?))
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let fg = cx.fetch_input(IN, rect, EdgeMode::None, None)?;
        let bg = cx.fetch_input(IN2, rect, EdgeMode::None, None)?;
        let (fg, mut bg) = match (fg, bg) {
            (Some(fg), Some(bg)) => (fg, bg),
            (one, other) => return Ok(one.or(other)),
        };
        for y in 0..bg.height() {
            let src = fg.row(y);
            let dst = bg.row_mut(y);
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                blend_pixel(self.mode, s, d);
            }
        }
        Ok(Some(bg))
    }
}

/// Blend foreground `fg` onto background `bg` in place (premultiplied BGRA).
pub(crate) fn blend_pixel(mode: BlendMode, fg: &[u8], bg: &mut [u8]) {
    let qa = u32::from(fg[A]);
    let qb = u32::from(bg[A]);
    for i in 0..A {
        let ca = u32::from(fg[i]);
        let cb = u32::from(bg[i]);
        let v = match mode {
            BlendMode::Multiply => (255 - qa) * cb + (255 - qb + cb) * ca,
            BlendMode::Screen => 255 * (cb + ca) - ca * cb,
            BlendMode::Darken => ((255 - qa) * cb + 255 * ca).min((255 - qb) * ca + 255 * cb),
            BlendMode::Lighten => ((255 - qa) * cb + 255 * ca).max((255 - qb) * ca + 255 * cb),
        };
        bg[i] = fast_div255(v).min(255) as u8;
    }
    bg[A] = fast_div255(255 * 255 - (255 - qa) * (255 - qb)).min(255) as u8;
}

#[cfg(test)]
#[path = "../../tests/unit/filters/blend.rs"]
mod tests;
