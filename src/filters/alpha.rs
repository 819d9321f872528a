use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, IntRect};
use crate::foundation::error::FxResult;
use crate::foundation::math::{fast_div255, unpremultiply_table, unpremultiply_with};
use crate::graph::attr::AttributeValue;
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

/// Scale each color channel by `alpha / 255`.
pub(crate) fn premultiply_in_place(buf: &mut RasterBuffer) {
    for y in 0..buf.height() {
        for px in buf.row_mut(y).chunks_exact_mut(4) {
            let a = u32::from(px[A]);
            for c in &mut px[..A] {
                *c = fast_div255(u32::from(*c) * a) as u8;
            }
        }
    }
}

/// Divide each color channel by `alpha / 255`. Zero-alpha pixels get zero color.
pub(crate) fn unpremultiply_in_place(buf: &mut RasterBuffer) {
    let table = unpremultiply_table();
    for y in 0..buf.height() {
        for px in buf.row_mut(y).chunks_exact_mut(4) {
            let t = table[px[A] as usize];
            for c in &mut px[..A] {
                *c = unpremultiply_with(*c, t);
            }
        }
    }
}

/// Premultiply or unpremultiply node; both are pass-through on geometry.
#[derive(Clone, Debug)]
pub(crate) struct AlphaFilter {
    unpremultiply: bool,
}

impl AlphaFilter {
    pub(crate) fn premultiply() -> Self {
        Self {
            unpremultiply: false,
        }
    }

    pub(crate) fn unpremultiply() -> Self {
        Self {
            unpremultiply: true,
        }
    }
}

impl Filter for AlphaFilter {
    fn set_attribute(&mut self, name: &str, _value: &AttributeValue) -> FxResult<()> {
        Err(unknown_attribute(name))
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        cx.input_rect(0, rect)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let Some(mut buf) = cx.fetch_input(0, rect, EdgeMode::None, None)? else {
            return Ok(None);
        };
        if self.unpremultiply {
            unpremultiply_in_place(&mut buf);
        } else {
            premultiply_in_place(&mut buf);
        }
        Ok(Some(buf))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/alpha.rs"]
mod tests;
