use crate::filters::alpha::{premultiply_in_place, unpremultiply_in_place};
use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, B, G, IntRect, Matrix5x4, R};
use crate::foundation::error::FxResult;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Alpha encoding the color matrix operates in.
    pub enum AlphaMode {
        /// Input is unpremultiplied before the matrix and premultiplied after.
        #[default]
        Premultiplied => "premultiplied",
        /// Matrix is applied to the stored bytes as is.
        Straight => "straight",
    }
}

/// Channel order of matrix rows and columns, as byte offsets.
const RGBA: [usize; 4] = [R, G, B, A];

#[derive(Clone, Debug, Default)]
pub(crate) struct ColorMatrixFilter {
    matrix: Matrix5x4,
    alpha_mode: AlphaMode,
}

impl Filter for ColorMatrixFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "matrix" => self.matrix = value.to_matrix(name)?,
            "alpha_mode" => self.alpha_mode = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        if self.matrix.alpha_bias() > 0.0 {
            return Ok(rect);
        }
        cx.input_rect(0, rect)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let mut buf = match cx.fetch_input(0, rect, EdgeMode::None, None)? {
            Some(buf) => buf,
            None if self.matrix.alpha_bias() > 0.0 => RasterBuffer::with_size(rect.size())?,
            None => return Ok(None),
        };
        let premultiplied = self.alpha_mode == AlphaMode::Premultiplied;
        if premultiplied {
            unpremultiply_in_place(&mut buf);
        }
        apply_color_matrix(&mut buf, &self.matrix);
        if premultiplied {
            premultiply_in_place(&mut buf);
        }
        Ok(Some(buf))
    }
}

/// Apply `m` to every pixel in 16.16 fixed point.
pub(crate) fn apply_color_matrix(buf: &mut RasterBuffer, m: &Matrix5x4) {
    let mut coef = [[0i64; 4]; 4];
    let mut bias = [0i64; 4];
    for out in 0..4 {
        for (input, row) in coef.iter_mut().enumerate() {
            row[out] = (f64::from(m.rows[input][out]) * 65536.0).round() as i64;
        }
        bias[out] = (f64::from(m.rows[4][out]) * 255.0 * 65536.0).round() as i64;
    }

    for y in 0..buf.height() {
        for px in buf.row_mut(y).chunks_exact_mut(4) {
            let input = RGBA.map(|off| i64::from(px[off]));
            for (out, &off) in RGBA.iter().enumerate() {
                let mut acc = bias[out] + 32768;
                for (c, v) in input.iter().enumerate() {
                    acc += v * coef[c][out];
                }
                px[off] = (acc >> 16).clamp(0, 255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/color_matrix.rs"]
mod tests;
