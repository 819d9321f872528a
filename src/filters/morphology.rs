use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{IntRect, IntSize};
use crate::foundation::error::FxResult;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

attribute_enum! {
    /// Direction of a morphology node.
    pub enum MorphologyOperator {
        /// Per-channel minimum over the window.
        #[default]
        Erode => "erode",
        /// Per-channel maximum over the window.
        Dilate => "dilate",
    }
}

/// Windows smaller than this many pixels are scanned directly.
const DIRECT_SCAN_MAX_AREA: i64 = 16;

#[derive(Clone, Debug, Default)]
pub(crate) struct MorphologyFilter {
    radii: IntSize,
    operator: MorphologyOperator,
}

impl MorphologyFilter {
    fn radii(&self) -> (i32, i32) {
        (self.radii.width.max(0), self.radii.height.max(0))
    }
}

impl Filter for MorphologyFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "radii" => self.radii = value.to_int_size(name)?,
            "operator" => self.operator = value.to_enum(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        let (rx, ry) = self.radii();
        let input = cx.input_rect(0, rect.inflate(rx, ry))?;
        Ok(match self.operator {
            MorphologyOperator::Erode => input.deflate(rx, ry),
            MorphologyOperator::Dilate => input.inflate(rx, ry),
        })
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let (rx, ry) = self.radii();
        let src_rect = rect.inflate(rx, ry);
        let Some(src) = cx.fetch_input(0, src_rect, EdgeMode::None, None)? else {
            return Ok(None);
        };
        if rx == 0 && ry == 0 {
            return Ok(Some(src));
        }
        let area = (2 * i64::from(rx) + 1) * (2 * i64::from(ry) + 1);
        let out = if area < DIRECT_SCAN_MAX_AREA {
            morphology_direct(&src, rect.size(), rx, ry, self.operator)?
        } else {
            morphology_histogram(&src, rect.size(), rx, ry, self.operator)?
        };
        Ok(Some(out))
    }
}

/// Scan the full `(2rx+1) x (2ry+1)` window for every output pixel.
///
/// `src` covers the output inflated by the radii.
pub(crate) fn morphology_direct(
    src: &RasterBuffer,
    size: IntSize,
    rx: i32,
    ry: i32,
    op: MorphologyOperator,
) -> FxResult<RasterBuffer> {
    let mut out = RasterBuffer::with_size(size)?;
    let kw = 2 * rx as usize + 1;
    let kh = 2 * ry as u32 + 1;
    let init = match op {
        MorphologyOperator::Erode => 255u8,
        MorphologyOperator::Dilate => 0u8,
    };
    for y in 0..size.height as u32 {
        for x in 0..size.width as usize {
            let mut acc = [init; 4];
            for wy in y..y + kh {
                let row = &src.row(wy)[x * 4..(x + kw) * 4];
                for px in row.chunks_exact(4) {
                    for (a, &v) in acc.iter_mut().zip(px) {
                        *a = match op {
                            MorphologyOperator::Erode => (*a).min(v),
                            MorphologyOperator::Dilate => (*a).max(v),
                        };
                    }
                }
            }
            out.row_mut(y)[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    }
    Ok(out)
}

/// Sliding-window variant: per-channel 256-bucket histograms of the window, reseeded at the
/// first pixel of every row and then updated one column at a time.
pub(crate) fn morphology_histogram(
    src: &RasterBuffer,
    size: IntSize,
    rx: i32,
    ry: i32,
    op: MorphologyOperator,
) -> FxResult<RasterBuffer> {
    let mut out = RasterBuffer::with_size(size)?;
    let kw = 2 * rx as usize + 1;
    let kh = 2 * ry as u32 + 1;
    let mut hist = vec![[0u32; 256]; 4];

    for y in 0..size.height as u32 {
        for x in 0..size.width as usize {
            if x == 0 {
                for h in hist.iter_mut() {
                    h.fill(0);
                }
                for wy in y..y + kh {
                    for px in src.row(wy)[..kw * 4].chunks_exact(4) {
                        for (h, &v) in hist.iter_mut().zip(px) {
                            h[v as usize] += 1;
                        }
                    }
                }
            } else {
                let leaving = (x - 1) * 4;
                let entering = (x + kw - 1) * 4;
                for wy in y..y + kh {
                    let row = src.row(wy);
                    for (c, h) in hist.iter_mut().enumerate() {
                        h[row[leaving + c] as usize] -= 1;
                        h[row[entering + c] as usize] += 1;
                    }
                }
            }

            let dst = &mut out.row_mut(y)[x * 4..x * 4 + 4];
            for (d, h) in dst.iter_mut().zip(hist.iter()) {
                *d = match op {
                    MorphologyOperator::Erode => lowest_occupied(h),
                    MorphologyOperator::Dilate => highest_occupied(h),
                };
            }
        }
    }
    Ok(out)
}

/// Constant-time scan: every bucket is visited, the last occupied one wins.
fn highest_occupied(h: &[u32; 256]) -> u8 {
    let mut result = 0u32;
    for (v, &count) in h.iter().enumerate() {
        let occupied = u32::from(count != 0);
        result = occupied * v as u32 + (1 - occupied) * result;
    }
    result as u8
}

fn lowest_occupied(h: &[u32; 256]) -> u8 {
    let mut result = 255u32;
    for (v, &count) in h.iter().enumerate().rev() {
        let occupied = u32::from(count != 0);
        result = occupied * v as u32 + (1 - occupied) * result;
    }
    result as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filters/morphology.rs"]
mod tests;
