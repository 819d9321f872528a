use crate::foundation::core::IntRect;
use crate::foundation::error::FxResult;
use crate::graph::attr::attribute_enum;
use crate::raster::buffer::RasterBuffer;

attribute_enum! {
    /// How pixels outside a surface's valid rectangle are synthesized.
    pub enum EdgeMode {
        /// Transparent black.
        #[default]
        None => "none",
        /// Replicate the nearest edge row, column or corner pixel.
        Duplicate => "duplicate",
        /// Repeat the surface periodically.
        Wrap => "wrap",
    }
}

/// Produce a buffer valid over exactly `dest`, given `src` valid over `src_rect`.
///
/// `src` must be sized to `src_rect`. When the rectangles are equal the source is returned
/// untouched.
pub fn extend_to_rect(
    src: RasterBuffer,
    src_rect: IntRect,
    dest: IntRect,
    mode: EdgeMode,
) -> FxResult<RasterBuffer> {
    if src_rect == dest {
        return Ok(src);
    }

    let mut out = RasterBuffer::with_size(dest.size())?;
    if dest.is_empty() || src_rect.is_empty() {
        return Ok(out);
    }

    match mode {
        EdgeMode::Wrap => wrap_into(&mut out, &src, src_rect, dest),
        EdgeMode::None => {
            let overlap = src_rect.intersect(&dest);
            copy_overlap(&mut out, &src, src_rect, dest, overlap);
        }
        EdgeMode::Duplicate => {
            let overlap = src_rect.intersect(&dest);
            if overlap.is_empty() {
                return Ok(out);
            }
            copy_overlap(&mut out, &src, src_rect, dest, overlap);
            duplicate_edges(&mut out, overlap.translate(-dest.top_left()));
        }
    }
    Ok(out)
}

fn copy_overlap(
    out: &mut RasterBuffer,
    src: &RasterBuffer,
    src_rect: IntRect,
    dest: IntRect,
    overlap: IntRect,
) {
    if overlap.is_empty() {
        return;
    }
    out.copy_rect_from(
        src,
        overlap.translate(-src_rect.top_left()),
        overlap.top_left() - dest.top_left(),
    );
}

/// Fill everything outside `inner` (buffer-local) from the edge pixels of `inner`.
///
/// Rows crossing `inner` get their left and right strips from the adjacent column; rows above and
/// below are then copies of the first and last completed rows, which carries the corners along.
fn duplicate_edges(out: &mut RasterBuffer, inner: IntRect) {
    let width = out.width() as usize;
    let x0 = inner.x as usize;
    let x1 = inner.x_most() as usize;
    let y0 = inner.y as u32;
    let y1 = inner.y_most() as u32;

    for y in y0..y1 {
        let row = out.row_mut(y);
        let mut left = [0u8; 4];
        left.copy_from_slice(&row[x0 * 4..x0 * 4 + 4]);
        let mut right = [0u8; 4];
        right.copy_from_slice(&row[(x1 - 1) * 4..x1 * 4]);
        for px in row[..x0 * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&left);
        }
        for px in row[x1 * 4..width * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&right);
        }
    }

    let top = out.row(y0).to_vec();
    for y in 0..y0 {
        out.row_mut(y).copy_from_slice(&top);
    }
    let bottom = out.row(y1 - 1).to_vec();
    for y in y1..out.height() {
        out.row_mut(y).copy_from_slice(&bottom);
    }
}

fn wrap_into(out: &mut RasterBuffer, src: &RasterBuffer, src_rect: IntRect, dest: IntRect) {
    let w = i64::from(src_rect.width);
    let h = i64::from(src_rect.height);
    let tx0 = (i64::from(dest.x) - i64::from(src_rect.x)).div_euclid(w);
    let tx1 = (dest.x_most() - 1 - i64::from(src_rect.x)).div_euclid(w);
    let ty0 = (i64::from(dest.y) - i64::from(src_rect.y)).div_euclid(h);
    let ty1 = (dest.y_most() - 1 - i64::from(src_rect.y)).div_euclid(h);

    for ty in ty0..=ty1 {
        for tx in tx0..=tx1 {
            let x = i64::from(src_rect.x) + tx * w;
            let y = i64::from(src_rect.y) + ty * h;
            let tile = IntRect::from_edges(x, y, x + w, y + h);
            let target = tile.intersect(&dest);
            if target.is_empty() {
                continue;
            }
            out.copy_rect_from(
                src,
                target.translate(-tile.top_left()),
                target.top_left() - dest.top_left(),
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/edge.rs"]
mod tests;
