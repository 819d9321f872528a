use anyhow::Context;

use crate::foundation::core::{A, B, G, IntPoint, IntRect, IntSize, R};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::{unpremultiply_table, unpremultiply_with};

const ROW_ALIGN: usize = 16;

/// Owned BGRA8 pixel buffer, premultiplied unless a node documents otherwise.
///
/// Byte order per pixel is `B, G, R, A`. Rows are padded to a 16-byte pitch, so `stride()` may
/// exceed `width * 4`; padding bytes are always zero and never read by filters.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

impl RasterBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        let stride = (width as usize)
            .checked_mul(4)
            .and_then(|v| v.checked_add(ROW_ALIGN - 1))
            .map(|v| v & !(ROW_ALIGN - 1))
            .ok_or_else(|| FxError::evaluation("raster row size overflow"))?;
        let len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| FxError::evaluation("raster buffer size overflow"))?;
        Ok(Self {
            width,
            height,
            stride,
            data: vec![0u8; len],
        })
    }

    /// Allocate a buffer covering `size`; negative dimensions are rejected.
    pub fn with_size(size: IntSize) -> FxResult<Self> {
        if size.width < 0 || size.height < 0 {
            return Err(FxError::evaluation(format!(
                "raster size must be non-negative, got {}x{}",
                size.width, size.height
            )));
        }
        Self::new(size.width as u32, size.height as u32)
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel (BGRA bytes).
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> FxResult<Self> {
        let mut out = Self::new(width, height)?;
        for y in 0..height {
            let row = out.row_mut(y);
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                px.copy_from_slice(&f(x as u32, y));
            }
        }
        Ok(out)
    }

    /// Buffer filled with one BGRA value.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> FxResult<Self> {
        Self::from_fn(width, height, |_, _| px)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as an integer size.
    pub fn size(&self) -> IntSize {
        IntSize::new(self.width as i32, self.height as i32)
    }

    /// Rectangle `(0, 0, width, height)`.
    pub fn bounds(&self) -> IntRect {
        IntRect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Row pitch in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes including row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Visible bytes of row `y` (`width * 4` long).
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 4]
    }

    /// Mutable visible bytes of row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * 4;
        &mut self.data[start..start + len]
    }

    /// BGRA bytes at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride + x as usize * 4;
        [
            self.data[i + B],
            self.data[i + G],
            self.data[i + R],
            self.data[i + A],
        ]
    }

    /// Overwrite the BGRA bytes at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = y as usize * self.stride + x as usize * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// True when every pixel is zero in all four channels.
    pub fn is_transparent(&self) -> bool {
        (0..self.height).all(|y| self.row(y).iter().all(|&b| b == 0))
    }

    /// Copy `src_rect` (in `src` pixel coordinates) so its top-left lands on `dst` in `self`.
    /// The copy is clipped to both buffers.
    pub fn copy_rect_from(&mut self, src: &RasterBuffer, src_rect: IntRect, dst: IntPoint) {
        let shift = dst - src_rect.top_left();
        let clipped = src_rect
            .intersect(&src.bounds())
            .intersect(&self.bounds().translate(-shift));
        if clipped.is_empty() {
            return;
        }
        let dst_rect = clipped.translate(shift);
        let len = clipped.width as usize * 4;
        for row in 0..clipped.height {
            let sy = (clipped.y + row) as u32;
            let dy = (dst_rect.y + row) as u32;
            let sx = clipped.x as usize * 4;
            let dx = dst_rect.x as usize * 4;
            let src_row = &src.row(sy)[sx..sx + len];
            self.row_mut(dy)[dx..dx + len].copy_from_slice(src_row);
        }
    }

    /// Copy of the pixels inside `rect` (clipped to the buffer, zero outside).
    pub fn sub_buffer(&self, rect: IntRect) -> FxResult<RasterBuffer> {
        let mut out = RasterBuffer::with_size(rect.size())?;
        out.copy_rect_from(self, rect, IntPoint::ZERO);
        Ok(out)
    }

    /// Convert a straight-alpha RGBA image into a premultiplied BGRA buffer.
    pub fn from_rgba_image(img: &image::RgbaImage) -> FxResult<Self> {
        let (w, h) = img.dimensions();
        Self::from_fn(w, h, |x, y| {
            let [r, g, b, a] = img.get_pixel(x, y).0;
            if a == 0 {
                return [0, 0, 0, 0];
            }
            let pm = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
            [pm(b), pm(g), pm(r), a]
        })
    }

    /// Decode encoded image bytes (PNG) into a premultiplied BGRA buffer.
    pub fn decode(bytes: &[u8]) -> FxResult<Self> {
        let img = image::load_from_memory(bytes).context("decode raster image from memory")?;
        Self::from_rgba_image(&img.to_rgba8())
    }

    /// Convert to a straight-alpha RGBA image, unpremultiplying each pixel.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let table = unpremultiply_table();
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixel(x, y);
            let t = table[px[A] as usize];
            image::Rgba([
                unpremultiply_with(px[R], t),
                unpremultiply_with(px[G], t),
                unpremultiply_with(px[B], t),
                px[A],
            ])
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
