//! Perlin turbulence and fractal noise.
//!
//! The lattice is rebuilt whenever the seed changes; rendering only evaluates it.

use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{IntRect, Size};
use crate::foundation::error::FxResult;
use crate::foundation::math::fast_div255;
use crate::graph::attr::{AttributeValue, attribute_enum};
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;

attribute_enum! {
    /// How octaves are accumulated.
    pub enum TurbulenceType {
        /// Sum of absolute noise values.
        #[default]
        Turbulence => "turbulence",
        /// Signed sum, remapped around mid-gray.
        FractalNoise => "fractal_noise",
    }
}

const LATTICE_SIZE: usize = 256;
const LATTICE_MASK: i64 = 0xff;
const PERLIN_N: f64 = 4096.0;
/// Octaves past this many contribute less than `2^-32` of the first and are not evaluated.
const MAX_OCTAVES: u32 = 32;

/// Park–Miller minimal standard generator, evaluated with Schrage's method.
struct ParkMiller(i64);

impl ParkMiller {
    const M: i64 = 2_147_483_647;
    const A: i64 = 16_807;
    const Q: i64 = 127_773;
    const R: i64 = 2_836;

    fn new(seed: i32) -> Self {
        let mut s = i64::from(seed);
        if s <= 0 {
            s = -(s % (Self::M - 1)) + 1;
        }
        Self(s.min(Self::M - 1))
    }

    fn next(&mut self) -> i64 {
        let mut r = Self::A * (self.0 % Self::Q) - Self::R * (self.0 / Self::Q);
        if r <= 0 {
            r += Self::M;
        }
        self.0 = r;
        r
    }

    /// Gradient component in `[-1, 1)`.
    fn component(&mut self) -> f64 {
        let size = LATTICE_SIZE as i64;
        ((self.next() % (2 * size)) - size) as f64 / size as f64
    }
}

/// Lattice wrap state for seamless tiling; doubles every octave.
///
/// Arithmetic wraps: the values only matter modulo the 256-entry lattice, and extreme
/// frequencies or tile sizes must not abort a render.
#[derive(Clone, Copy, Debug)]
struct Stitch {
    width: i64,
    height: i64,
    wrap_x: i64,
    wrap_y: i64,
}

impl Stitch {
    fn next_octave(&mut self) {
        let n = PERLIN_N as i64;
        self.width = self.width.wrapping_mul(2);
        self.wrap_x = self.wrap_x.wrapping_mul(2).wrapping_sub(n);
        self.height = self.height.wrapping_mul(2);
        self.wrap_y = self.wrap_y.wrapping_mul(2).wrapping_sub(n);
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PerlinLattice {
    /// Permutation of lattice indices.
    selector: Vec<usize>,
    /// Unit gradients per channel (R, G, B, A), indexed by permuted lattice index.
    gradients: [Vec<[f64; 2]>; 4],
}

impl PerlinLattice {
    pub(crate) fn new(seed: i32) -> Self {
        let mut rng = ParkMiller::new(seed);
        let mut gradients: [Vec<[f64; 2]>; 4] = Default::default();
        for channel in gradients.iter_mut() {
            channel.reserve(LATTICE_SIZE);
            for _ in 0..LATTICE_SIZE {
                let (a, b) = loop {
                    let a = rng.component();
                    let b = rng.component();
                    if a != 0.0 || b != 0.0 {
                        break (a, b);
                    }
                };
                let len = (a * a + b * b).sqrt();
                channel.push([a / len, b / len]);
            }
        }

        let mut selector: Vec<usize> = (0..LATTICE_SIZE).collect();
        for i in (1..LATTICE_SIZE).rev() {
            let j = (rng.next() % LATTICE_SIZE as i64) as usize;
            selector.swap(i, j);
        }

        Self { selector, gradients }
    }

    /// Gradient noise at `v` for all four channels.
    fn noise2(&self, v: [f64; 2], stitch: Option<&Stitch>) -> [f64; 4] {
        let tx = v[0] + PERLIN_N;
        let ty = v[1] + PERLIN_N;
        let (mut bx0, mut by0) = (tx as i64, ty as i64);
        let (mut bx1, mut by1) = (bx0.wrapping_add(1), by0.wrapping_add(1));
        let rx0 = tx - tx.trunc();
        let ry0 = ty - ty.trunc();
        let (rx1, ry1) = (rx0 - 1.0, ry0 - 1.0);

        if let Some(s) = stitch {
            if bx0 >= s.wrap_x {
                bx0 = bx0.wrapping_sub(s.width);
            }
            if bx1 >= s.wrap_x {
                bx1 = bx1.wrapping_sub(s.width);
            }
            if by0 >= s.wrap_y {
                by0 = by0.wrapping_sub(s.height);
            }
            if by1 >= s.wrap_y {
                by1 = by1.wrapping_sub(s.height);
            }
        }

        let at = |b: i64| (b & LATTICE_MASK) as usize;
        let i = self.selector[at(bx0)];
        let j = self.selector[at(bx1)];
        let b00 = self.selector[at(by0.wrapping_add(i as i64))];
        let b10 = self.selector[at(by0.wrapping_add(j as i64))];
        let b01 = self.selector[at(by1.wrapping_add(i as i64))];
        let b11 = self.selector[at(by1.wrapping_add(j as i64))];

        let sx = s_curve(rx0);
        let sy = s_curve(ry0);
        let mut out = [0.0; 4];
        for (o, g) in out.iter_mut().zip(&self.gradients) {
            let dot = |q: [f64; 2], x: f64, y: f64| x * q[0] + y * q[1];
            let a = lerp(sx, dot(g[b00], rx0, ry0), dot(g[b10], rx1, ry0));
            let b = lerp(sx, dot(g[b01], rx0, ry1), dot(g[b11], rx1, ry1));
            *o = lerp(sy, a, b);
        }
        out
    }

    /// Octave sum at `(x, y)` for all four channels in R, G, B, A order.
    fn accumulate(
        &self,
        x: f64,
        y: f64,
        freq: (f64, f64),
        octaves: u32,
        fractal: bool,
        stitch: Option<Stitch>,
    ) -> [f64; 4] {
        let mut sum = [0.0; 4];
        let mut v = [x * freq.0, y * freq.1];
        let mut ratio = 1.0;
        let mut stitch = stitch;
        for _ in 0..octaves.min(MAX_OCTAVES) {
            let n = self.noise2(v, stitch.as_ref());
            for (s, n) in sum.iter_mut().zip(n) {
                let n = if fractal { n } else { n.abs() };
                *s += n / ratio;
            }
            v = [v[0] * 2.0, v[1] * 2.0];
            ratio *= 2.0;
            if let Some(s) = stitch.as_mut() {
                s.next_octave();
            }
        }
        sum
    }
}

fn s_curve(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Closest frequency to `freq` whose period divides `length` evenly.
fn snap_frequency(freq: f64, length: f64) -> f64 {
    if freq == 0.0 {
        return freq;
    }
    let lo = (length * freq).floor() / length;
    let hi = (length * freq).ceil() / length;
    if freq / lo < hi / freq { lo } else { hi }
}

#[derive(Clone, Debug)]
pub(crate) struct TurbulenceFilter {
    base_frequency: Size,
    num_octaves: u32,
    seed: i32,
    stitchable: bool,
    kind: TurbulenceType,
    rect: IntRect,
    lattice: PerlinLattice,
}

impl Default for TurbulenceFilter {
    fn default() -> Self {
        Self {
            base_frequency: Size::ZERO,
            num_octaves: 1,
            seed: 0,
            stitchable: false,
            kind: TurbulenceType::Turbulence,
            rect: IntRect::ZERO,
            lattice: PerlinLattice::new(0),
        }
    }
}

impl TurbulenceFilter {
    /// Effective frequencies and initial stitch state.
    fn frequencies(&self) -> ((f64, f64), Option<Stitch>) {
        let (mut fx, mut fy) = (self.base_frequency.width, self.base_frequency.height);
        if !self.stitchable {
            return ((fx, fy), None);
        }
        let tile = self.rect.to_rect();
        fx = snap_frequency(fx, tile.width());
        fy = snap_frequency(fy, tile.height());
        let width = (tile.width() * fx + 0.5) as i64;
        let height = (tile.height() * fy + 0.5) as i64;
        let stitch = Stitch {
            width,
            height,
            wrap_x: (tile.x0 * fx + PERLIN_N + width as f64) as i64,
            wrap_y: (tile.y0 * fy + PERLIN_N + height as f64) as i64,
        };
        ((fx, fy), Some(stitch))
    }

    /// Premultiplied BGRA pixel at filter-space `(x, y)`.
    fn pixel(&self, x: f64, y: f64, freq: (f64, f64), stitch: Option<Stitch>) -> [u8; 4] {
        let fractal = self.kind == TurbulenceType::FractalNoise;
        let sum = self
            .lattice
            .accumulate(x, y, freq, self.num_octaves, fractal, stitch);
        let [r, g, b, a] = sum.map(|v| {
            let v = if fractal { (v * 255.0 + 255.0) / 2.0 } else { v * 255.0 };
            v.clamp(0.0, 255.0) as u32
        });
        [
            fast_div255(b * a) as u8,
            fast_div255(g * a) as u8,
            fast_div255(r * a) as u8,
            a as u8,
        ]
    }
}

impl Filter for TurbulenceFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        match name {
            "base_frequency" => self.base_frequency = value.to_size(name)?,
            "num_octaves" => self.num_octaves = value.to_u32(name)?,
            "seed" => {
                self.seed = value.to_i32(name)?;
                self.lattice = PerlinLattice::new(self.seed);
            }
            "stitchable" => self.stitchable = value.to_bool(name)?,
            "type" => self.kind = value.to_enum(name)?,
            "rect" => self.rect = value.to_int_rect(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(rect.intersect(&self.rect))
    }

    fn render(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let area = rect.intersect(&self.rect);
        if area.is_empty() {
            return Ok(None);
        }
        let (freq, stitch) = self.frequencies();
        let mut out = RasterBuffer::with_size(rect.size())?;
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                let px = self.pixel(f64::from(x), f64::from(y), freq, stitch);
                out.set_pixel((x - rect.x) as u32, (y - rect.y) as u32, px);
            }
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/turbulence.rs"]
mod tests;
