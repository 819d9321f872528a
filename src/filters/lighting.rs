//! Diffuse and specular lighting of an alpha height field.
//!
//! Normals come from the Sobel-style kernels of the SVG lighting model, with dedicated kernels for
//! the edges and corners of the rendered rectangle.

use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, Color, IntPoint, IntRect};
use crate::foundation::error::FxResult;
use crate::foundation::math::Vec3;
use crate::graph::attr::AttributeValue;
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shading {
    Diffuse,
    Specular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LightKind {
    Point,
    Spot,
    Distant,
}

#[derive(Clone, Debug)]
pub(crate) struct LightingFilter {
    shading: Shading,
    light: LightKind,
    surface_scale: f32,
    diffuse_constant: f32,
    specular_constant: f32,
    specular_exponent: f32,
    color: Color,
    position: Vec3,
    points_at: Vec3,
    specular_focus: f32,
    limiting_cone_angle: f32,
    azimuth: f32,
    elevation: f32,
}

impl LightingFilter {
    pub(crate) fn new(shading: Shading, light: LightKind) -> Self {
        Self {
            shading,
            light,
            surface_scale: 1.0,
            diffuse_constant: 1.0,
            specular_constant: 1.0,
            specular_exponent: 1.0,
            color: Color::white(),
            position: Vec3::new(0.0, 0.0, 0.0),
            points_at: Vec3::new(0.0, 0.0, 0.0),
            specular_focus: 1.0,
            limiting_cone_angle: 90.0,
            azimuth: 0.0,
            elevation: 0.0,
        }
    }

    fn accepts(&self, name: &str) -> bool {
        match name {
            "surface_scale" | "color" => true,
            "diffuse_constant" => self.shading == Shading::Diffuse,
            "specular_constant" | "specular_exponent" => self.shading == Shading::Specular,
            "position" => matches!(self.light, LightKind::Point | LightKind::Spot),
            "points_at" | "specular_focus" | "limiting_cone_angle" => self.light == LightKind::Spot,
            "azimuth" | "elevation" => self.light == LightKind::Distant,
            _ => false,
        }
    }

    /// Unit vector from the surface point toward the light.
    fn light_vector(&self, surface: Vec3) -> Vec3 {
        match self.light {
            LightKind::Point | LightKind::Spot => (self.position - surface).normalized(),
            LightKind::Distant => {
                let (az, el) = (self.azimuth.to_radians(), self.elevation.to_radians());
                Vec3::new(az.cos() * el.cos(), az.sin() * el.cos(), el.sin())
            }
        }
    }

    /// Light color reaching the surface along `l`, as `[r, g, b]` in `0..=255`.
    fn light_color(&self, l: Vec3) -> [f32; 3] {
        let base = [self.color.r * 255.0, self.color.g * 255.0, self.color.b * 255.0];
        if self.light != LightKind::Spot {
            return base;
        }
        let s = (self.points_at - self.position).normalized();
        let cone_cos = self.limiting_cone_angle.to_radians().cos().max(0.0);
        let minus_l_dot_s = -l.dot(s);
        let attenuation = if minus_l_dot_s >= cone_cos {
            minus_l_dot_s.max(0.0).powf(self.specular_focus)
        } else {
            0.0
        };
        base.map(|c| c * attenuation)
    }

    /// Premultiplied BGRA result for normal `n`, light direction `l` and light color.
    fn shade(&self, n: Vec3, l: Vec3, color: [f32; 3]) -> [u8; 4] {
        match self.shading {
            Shading::Diffuse => {
                let k = self.diffuse_constant * n.dot(l).max(0.0);
                let [r, g, b] = color.map(|c| (k * c).min(255.0) as u8);
                [b, g, r, 255]
            }
            Shading::Specular => {
                let h = (l + Vec3::new(0.0, 0.0, 1.0)).normalized();
                let n_dot_h = n.dot(h);
                let (ks, min_alpha) = if n_dot_h <= 0.0 || self.specular_constant <= 0.0 {
                    (0.0, 255)
                } else {
                    (self.specular_constant, 0)
                };
                let k = ks * n_dot_h.max(0.0).powf(self.specular_exponent);
                let [r, g, b] = color.map(|c| (k * c).min(255.0) as u8);
                [b, g, r, min_alpha.max(r).max(g).max(b)]
            }
        }
    }
}

impl Filter for LightingFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        if !self.accepts(name) {
            return Err(unknown_attribute(name));
        }
        match name {
            "surface_scale" => self.surface_scale = value.to_f32(name)?,
            "diffuse_constant" => self.diffuse_constant = value.to_f32(name)?,
            "specular_constant" => self.specular_constant = value.to_f32(name)?,
            "specular_exponent" => self.specular_exponent = value.to_f32(name)?,
            "color" => self.color = value.to_color(name)?,
            "position" => {
                let [x, y, z] = value.to_point3(name)?;
                self.position = Vec3::new(x, y, z);
            }
            "points_at" => {
                let [x, y, z] = value.to_point3(name)?;
                self.points_at = Vec3::new(x, y, z);
            }
            "specular_focus" => self.specular_focus = value.to_f32(name)?,
            "limiting_cone_angle" => self.limiting_cone_angle = value.to_f32(name)?,
            "azimuth" => self.azimuth = value.to_f32(name)?,
            "elevation" => self.elevation = value.to_f32(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, _cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        Ok(rect)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let area = rect.inflate(1, 1);
        let content = cx.input_rect(0, area)?;
        let src = match cx.fetch_input(0, area, EdgeMode::None, None)? {
            Some(buf) => buf,
            None => RasterBuffer::with_size(area.size())?,
        };
        let bounds = content.translate(-area.top_left());
        let mut out = RasterBuffer::with_size(rect.size())?;
        for y in 0..rect.height {
            for x in 0..rect.width {
                let n = surface_normal(&src, bounds, x + 1, y + 1, self.surface_scale);
                let height = f32::from(src.pixel(x as u32 + 1, y as u32 + 1)[A]);
                let z = self.surface_scale * height / 255.0;
                let surface = Vec3::new((rect.x + x) as f32, (rect.y + y) as f32, z);
                let l = self.light_vector(surface);
                let px = self.shade(n, l, self.light_color(l));
                out.set_pixel(x as u32, y as u32, px);
            }
        }
        Ok(Some(out))
    }
}

/// Unit surface normal of the alpha height field at `(x, y)` of `src`.
///
/// `bounds` is the extent of the height field in `src` pixel space: the edge and corner kernels
/// apply on its borders, and points outside it use the interior kernel. Samples outside `src`
/// read as zero height.
pub(crate) fn surface_normal(
    src: &RasterBuffer,
    bounds: IntRect,
    x: i32,
    y: i32,
    surface_scale: f32,
) -> Vec3 {
    let inside = bounds.contains_point(IntPoint::new(x, y));
    if inside && (bounds.width < 2 || bounds.height < 2) {
        return Vec3::new(0.0, 0.0, 1.0);
    }
    let a = |dx: i32, dy: i32| {
        let (sx, sy) = (x + dx, y + dy);
        if sx < 0 || sy < 0 || sx as u32 >= src.width() || sy as u32 >= src.height() {
            return 0;
        }
        i32::from(src.pixel(sx as u32, sy as u32)[A])
    };
    let (left, right, top, bottom) = if inside {
        (
            x == bounds.x,
            i64::from(x) == bounds.x_most() - 1,
            y == bounds.y,
            i64::from(y) == bounds.y_most() - 1,
        )
    } else {
        (false, false, false, false)
    };

    let (fx, fy, nx, ny) = if top && left {
        (
            2.0 / 3.0,
            2.0 / 3.0,
            -2 * a(0, 0) + 2 * a(1, 0) - a(0, 1) + a(1, 1),
            -2 * a(0, 0) - a(1, 0) + 2 * a(0, 1) + a(1, 1),
        )
    } else if top && right {
        (
            2.0 / 3.0,
            2.0 / 3.0,
            -2 * a(-1, 0) + 2 * a(0, 0) - a(-1, 1) + a(0, 1),
            -a(-1, 0) - 2 * a(0, 0) + a(-1, 1) + 2 * a(0, 1),
        )
    } else if top {
        (
            1.0 / 3.0,
            1.0 / 2.0,
            -2 * a(-1, 0) + 2 * a(1, 0) - a(-1, 1) + a(1, 1),
            -a(-1, 0) - 2 * a(0, 0) - a(1, 0) + a(-1, 1) + 2 * a(0, 1) + a(1, 1),
        )
    } else if bottom && left {
        (
            2.0 / 3.0,
            2.0 / 3.0,
            -a(0, -1) + a(1, -1) - 2 * a(0, 0) + 2 * a(1, 0),
            -2 * a(0, -1) - a(1, -1) + 2 * a(0, 0) + a(1, 0),
        )
    } else if bottom && right {
        (
            2.0 / 3.0,
            2.0 / 3.0,
            -a(-1, -1) + a(0, -1) - 2 * a(-1, 0) + 2 * a(0, 0),
            -a(-1, -1) - 2 * a(0, -1) + a(-1, 0) + 2 * a(0, 0),
        )
    } else if bottom {
        (
            1.0 / 3.0,
            1.0 / 2.0,
            -a(-1, -1) + a(1, -1) - 2 * a(-1, 0) + 2 * a(1, 0),
            -a(-1, -1) - 2 * a(0, -1) - a(1, -1) + a(-1, 0) + 2 * a(0, 0) + a(1, 0),
        )
    } else if left {
        (
            1.0 / 2.0,
            1.0 / 3.0,
            -a(0, -1) + a(1, -1) - 2 * a(0, 0) + 2 * a(1, 0) - a(0, 1) + a(1, 1),
            -2 * a(0, -1) - a(1, -1) + 2 * a(0, 1) + a(1, 1),
        )
    } else if right {
        (
            1.0 / 2.0,
            1.0 / 3.0,
            -a(-1, -1) + a(0, -1) - 2 * a(-1, 0) + 2 * a(0, 0) - a(-1, 1) + a(0, 1),
            -a(-1, -1) - 2 * a(0, -1) + a(-1, 1) + 2 * a(0, 1),
        )
    } else {
        (
            1.0 / 4.0,
            1.0 / 4.0,
            -a(-1, -1) + a(1, -1) - 2 * a(-1, 0) + 2 * a(1, 0) - a(-1, 1) + a(1, 1),
            -a(-1, -1) - 2 * a(0, -1) - a(1, -1) + a(-1, 1) + 2 * a(0, 1) + a(1, 1),
        )
    };

    Vec3::new(
        -surface_scale * fx * nx as f32,
        -surface_scale * fy * ny as f32,
        255.0,
    )
    .normalized()
}

#[cfg(test)]
#[path = "../../tests/unit/filters/lighting.rs"]
mod tests;
