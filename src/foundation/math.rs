/// Integer `v / 255` via `((v << 8) + v + 255) >> 16`. Exact for `v <= 255 * 255`.
#[inline]
pub fn fast_div255(v: u32) -> u32 {
    ((v << 8) + v + 255) >> 16
}

/// `fast_div255(a * b)` narrowed to a byte.
#[inline]
pub fn mul_div255(a: u8, b: u8) -> u8 {
    fast_div255(u32::from(a) * u32::from(b)) as u8
}

/// Reciprocal table used to unpremultiply: `t[a] = 255 * 256 / a`, `t[0] = 0`.
pub fn unpremultiply_table() -> &'static [u32; 256] {
    static TABLE: std::sync::OnceLock<[u32; 256]> = std::sync::OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = [0u32; 256];
        for (a, slot) in t.iter_mut().enumerate().skip(1) {
            *slot = (255 * 256) / a as u32;
        }
        t
    })
}

/// Unpremultiply one color byte with a precomputed reciprocal.
#[inline]
pub fn unpremultiply_with(c: u8, recip: u32) -> u8 {
    ((u32::from(c) * recip + 128) >> 8).min(255) as u8
}

/// Small 3D vector for lighting math.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Vec3::default();
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
