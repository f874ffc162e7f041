//! The finished multiscattering table.

use glam::{UVec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::LutError;
use crate::estimator::LutTexel;
use crate::parametrization::Parametrization;

/// Row-major grid of `phi_ms` texels, x indexing `mu` and y the altitude.
///
/// Deserialization goes through [`MultiscatteringLut::new`], so a stored
/// table whose texel count does not match its size is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LutData")]
pub struct MultiscatteringLut {
    pub size: UVec2,
    pub data: Vec<LutTexel>,
}

/// Unchecked serialized form of [`MultiscatteringLut`].
#[derive(Deserialize)]
struct LutData {
    size: UVec2,
    data: Vec<LutTexel>,
}

impl TryFrom<LutData> for MultiscatteringLut {
    type Error = LutError;

    fn try_from(raw: LutData) -> Result<Self, LutError> {
        Self::new(raw.size, raw.data)
    }
}

impl MultiscatteringLut {
    /// Wrap texels produced by a pass, checking they fill the grid.
    pub fn new(size: UVec2, data: Vec<LutTexel>) -> Result<Self, LutError> {
        let expected = size.x as usize * size.y as usize;
        if data.len() != expected {
            return Err(LutError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    /// Texel at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<LutTexel> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.data
            .get(y as usize * self.size.x as usize + x as usize)
            .copied()
    }

    fn texel(&self, x: u32, y: u32) -> Vec4 {
        Vec4::from_array(self.data[(y * self.size.x + x) as usize])
    }

    /// Bilinearly filtered `phi_ms` at `(r, mu)`, clamped to the grid edge.
    pub fn sample<P: Parametrization + ?Sized>(&self, r: f32, mu: f32, parametrization: &P) -> Vec3 {
        if self.data.is_empty() {
            return Vec3::ZERO;
        }
        let uv = parametrization.encode(r, mu, self.size);
        let max = (self.size - UVec2::ONE).as_vec2();
        let f = (uv * self.size.as_vec2() - 0.5).clamp(glam::Vec2::ZERO, max);

        let x0 = f.x.floor() as u32;
        let y0 = f.y.floor() as u32;
        let x1 = (x0 + 1).min(self.size.x - 1);
        let y1 = (y0 + 1).min(self.size.y - 1);
        let t = f - f.floor();

        let bottom = self.texel(x0, y0).lerp(self.texel(x1, y0), t.x);
        let top = self.texel(x0, y1).lerp(self.texel(x1, y1), t.x);
        bottom.lerp(top, t.y).truncate()
    }

    /// Raw little-endian RGBA32F texels, ready for upload or a file.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Number of texels holding a NaN or infinite channel.
    pub fn non_finite_count(&self) -> usize {
        self.data
            .iter()
            .filter(|texel| texel.iter().any(|c| !c.is_finite()))
            .count()
    }
}
