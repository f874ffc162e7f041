//! Per-pass multiscattering settings.

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// Resolution and sample counts of the multiscattering LUT.
///
/// Fixed for the duration of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiscatteringSettings {
    /// Output grid size: x indexes the light cosine, y the altitude.
    pub lut_size: UVec2,
    /// Number of directions sampled over the sphere for every texel.
    pub dirs: u32,
    /// Number of march steps along each sampled direction.
    pub samples: u32,
}

impl Default for MultiscatteringSettings {
    fn default() -> Self {
        Self {
            lut_size: UVec2::new(32, 32),
            dirs: 64,
            samples: 20,
        }
    }
}

impl MultiscatteringSettings {
    /// Reject settings that would leave the pass undefined.
    pub fn validate(&self) -> Result<(), LutError> {
        if self.lut_size.x == 0 || self.lut_size.y == 0 {
            return Err(LutError::ZeroDimensions {
                width: self.lut_size.x,
                height: self.lut_size.y,
            });
        }
        if self.dirs == 0 {
            return Err(LutError::ZeroDirections);
        }
        if self.samples == 0 {
            return Err(LutError::ZeroSamples);
        }
        Ok(())
    }

    /// Number of texels in the output grid.
    pub fn texel_count(&self) -> usize {
        self.lut_size.x as usize * self.lut_size.y as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = MultiscatteringSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.texel_count(), 32 * 32);
    }

    #[test]
    fn test_rejects_zero_counts() {
        let mut settings = MultiscatteringSettings::default();
        settings.dirs = 0;
        assert!(matches!(settings.validate(), Err(LutError::ZeroDirections)));

        let mut settings = MultiscatteringSettings::default();
        settings.samples = 0;
        assert!(matches!(settings.validate(), Err(LutError::ZeroSamples)));

        let mut settings = MultiscatteringSettings::default();
        settings.lut_size = UVec2::new(32, 0);
        assert!(matches!(
            settings.validate(),
            Err(LutError::ZeroDimensions {
                width: 32,
                height: 0
            })
        ));
    }

    #[test]
    fn test_single_texel_grid_is_valid() {
        let settings = MultiscatteringSettings {
            lut_size: UVec2::ONE,
            dirs: 1,
            samples: 1,
        };
        assert!(settings.validate().is_ok());
    }
}
