//! Host-side multiscattering pass: immutable inputs in, one owned grid out.

use std::time::Instant;

use aether_atmosphere::{Atmosphere, TransmittanceSampler};
use glam::{UVec2, Vec3};
use tracing::{info, warn};

use crate::error::LutError;
use crate::estimator::{LutTexel, close_series, estimate_multiscattering, to_texel};
use crate::executor::GridExecutor;
use crate::lut::MultiscatteringLut;
use crate::parametrization::{LinearParametrization, Parametrization};
use crate::settings::MultiscatteringSettings;

/// Everything a multiscattering pass reads, bundled and borrowed immutably.
///
/// The pass is a pure function of these inputs: every texel depends only on
/// the atmosphere, the transmittance sampler, the settings and its own
/// decoded `(r, mu)`, so any executor and any evaluation order produce the
/// same table.
pub struct MultiscatteringPass<'a, T: ?Sized, P = LinearParametrization> {
    atmosphere: &'a Atmosphere,
    transmittance: &'a T,
    parametrization: P,
    settings: MultiscatteringSettings,
}

impl<'a, T> MultiscatteringPass<'a, T>
where
    T: TransmittanceSampler + ?Sized,
{
    /// A pass using the linear `(r, mu)` parametrization of `atmosphere`.
    pub fn new(
        atmosphere: &'a Atmosphere,
        transmittance: &'a T,
        settings: MultiscatteringSettings,
    ) -> Result<Self, LutError> {
        let parametrization = LinearParametrization::for_atmosphere(atmosphere);
        Self::with_parametrization(atmosphere, transmittance, parametrization, settings)
    }
}

impl<'a, T, P> MultiscatteringPass<'a, T, P>
where
    T: TransmittanceSampler + ?Sized,
    P: Parametrization,
{
    pub fn with_parametrization(
        atmosphere: &'a Atmosphere,
        transmittance: &'a T,
        parametrization: P,
        settings: MultiscatteringSettings,
    ) -> Result<Self, LutError> {
        settings.validate()?;
        Ok(Self {
            atmosphere,
            transmittance,
            parametrization,
            settings,
        })
    }

    pub fn settings(&self) -> &MultiscatteringSettings {
        &self.settings
    }

    pub fn parametrization(&self) -> &P {
        &self.parametrization
    }

    /// `phi_ms` at an arbitrary `(r, mu)`.
    pub fn evaluate(&self, r: f32, mu: f32) -> Vec3 {
        let sample = estimate_multiscattering(
            self.atmosphere,
            self.transmittance,
            r,
            mu,
            self.settings.dirs,
            self.settings.samples,
        );
        close_series(&sample)
    }

    /// The texel stored at grid cell `(x, y)`.
    pub fn evaluate_cell(&self, x: u32, y: u32) -> LutTexel {
        let (r, mu) = self.parametrization.decode(x, y, self.settings.lut_size);
        to_texel(self.evaluate(r, mu))
    }

    /// Fill `out`, a row-major grid of `lut_size`, writing every texel once.
    pub fn populate<E: GridExecutor>(
        &self,
        out: &mut [LutTexel],
        executor: &E,
    ) -> Result<(), LutError> {
        let size = self.settings.lut_size;
        let expected = self.settings.texel_count();
        if out.len() != expected {
            return Err(LutError::BufferSizeMismatch {
                expected,
                actual: out.len(),
            });
        }

        let start = Instant::now();
        executor.for_each_row(out, size.x as usize, |y, row| {
            for (x, texel) in row.iter_mut().enumerate() {
                *texel = self.evaluate_cell(x as u32, y as u32);
            }
        })?;

        info!(
            "Computed {}x{} multiscattering LUT ({} dirs, {} samples) in {:.2}ms",
            size.x,
            size.y,
            self.settings.dirs,
            self.settings.samples,
            start.elapsed().as_secs_f64() * 1000.0
        );

        let non_finite = out
            .iter()
            .filter(|texel| texel.iter().any(|c| !c.is_finite()))
            .count();
        if non_finite > 0 {
            warn!(
                non_finite,
                "multiscattering LUT holds non-finite texels; check the atmosphere parameters"
            );
        }
        Ok(())
    }

    /// Allocate a grid and populate it.
    pub fn compute<E: GridExecutor>(&self, executor: &E) -> Result<MultiscatteringLut, LutError> {
        let mut data = vec![[0.0; 4]; self.settings.texel_count()];
        self.populate(&mut data, executor)?;
        MultiscatteringLut::new(self.settings.lut_size, data)
    }

    /// Grid size the pass writes.
    pub fn lut_size(&self) -> UVec2 {
        self.settings.lut_size
    }
}
