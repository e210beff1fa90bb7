//! Diffraction kernels, one per [`PropagationMethod`].
//!
//! With $R^2 = X^2 + Y^2$ on the [`SpatialGrid`]:
//!
//! - **IR Fresnel**: $h = \frac{1}{i\lambda z} \exp\!\left(\frac{ikR^2}{2z}\right)$,
//!   transformed as $H = \mathcal{F}\{\mathrm{shift}(h)\}\,\Delta x^2$.
//! - **Bandlimited angular spectrum**: the IR transfer function with its
//!   magnitude replaced by a rectangular 0/1 pass-band.
//! - **TR Fresnel**: $H = \mathrm{shift}\!\left(e^{ikz} e^{-i\pi\lambda z R^2}\right)$,
//!   used without a forward transform.
//! - **Fraunhofer**: the analytic prefactor
//!   $c = \frac{1}{i\lambda z} \exp\!\left(\frac{ikR^2}{2z}\right)$ applied in
//!   the output plane.

use std::f64::consts::PI;

use ndarray::Array2;
use num_complex::Complex64;

use diffract_compute::{ComputeBackend, ComputeError};

use crate::grid::{FrequencyGrid, SpatialGrid};
use crate::spectral::shift;
use crate::types::{PropagationMethod, WaveParameters};

/// A kernel ready to be combined with the field spectrum.
#[derive(Debug, Clone)]
pub enum Kernel {
    /// Multiplies the spectrum of the centred input field before the
    /// inverse transform.
    Transfer(Array2<Complex64>),
    /// Multiplies the centred, $\Delta x^2$-scaled spectrum directly; no
    /// inverse transform follows.
    FarField(Array2<Complex64>),
}

impl Kernel {
    /// The frequency-domain transfer function, if this kernel has one.
    pub fn transfer(&self) -> Option<&Array2<Complex64>> {
        match self {
            Kernel::Transfer(h) => Some(h),
            Kernel::FarField(_) => None,
        }
    }
}

/// Build the kernel for `method` on `grid`.
pub fn build(
    backend: &dyn ComputeBackend,
    grid: &SpatialGrid,
    params: &WaveParameters,
    method: PropagationMethod,
) -> Result<Kernel, ComputeError> {
    match method {
        PropagationMethod::ImpulseResponseFresnel => {
            impulse_transfer_function(backend, grid, params).map(Kernel::Transfer)
        }
        PropagationMethod::BandlimitedAngularSpectrum => {
            bandlimited_transfer_function(backend, grid, params).map(Kernel::Transfer)
        }
        PropagationMethod::TransferFunctionFresnel => {
            let h = fresnel_transfer(backend, grid, params)?;
            Ok(Kernel::Transfer(shift(&h)))
        }
        PropagationMethod::Fraunhofer => fresnel_impulse(backend, grid, params).map(Kernel::FarField),
    }
}

/// Spatial-domain Fresnel impulse response
/// $h = \frac{1}{i\lambda z} \exp\!\left(\frac{ikR^2}{2z}\right)$.
pub fn fresnel_impulse(
    backend: &dyn ComputeBackend,
    grid: &SpatialGrid,
    params: &WaveParameters,
) -> Result<Array2<Complex64>, ComputeError> {
    let z = params.distance;
    let k = params.wavenumber;
    // 1 / (i * lambda * z) = -i / (lambda * z)
    let prefactor = Complex64::new(0.0, -1.0 / (params.wavelength * z));
    let (rows, cols) = grid.dim();
    backend.parallel_fill(rows, cols, &|i, j| {
        prefactor * Complex64::cis(k * grid.radial_squared(i, j) / (2.0 * z))
    })
}

/// Fresnel transfer function $e^{ikz} e^{-i\pi\lambda z R^2}$, uncentred.
pub fn fresnel_transfer(
    backend: &dyn ComputeBackend,
    grid: &SpatialGrid,
    params: &WaveParameters,
) -> Result<Array2<Complex64>, ComputeError> {
    let z = params.distance;
    let carrier = params.wavenumber * z;
    let chirp = PI * params.wavelength * z;
    let (rows, cols) = grid.dim();
    backend.parallel_fill(rows, cols, &|i, j| {
        Complex64::cis(carrier - chirp * grid.radial_squared(i, j))
    })
}

/// $H = \mathcal{F}\{\mathrm{shift}(h)\}\,\Delta x^2$: the discretised
/// convolution with the impulse response, expressed in frequency space.
pub fn impulse_transfer_function(
    backend: &dyn ComputeBackend,
    grid: &SpatialGrid,
    params: &WaveParameters,
) -> Result<Array2<Complex64>, ComputeError> {
    let h = fresnel_impulse(backend, grid, params)?;
    let area = params.pixel_pitch * params.pixel_pitch;
    Ok(backend.fft2(&shift(&h))?.mapv_into(|v| v * area))
}

/// Anti-aliasing cutoffs `(flim_x, flim_y)` for a `rows x cols` field:
/// $\lfloor 1 / (\lambda \sqrt{(2z/M)^2 + 1}) \rfloor$ and the same with $N$.
pub fn bandlimit_cutoffs(rows: usize, cols: usize, params: &WaveParameters) -> (f64, f64) {
    let cutoff = |n: usize| {
        let w = 2.0 * params.distance / n as f64;
        (1.0 / ((w * w + 1.0).sqrt() * params.wavelength)).floor()
    };
    (cutoff(rows), cutoff(cols))
}

/// Binary pass-band for the bandlimited angular spectrum method.
pub fn bandlimit_mask(grid: &SpatialGrid, params: &WaveParameters) -> Array2<f64> {
    let (rows, cols) = grid.dim();
    let (flim_x, flim_y) = bandlimit_cutoffs(rows, cols, params);
    let mask = FrequencyGrid::from_spatial(grid).passband_mask(flim_x, flim_y);

    let passed = mask.iter().filter(|&&m| m > 0.0).count();
    log::debug!(
        "Bandlimit cutoffs flim_x={}, flim_y={}: {}/{} coefficients pass",
        flim_x,
        flim_y,
        passed,
        mask.len()
    );
    if passed == 0 {
        log::warn!(
            "Bandlimit pass-band is empty (flim_x={}, flim_y={}); the propagated field will be zero",
            flim_x,
            flim_y
        );
    }
    mask
}

/// IR transfer function with magnitude overwritten by the pass-band mask,
/// keeping its phase.
pub fn bandlimited_transfer_function(
    backend: &dyn ComputeBackend,
    grid: &SpatialGrid,
    params: &WaveParameters,
) -> Result<Array2<Complex64>, ComputeError> {
    let h = impulse_transfer_function(backend, grid, params)?;
    let mask = bandlimit_mask(grid, params);
    backend.compose_magnitude(&h, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use diffract_compute::CpuBackend;

    #[test]
    fn test_bandlimit_cutoffs() {
        // lambda = 0.1, z = 8, M = 16: 1 / (0.1 * sqrt(2)) = 7.07 -> 7
        let params = WaveParameters::new(0.1, 8.0, 1.0);
        let (fx, fy) = bandlimit_cutoffs(16, 32, &params);
        assert_eq!(fx, 7.0);
        // N = 32: 1 / (0.1 * sqrt(1.25)) = 8.94 -> 8
        assert_eq!(fy, 8.0);

        // Sign of z does not matter.
        let back = WaveParameters::new(0.1, -8.0, 1.0);
        assert_eq!(bandlimit_cutoffs(16, 32, &back), (fx, fy));
    }

    #[test]
    fn test_fresnel_impulse_at_origin() {
        let backend = CpuBackend::new();
        let params = WaveParameters::new(500e-9, 0.2, 1e-5);
        let grid = SpatialGrid::new(5, 5, params.pixel_pitch);
        let h = fresnel_impulse(&backend, &grid, &params).unwrap();
        // R = 0 at the centre of an odd grid: h = 1 / (i * lambda * z)
        let expected = 1.0 / (params.wavelength * params.distance);
        assert_relative_eq!(h[[2, 2]].im, -expected, max_relative = 1e-12);
        assert_abs_diff_eq!(h[[2, 2]].re, 0.0, epsilon = 1e-6);
        for v in h.iter() {
            assert_relative_eq!(v.norm(), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_fresnel_transfer_is_unit_modulus() {
        let backend = CpuBackend::new();
        let params = WaveParameters::new(633e-9, 0.05, 8e-6);
        let grid = SpatialGrid::new(6, 4, params.pixel_pitch);
        let h = fresnel_transfer(&backend, &grid, &params).unwrap();
        for v in h.iter() {
            assert_abs_diff_eq!(v.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fraunhofer_has_no_transfer_function() {
        let backend = CpuBackend::new();
        let params = WaveParameters::new(633e-9, 1.0, 8e-6);
        let grid = SpatialGrid::new(4, 4, params.pixel_pitch);
        let kernel = build(&backend, &grid, &params, PropagationMethod::Fraunhofer).unwrap();
        assert!(kernel.transfer().is_none());

        let kernel = build(&backend, &grid, &params, PropagationMethod::TransferFunctionFresnel).unwrap();
        assert!(kernel.transfer().is_some());
    }

    /// Off-axis samples on a non-square grid, in units where the Fresnel
    /// phases span many radians.
    fn off_axis() -> (WaveParameters, SpatialGrid, [(usize, usize); 4]) {
        let params = WaveParameters::new(0.5, 3.0, 1.0);
        let grid = SpatialGrid::new(5, 7, params.pixel_pitch);
        (params, grid, [(0, 1), (1, 6), (4, 2), (3, 0)])
    }

    #[test]
    fn test_fresnel_impulse_phase_off_axis() {
        let backend = CpuBackend::new();
        let (params, grid, samples) = off_axis();
        let h = fresnel_impulse(&backend, &grid, &params).unwrap();

        let (lambda, z, k) = (params.wavelength, params.distance, params.wavenumber);
        for (i, j) in samples {
            let r2 = grid.x(i) * grid.x(i) + grid.y(j) * grid.y(j);
            let expected =
                Complex64::new(0.0, -1.0 / (lambda * z)) * Complex64::cis(k * r2 / (2.0 * z));
            assert!(
                (h[[i, j]] - expected).norm() < 1e-9 * expected.norm(),
                "h[{}, {}] = {}, expected {}",
                i,
                j,
                h[[i, j]],
                expected
            );
        }
    }

    #[test]
    fn test_fresnel_transfer_phase_off_axis() {
        let backend = CpuBackend::new();
        let (params, grid, samples) = off_axis();
        let h = fresnel_transfer(&backend, &grid, &params).unwrap();

        let (lambda, z, k) = (params.wavelength, params.distance, params.wavenumber);
        for (i, j) in samples {
            let r2 = grid.x(i) * grid.x(i) + grid.y(j) * grid.y(j);
            let expected = Complex64::cis(k * z - PI * lambda * z * r2);
            assert!(
                (h[[i, j]] - expected).norm() < 1e-9,
                "H[{}, {}] = {}, expected {}",
                i,
                j,
                h[[i, j]],
                expected
            );
        }
    }

    #[test]
    fn test_bandlimited_kernel_matches_serial_composition() {
        let backend = CpuBackend::new();
        let params = WaveParameters::new(0.1, 8.0, 1.0);
        let grid = SpatialGrid::new(16, 12, params.pixel_pitch);

        let ir = impulse_transfer_function(&backend, &grid, &params).unwrap();
        let mask = bandlimit_mask(&grid, &params);
        let expected = crate::amplitude::set_amplitude(&ir, &mask).unwrap();
        let bl = bandlimited_transfer_function(&backend, &grid, &params).unwrap();
        for (a, b) in bl.iter().zip(expected.iter()) {
            assert!((*a - *b).norm() < 1e-12);
        }
    }
}
