//! Free-space propagation of a complex field between parallel planes.
//!
//! [`BeamPropagator`] validates its inputs, builds the coordinate grid and
//! the kernel for the selected [`PropagationMethod`], and combines the kernel
//! with the spectrum of the centred input field:
//!
//! $$
//! U_2 = \mathrm{unshift}\!\left(\mathcal{F}^{-1}\{H \cdot \mathcal{F}\{\mathrm{shift}(U_1)\}\}\right)
//! $$
//!
//! except for Fraunhofer, where
//! $U_2 = c \cdot \mathrm{unshift}(\mathcal{F}\{\mathrm{shift}(U_1)\})\,\Delta x^2$.
//!
//! All validation happens before any transform; a failed call never
//! produces a partial field.

pub mod kernels;

use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayD, ArrayView2, ArrayView3, Axis, IxDyn};
use num_complex::Complex64;
use thiserror::Error;

use diffract_compute::{ComputeBackend, ComputeError, CpuBackend};

use crate::grid::SpatialGrid;
use crate::spectral::{shift, unshift};
use crate::types::{Field, PropagationMethod, WaveParameters};
use kernels::Kernel;

/// Errors that can occur during a propagation.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Unsupported propagation method '{0}'. Valid methods: IR Fresnel, TR Fresnel, Bandlimited Angular Spectrum, Fraunhofer")]
    UnsupportedMethod(String),

    #[error("Invalid field shape {shape:?}: {reason}")]
    ShapeError { shape: Vec<usize>, reason: String },

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}

impl PropagationError {
    pub(crate) fn invalid(name: &'static str, reason: String) -> Self {
        PropagationError::InvalidParameter { name, reason }
    }
}

fn check_plane_shape(shape: &[usize]) -> Result<(), PropagationError> {
    if shape.iter().rev().take(2).any(|&n| n == 0) {
        return Err(PropagationError::ShapeError {
            shape: shape.to_vec(),
            reason: "trailing dimensions must be non-zero".into(),
        });
    }
    Ok(())
}

/// Propagates fields through a [`ComputeBackend`].
///
/// Stateless apart from the backend handle: every call builds its own grid
/// and kernel, so one propagator may serve concurrent calls.
pub struct BeamPropagator {
    pub backend: Arc<dyn ComputeBackend>,
}

impl Default for BeamPropagator {
    fn default() -> Self {
        Self {
            backend: Arc::new(CpuBackend::new()),
        }
    }
}

impl BeamPropagator {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }

    /// Propagate a single 2D field by `params.distance`.
    ///
    /// Returns a new field of the same shape; the input is not modified.
    pub fn propagate(
        &self,
        field: &Field,
        params: &WaveParameters,
        method: PropagationMethod,
    ) -> Result<Field, PropagationError> {
        params.validate()?;
        self.propagate_plane(field.view(), params, method)
    }

    /// Propagate a stack of independent fields, shape `(batch, M, N)`.
    ///
    /// Slices are propagated in parallel.
    pub fn propagate_batch(
        &self,
        fields: ArrayView3<'_, Complex64>,
        params: &WaveParameters,
        method: PropagationMethod,
    ) -> Result<Array3<Complex64>, PropagationError> {
        params.validate()?;
        let (batch, rows, cols) = fields.dim();
        check_plane_shape(&[batch, rows, cols])?;
        if batch == 0 {
            return Ok(Array3::zeros((0, rows, cols)));
        }

        let planes = fields
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|plane| self.propagate_plane(plane, params, method))
            .collect::<Result<Vec<Field>, _>>()?;

        let views: Vec<ArrayView2<'_, Complex64>> = planes.iter().map(|p| p.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| PropagationError::ShapeError {
            shape: vec![batch, rows, cols],
            reason: e.to_string(),
        })
    }

    /// Propagate an array of any rank >= 2; leading axes are batch axes.
    pub fn propagate_dyn(
        &self,
        field: &ArrayD<Complex64>,
        params: &WaveParameters,
        method: PropagationMethod,
    ) -> Result<ArrayD<Complex64>, PropagationError> {
        let shape = field.shape().to_vec();
        if shape.len() < 2 {
            return Err(PropagationError::ShapeError {
                shape,
                reason: "expected at least 2 dimensions".into(),
            });
        }
        check_plane_shape(&shape)?;

        let (rows, cols) = (shape[shape.len() - 2], shape[shape.len() - 1]);
        let batch: usize = shape[..shape.len() - 2].iter().product();
        let shape_error = |e: ndarray::ShapeError| PropagationError::ShapeError {
            shape: shape.clone(),
            reason: e.to_string(),
        };

        let stacked = field.to_shape((batch, rows, cols)).map_err(shape_error)?;
        let out = self.propagate_batch(stacked.view(), params, method)?;
        out.into_shape_with_order(IxDyn(&shape)).map_err(shape_error)
    }

    fn propagate_plane(
        &self,
        field: ArrayView2<'_, Complex64>,
        params: &WaveParameters,
        method: PropagationMethod,
    ) -> Result<Field, PropagationError> {
        let (rows, cols) = field.dim();
        check_plane_shape(&[rows, cols])?;

        log::debug!(
            "{} propagation on {}x{} grid: z={:.4e} m, dx={:.3e} m, wavelength={:.3e} m ({})",
            method,
            rows,
            cols,
            params.distance,
            params.pixel_pitch,
            params.wavelength,
            self.backend.device_info().name
        );

        let backend = self.backend.as_ref();
        let grid = SpatialGrid::new(rows, cols, params.pixel_pitch);
        let kernel = kernels::build(backend, &grid, params, method)?;
        let spectrum = backend.fft2(&shift(&field.to_owned()))?;

        let result = match kernel {
            Kernel::Transfer(h) => {
                let product = backend.multiply(&h, &spectrum)?;
                unshift(&backend.ifft2(&product)?)
            }
            Kernel::FarField(c) => {
                let area = params.pixel_pitch * params.pixel_pitch;
                let scaled = unshift(&spectrum).mapv_into(|v| v * area);
                backend.multiply(&c, &scaled)?
            }
        };
        Ok(result)
    }
}

/// Propagate `field` with the default CPU backend.
///
/// # Arguments
/// * `field` - Complex input field (M x N).
/// * `wavenumber` - $k = 2\pi/\lambda$ (rad/m), see [`crate::types::wavenumber`].
/// * `distance` - Propagation distance (m), non-zero.
/// * `pixel_pitch` - Grid sampling pitch (m).
/// * `wavelength` - Wavelength (m).
/// * `method` - Kernel-construction strategy.
pub fn propagate(
    field: &Field,
    wavenumber: f64,
    distance: f64,
    pixel_pitch: f64,
    wavelength: f64,
    method: PropagationMethod,
) -> Result<Field, PropagationError> {
    let params = WaveParameters {
        wavenumber,
        wavelength,
        distance,
        pixel_pitch,
    };
    BeamPropagator::default().propagate(field, &params, method)
}
