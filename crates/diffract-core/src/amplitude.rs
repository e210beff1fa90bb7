//! Amplitude, phase and intensity of complex fields.

use diffract_compute::backend::check_same_shape;
use ndarray::{Array2, Zip};
use num_complex::Complex64;

use crate::propagation::PropagationError;
use crate::types::Field;

/// Elementwise magnitude $|u|$.
pub fn calculate_amplitude(field: &Field) -> Array2<f64> {
    field.mapv(|u| u.norm())
}

/// Elementwise phase $\arg u$ in $(-\pi, \pi]$. Zero entries have phase 0.
pub fn calculate_phase(field: &Field) -> Array2<f64> {
    field.mapv(|u| u.arg())
}

/// Elementwise intensity $|u|^2$.
pub fn calculate_intensity(field: &Field) -> Array2<f64> {
    field.mapv(|u| u.norm_sqr())
}

/// Total power $\sum |u|^2$ over the grid.
pub fn total_power(field: &Field) -> f64 {
    field.iter().map(|u| u.norm_sqr()).sum()
}

/// Compose a field with magnitude `amplitude` and the phase of `reference`.
///
/// Entries where `reference` is exactly zero take phase 0. Serial
/// counterpart of [`ComputeBackend::compose_magnitude`](diffract_compute::ComputeBackend::compose_magnitude).
pub fn set_amplitude(reference: &Field, amplitude: &Array2<f64>) -> Result<Field, PropagationError> {
    check_same_shape(reference, amplitude)?;
    Ok(Zip::from(reference)
        .and(amplitude)
        .map_collect(|r, &a| Complex64::from_polar(a, r.arg())))
}
