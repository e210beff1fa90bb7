//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait is the narrow set of array operations the
//! propagation code in `diffract-core` needs: filling a complex array from
//! an index function, elementwise products, 2D FFTs and magnitude
//! composition. The physics never touches device-specific code directly.

use ndarray::Array2;
use num_complex::Complex64;
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: [usize; 2], right: [usize; 2] },
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub memory_bytes: Option<usize>,
    pub compute_units: Option<usize>,
}

/// Abstraction over compute backends.
///
/// Every array a backend returns lives on that backend's device, so kernels
/// and transformed fields produced through the same backend can be combined
/// without any transfer.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Build a `rows x cols` complex array by evaluating `fill_fn(i, j)` at
    /// every index. Used for kernels and masks defined on a coordinate grid.
    fn parallel_fill(
        &self,
        rows: usize,
        cols: usize,
        fill_fn: &(dyn Fn(usize, usize) -> Complex64 + Send + Sync),
    ) -> Result<Array2<Complex64>, ComputeError>;

    /// Elementwise complex product `a * b`.
    fn multiply(
        &self,
        a: &Array2<Complex64>,
        b: &Array2<Complex64>,
    ) -> Result<Array2<Complex64>, ComputeError>;

    /// Unnormalised forward 2D discrete Fourier transform.
    fn fft2(&self, data: &Array2<Complex64>) -> Result<Array2<Complex64>, ComputeError>;

    /// Inverse 2D discrete Fourier transform, normalised by `1 / (rows * cols)`
    /// so that `ifft2(fft2(a)) == a`.
    fn ifft2(&self, data: &Array2<Complex64>) -> Result<Array2<Complex64>, ComputeError>;

    /// Replace the magnitude of every element of `reference` with the
    /// matching entry of `magnitude`, keeping the phase of `reference`.
    fn compose_magnitude(
        &self,
        reference: &Array2<Complex64>,
        magnitude: &Array2<f64>,
    ) -> Result<Array2<Complex64>, ComputeError>;
}

/// Check that two arrays have identical shape.
pub fn check_same_shape<A, B>(a: &Array2<A>, b: &Array2<B>) -> Result<(), ComputeError> {
    if a.dim() != b.dim() {
        let (ar, ac) = a.dim();
        let (br, bc) = b.dim();
        return Err(ComputeError::ShapeMismatch {
            left: [ar, ac],
            right: [br, bc],
        });
    }
    Ok(())
}
