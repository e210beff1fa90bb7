//! # Diffract Core
//!
//! Scalar free-space propagation of 2D complex optical fields between
//! parallel planes, following the discretisations of *Computational
//! Fourier Optics* (Voelz).
//!
//! ## Architecture
//!
//! [`propagation::BeamPropagator`] is the single entry point. It builds a
//! coordinate grid sized to the input field, constructs the kernel for the
//! chosen [`types::PropagationMethod`], and applies it in the
//! spatial-frequency domain through a
//! [`ComputeBackend`](diffract_compute::ComputeBackend).
//!
//! ## Modules
//!
//! - [`types`] — Field, wave parameters, propagation methods.
//! - [`grid`] — Spatial and frequency coordinate grids.
//! - [`spectral`] — Quadrant shifts (`fftshift` / `ifftshift`).
//! - [`amplitude`] — Amplitude, phase, intensity and magnitude composition.
//! - [`propagation`] — The propagator and its kernels.
//! - [`sources`] — Analytic input fields (apertures, Gaussian, plane wave).

pub mod amplitude;
pub mod grid;
pub mod propagation;
pub mod sources;
pub mod spectral;
pub mod types;

pub use propagation::{propagate, BeamPropagator, PropagationError};
pub use types::{wavenumber, Field, PropagationMethod, WaveParameters};
