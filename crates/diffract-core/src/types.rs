//! Core types shared across the diffract framework.
//!
//! This module defines the data model of a propagation call: the complex
//! field, the scalar wave parameters, and the closed set of propagation
//! methods.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::propagation::PropagationError;

/// A 2D complex optical field of shape (M, N), sampled on a regular grid.
///
/// Magnitude is the square root of irradiance; argument is the optical phase.
pub type Field = Array2<Complex64>;

/// Wavenumber of a wave: $k = 2\pi / \lambda$.
///
/// # Arguments
/// * `wavelength` - Wavelength in metres.
pub fn wavenumber(wavelength: f64) -> f64 {
    2.0 * std::f64::consts::PI / wavelength
}

/// Scalar physical quantities for a single propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParameters {
    /// Wavenumber $k$ (rad/m).
    pub wavenumber: f64,
    /// Wavelength $\lambda$ (m).
    pub wavelength: f64,
    /// Propagation distance $z$ (m). Negative values propagate backwards.
    pub distance: f64,
    /// Pixel pitch $\Delta x$ of the sampling grid (m).
    pub pixel_pitch: f64,
}

impl WaveParameters {
    /// Build parameters with the wavenumber derived from the wavelength.
    pub fn new(wavelength: f64, distance: f64, pixel_pitch: f64) -> Self {
        Self {
            wavenumber: wavenumber(wavelength),
            wavelength,
            distance,
            pixel_pitch,
        }
    }

    /// Reject parameter combinations for which the diffraction kernels are
    /// undefined (division by zero distance, non-positive sampling).
    pub fn validate(&self) -> Result<(), PropagationError> {
        let finite = [
            ("wavelength", self.wavelength),
            ("distance", self.distance),
            ("pixel_pitch", self.pixel_pitch),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(PropagationError::invalid(name, format!("{} is not finite", value)));
            }
        }

        if self.wavelength <= 0.0 {
            return Err(PropagationError::invalid(
                "wavelength",
                format!("must be positive, got {}", self.wavelength),
            ));
        }
        if self.pixel_pitch <= 0.0 {
            return Err(PropagationError::invalid(
                "pixel_pitch",
                format!("must be positive, got {}", self.pixel_pitch),
            ));
        }
        if self.distance == 0.0 {
            return Err(PropagationError::invalid(
                "distance",
                "must be non-zero".to_string(),
            ));
        }
        if !self.wavenumber.is_finite() {
            return Err(PropagationError::invalid(
                "wavenumber",
                format!("{} is not finite", self.wavenumber),
            ));
        }
        Ok(())
    }
}

/// Kernel-construction strategy for a propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PropagationMethod {
    /// Fresnel impulse response, convolved in the frequency domain.
    ImpulseResponseFresnel,
    /// Fresnel transfer function applied directly in the frequency domain.
    TransferFunctionFresnel,
    /// Impulse-response kernel with a rectangular anti-aliasing pass-band.
    BandlimitedAngularSpectrum,
    /// Far-field: a single scaled Fourier transform of the input.
    Fraunhofer,
}

impl PropagationMethod {
    pub const ALL: [PropagationMethod; 4] = [
        PropagationMethod::ImpulseResponseFresnel,
        PropagationMethod::TransferFunctionFresnel,
        PropagationMethod::BandlimitedAngularSpectrum,
        PropagationMethod::Fraunhofer,
    ];

    /// Canonical human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            PropagationMethod::ImpulseResponseFresnel => "IR Fresnel",
            PropagationMethod::TransferFunctionFresnel => "TR Fresnel",
            PropagationMethod::BandlimitedAngularSpectrum => "Bandlimited Angular Spectrum",
            PropagationMethod::Fraunhofer => "Fraunhofer",
        }
    }
}

impl fmt::Display for PropagationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropagationMethod {
    type Err = PropagationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | '_' => ' ',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match key.as_str() {
            "ir fresnel" => Ok(PropagationMethod::ImpulseResponseFresnel),
            "tr fresnel" | "tf fresnel" => Ok(PropagationMethod::TransferFunctionFresnel),
            "bandlimited angular spectrum" => Ok(PropagationMethod::BandlimitedAngularSpectrum),
            "fraunhofer" => Ok(PropagationMethod::Fraunhofer),
            _ => Err(PropagationError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for PropagationMethod {
    type Error = PropagationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PropagationMethod> for String {
    fn from(method: PropagationMethod) -> Self {
        method.name().to_string()
    }
}
