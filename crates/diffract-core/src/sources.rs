//! Analytic input fields for propagation jobs.
//!
//! Each source is rendered on a pixel-centred grid: pixel `(i, j)` sits at
//! $x = (i - (M-1)/2)\,\Delta x$, $y = (j - (N-1)/2)\,\Delta x$.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::propagation::PropagationError;
use crate::types::Field;

/// A source field description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceField {
    /// Uniform amplitude, zero phase.
    PlaneWave {
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    /// Unit-amplitude rectangle of half extents `half_width` (x) and
    /// `half_height` (y), in metres.
    RectangularAperture { half_width: f64, half_height: f64 },
    /// Unit-amplitude disc of the given radius (m).
    CircularAperture { radius: f64 },
    /// Gaussian beam waist: amplitude $\exp(-r^2 / w_0^2)$.
    Gaussian { waist: f64 },
}

fn default_amplitude() -> f64 {
    1.0
}

impl SourceField {
    /// Short identifier for logs and output headers.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceField::PlaneWave { .. } => "plane_wave",
            SourceField::RectangularAperture { .. } => "rectangular_aperture",
            SourceField::CircularAperture { .. } => "circular_aperture",
            SourceField::Gaussian { .. } => "gaussian",
        }
    }

    fn check(&self) -> Result<(), PropagationError> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PropagationError::invalid(name, format!("must be positive, got {}", value)))
            }
        };
        match *self {
            SourceField::PlaneWave { amplitude } => {
                if amplitude.is_finite() {
                    Ok(())
                } else {
                    Err(PropagationError::invalid("amplitude", "must be finite".to_string()))
                }
            }
            SourceField::RectangularAperture { half_width, half_height } => {
                positive("half_width", half_width)?;
                positive("half_height", half_height)
            }
            SourceField::CircularAperture { radius } => positive("radius", radius),
            SourceField::Gaussian { waist } => positive("waist", waist),
        }
    }

    /// Sample the source on a `rows x cols` grid of pitch `pixel_pitch`.
    pub fn render(
        &self,
        rows: usize,
        cols: usize,
        pixel_pitch: f64,
    ) -> Result<Field, PropagationError> {
        if rows == 0 || cols == 0 {
            return Err(PropagationError::ShapeError {
                shape: vec![rows, cols],
                reason: "source grid must be non-empty".into(),
            });
        }
        if !(pixel_pitch.is_finite() && pixel_pitch > 0.0) {
            return Err(PropagationError::invalid(
                "pixel_pitch",
                format!("must be positive, got {}", pixel_pitch),
            ));
        }
        self.check()?;

        let cx = (rows as f64 - 1.0) / 2.0;
        let cy = (cols as f64 - 1.0) / 2.0;
        let field = Field::from_shape_fn((rows, cols), |(i, j)| {
            let x = (i as f64 - cx) * pixel_pitch;
            let y = (j as f64 - cy) * pixel_pitch;
            let amplitude = match *self {
                SourceField::PlaneWave { amplitude } => amplitude,
                SourceField::RectangularAperture { half_width, half_height } => {
                    if x.abs() <= half_width && y.abs() <= half_height {
                        1.0
                    } else {
                        0.0
                    }
                }
                SourceField::CircularAperture { radius } => {
                    if x * x + y * y <= radius * radius {
                        1.0
                    } else {
                        0.0
                    }
                }
                SourceField::Gaussian { waist } => (-(x * x + y * y) / (waist * waist)).exp(),
            };
            Complex64::new(amplitude, 0.0)
        });
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_wave_is_uniform() {
        let field = SourceField::PlaneWave { amplitude: 0.5 }.render(4, 6, 1e-5).unwrap();
        assert_eq!(field.dim(), (4, 6));
        assert!(field.iter().all(|u| *u == Complex64::new(0.5, 0.0)));
    }

    #[test]
    fn test_circular_aperture_is_centred() {
        let dx = 1e-5;
        let field = SourceField::CircularAperture { radius: 2.5 * dx }
            .render(9, 9, dx)
            .unwrap();
        assert_eq!(field[[4, 4]].re, 1.0);
        assert_eq!(field[[0, 0]].re, 0.0);
        // Mirror symmetry about the centre pixel.
        for i in 0..9 {
            for j in 0..9 {
                assert_eq!(field[[i, j]], field[[8 - i, 8 - j]]);
                assert_eq!(field[[i, j]], field[[j, i]]);
            }
        }
        // Radius 2.5 pixels on a 9x9 grid: 21 lit pixels.
        let lit = field.iter().filter(|u| u.re > 0.5).count();
        assert_eq!(lit, 21);
    }

    #[test]
    fn test_rectangular_aperture_extent() {
        let dx = 1.0;
        let field = SourceField::RectangularAperture { half_width: 1.0, half_height: 2.0 }
            .render(6, 8, dx)
            .unwrap();
        // x in {-2.5..2.5}: |x| <= 1 -> rows 2, 3; y in {-3.5..3.5}: |y| <= 2 -> cols 2..=5
        let lit = field.iter().filter(|u| u.re > 0.5).count();
        assert_eq!(lit, 2 * 4);
    }

    #[test]
    fn test_gaussian_peaks_at_centre() {
        let field = SourceField::Gaussian { waist: 3.0 }.render(7, 7, 1.0).unwrap();
        assert!((field[[3, 3]].re - 1.0).abs() < 1e-15);
        assert!((field[[3, 6]].re - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_render_rejects_bad_inputs() {
        assert!(matches!(
            SourceField::CircularAperture { radius: -1.0 }.render(4, 4, 1.0),
            Err(PropagationError::InvalidParameter { name: "radius", .. })
        ));
        assert!(matches!(
            SourceField::Gaussian { waist: 1.0 }.render(0, 4, 1.0),
            Err(PropagationError::ShapeError { .. })
        ));
        assert!(matches!(
            SourceField::PlaneWave { amplitude: 1.0 }.render(4, 4, 0.0),
            Err(PropagationError::InvalidParameter { name: "pixel_pitch", .. })
        ));
    }

    #[test]
    fn test_source_deserialises_from_tagged_table() {
        let json = r#"{"type": "circular_aperture", "radius": 0.001}"#;
        let source: SourceField = serde_json::from_str(json).unwrap();
        assert_eq!(source, SourceField::CircularAperture { radius: 0.001 });

        let plane: SourceField = serde_json::from_str(r#"{"type": "plane_wave"}"#).unwrap();
        assert_eq!(plane, SourceField::PlaneWave { amplitude: 1.0 });
    }
}
