//! Coordinate grids built per propagation call.
//!
//! Both grids span $[-M\Delta x, M\Delta x]$ along the row axis and
//! $[-N\Delta x, N\Delta x]$ along the column axis, sampled with $M$ and
//! $N$ points respectively (end points included). The Fresnel kernels read
//! the grid as spatial coordinates; the bandlimit mask reads the very same
//! numbers as spatial-frequency coordinates. The two roles are kept as
//! separate types so the reinterpretation is explicit at the call site.

use ndarray::{Array1, Array2};

/// `n` evenly spaced samples over `[start, end]`, end points included.
///
/// A single sample sits at `start`.
pub fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    if n <= 1 {
        return Array1::from_elem(n, start);
    }
    let step = (end - start) / (n - 1) as f64;
    Array1::from_shape_fn(n, |i| start + step * i as f64)
}

/// Spatial-domain coordinate grid $(X, Y)$ with $X$ varying along rows.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl SpatialGrid {
    pub fn new(rows: usize, cols: usize, pixel_pitch: f64) -> Self {
        let half_x = rows as f64 * pixel_pitch;
        let half_y = cols as f64 * pixel_pitch;
        Self {
            x: linspace(-half_x, half_x, rows),
            y: linspace(-half_y, half_y, cols),
        }
    }

    /// Grid shape `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    pub fn x(&self, i: usize) -> f64 {
        self.x[i]
    }

    pub fn y(&self, j: usize) -> f64 {
        self.y[j]
    }

    /// Squared radial coordinate $R^2 = X^2 + Y^2$ at grid index `(i, j)`.
    pub fn radial_squared(&self, i: usize, j: usize) -> f64 {
        self.x[i] * self.x[i] + self.y[j] * self.y[j]
    }

    /// $R^2$ over the whole grid.
    pub fn radial_squared_map(&self) -> Array2<f64> {
        Array2::from_shape_fn(self.dim(), |(i, j)| self.radial_squared(i, j))
    }
}

/// The same coordinates as a [`SpatialGrid`], read as spatial frequencies.
#[derive(Debug, Clone)]
pub struct FrequencyGrid {
    fx: Array1<f64>,
    fy: Array1<f64>,
}

impl FrequencyGrid {
    // Numerically identical to the spatial grid; the reference bandlimit
    // derivation compares these values directly against frequency cutoffs.
    pub fn from_spatial(grid: &SpatialGrid) -> Self {
        Self {
            fx: grid.x.clone(),
            fy: grid.y.clone(),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.fx.len(), self.fy.len())
    }

    pub fn fx(&self, i: usize) -> f64 {
        self.fx[i]
    }

    pub fn fy(&self, j: usize) -> f64 {
        self.fy[j]
    }

    /// Binary pass-band: 1 where $|f_x| < f_{x,\text{lim}}$ and
    /// $|f_y| < f_{y,\text{lim}}$, 0 elsewhere.
    pub fn passband_mask(&self, flim_x: f64, flim_y: f64) -> Array2<f64> {
        Array2::from_shape_fn(self.dim(), |(i, j)| {
            if self.fx[i].abs() < flim_x && self.fy[j].abs() < flim_y {
                1.0
            } else {
                0.0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linspace_includes_end_points() {
        let axis = linspace(-4.0, 4.0, 5);
        assert_eq!(axis.to_vec(), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);

        let single = linspace(-3.0, 3.0, 1);
        assert_eq!(single.to_vec(), vec![-3.0]);

        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_spatial_grid_spans_symmetric_extent() {
        let dx = 1e-5;
        let grid = SpatialGrid::new(8, 6, dx);
        assert_eq!(grid.dim(), (8, 6));
        assert_abs_diff_eq!(grid.x(0), -8.0 * dx, epsilon = 1e-18);
        assert_abs_diff_eq!(grid.x(7), 8.0 * dx, epsilon = 1e-18);
        assert_abs_diff_eq!(grid.y(0), -6.0 * dx, epsilon = 1e-18);
        assert_abs_diff_eq!(grid.y(5), 6.0 * dx, epsilon = 1e-18);
    }

    #[test]
    fn test_radial_squared_is_symmetric() {
        let grid = SpatialGrid::new(5, 7, 0.5);
        let r2 = grid.radial_squared_map();
        let (rows, cols) = grid.dim();
        for i in 0..rows {
            for j in 0..cols {
                assert_abs_diff_eq!(r2[[i, j]], r2[[rows - 1 - i, cols - 1 - j]], epsilon = 1e-12);
            }
        }
        // Odd axes put a sample exactly on the origin.
        assert_abs_diff_eq!(grid.x(2), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(grid.y(3), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_passband_mask_is_strict() {
        let grid = SpatialGrid::new(5, 5, 1.0);
        let freq = FrequencyGrid::from_spatial(&grid);
        // Axis values: -5, -2.5, 0, 2.5, 5
        let mask = freq.passband_mask(2.5, 6.0);
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == 2 { 1.0 } else { 0.0 };
                assert_eq!(mask[[i, j]], expected, "mask[{}, {}]", i, j);
            }
        }
    }
}
