//! CPU compute backend using Rayon for shared-memory parallelism and
//! `rustfft` for the 1D transforms that make up each 2D FFT.

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{FftDirection, FftPlanner};

use crate::backend::{check_same_shape, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises work across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Create a CPU backend with a specified thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self { num_threads }
    }

    /// Separable 2D transform: rows first, then columns on the transpose.
    fn transform(
        &self,
        data: &Array2<Complex64>,
        direction: FftDirection,
    ) -> Result<Array2<Complex64>, ComputeError> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Ok(data.clone());
        }

        let mut planner = FftPlanner::<f64>::new();
        let row_fft = planner.plan_fft(cols, direction);
        let col_fft = planner.plan_fft(rows, direction);

        let mut buffer: Vec<Complex64> = data.iter().copied().collect();
        buffer
            .par_chunks_mut(cols)
            .for_each(|row| row_fft.process(row));

        let mut columns = transpose(&buffer, rows, cols);
        columns
            .par_chunks_mut(rows)
            .for_each(|col| col_fft.process(col));
        let buffer = transpose(&columns, cols, rows);

        Array2::from_shape_vec((rows, cols), buffer)
            .map_err(|e| ComputeError::DeviceError(e.to_string()))
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Transpose a row-major `rows x cols` buffer into a row-major `cols x rows` one.
fn transpose(src: &[Complex64], rows: usize, cols: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); rows * cols];
    out.par_chunks_mut(rows).enumerate().for_each(|(j, col)| {
        for (i, value) in col.iter_mut().enumerate() {
            *value = src[i * cols + j];
        }
    });
    out
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            memory_bytes: None,
            compute_units: Some(self.num_threads),
        }
    }

    fn parallel_fill(
        &self,
        rows: usize,
        cols: usize,
        fill_fn: &(dyn Fn(usize, usize) -> Complex64 + Send + Sync),
    ) -> Result<Array2<Complex64>, ComputeError> {
        let data: Vec<Complex64> = (0..rows * cols)
            .into_par_iter()
            .map(|idx| {
                let i = idx / cols;
                let j = idx % cols;
                fill_fn(i, j)
            })
            .collect();

        Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| ComputeError::DeviceError(e.to_string()))
    }

    fn multiply(
        &self,
        a: &Array2<Complex64>,
        b: &Array2<Complex64>,
    ) -> Result<Array2<Complex64>, ComputeError> {
        check_same_shape(a, b)?;
        Ok(Zip::from(a).and(b).par_map_collect(|&x, &y| x * y))
    }

    fn fft2(&self, data: &Array2<Complex64>) -> Result<Array2<Complex64>, ComputeError> {
        self.transform(data, FftDirection::Forward)
    }

    fn ifft2(&self, data: &Array2<Complex64>) -> Result<Array2<Complex64>, ComputeError> {
        let (rows, cols) = data.dim();
        let mut out = self.transform(data, FftDirection::Inverse)?;
        if rows * cols > 0 {
            let scale = 1.0 / (rows * cols) as f64;
            out.par_mapv_inplace(|v| v * scale);
        }
        Ok(out)
    }

    fn compose_magnitude(
        &self,
        reference: &Array2<Complex64>,
        magnitude: &Array2<f64>,
    ) -> Result<Array2<Complex64>, ComputeError> {
        check_same_shape(reference, magnitude)?;
        Ok(Zip::from(reference)
            .and(magnitude)
            .par_map_collect(|r, &m| Complex64::from_polar(m, r.arg())))
    }
}
