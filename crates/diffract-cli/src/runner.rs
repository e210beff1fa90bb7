//! Propagation runner: ties together source synthesis, backend and propagator.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use diffract_compute::{ComputeBackend, ComputeError};
use diffract_core::amplitude::{calculate_intensity, total_power};
use diffract_core::{BeamPropagator, Field, PropagationMethod, WaveParameters};

use crate::config::JobConfig;

/// Results from a propagation run.
pub struct PropagationOutput {
    pub method: PropagationMethod,
    pub params: WaveParameters,
    pub input: Field,
    pub output: Field,
    pub device: String,
}

/// Scalar summary of a run, written as JSON.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub method: PropagationMethod,
    pub parameters: WaveParameters,
    pub rows: usize,
    pub cols: usize,
    pub source: String,
    pub input_power: f64,
    pub output_power: f64,
    pub peak_intensity: f64,
    pub device: String,
}

impl PropagationOutput {
    pub fn summary(&self, job: &JobConfig) -> RunSummary {
        let (rows, cols) = self.output.dim();
        let peak_intensity = calculate_intensity(&self.output)
            .iter()
            .copied()
            .fold(0.0_f64, f64::max);
        RunSummary {
            method: self.method,
            parameters: self.params,
            rows,
            cols,
            source: job.source.kind().to_string(),
            input_power: total_power(&self.input),
            output_power: total_power(&self.output),
            peak_intensity,
            device: self.device.clone(),
        }
    }
}

/// Check a job without propagating: parameters, grid and source.
pub fn validate_job(job: &JobConfig) -> Result<WaveParameters> {
    let params = job.optics.wave_parameters();
    params
        .validate()
        .context("Invalid [optics] section")?;
    if job.grid.rows == 0 || job.grid.cols == 0 {
        anyhow::bail!(
            "Grid must be non-empty, got {}x{}",
            job.grid.rows,
            job.grid.cols
        );
    }
    job.source
        .render(1, 1, params.pixel_pitch)
        .with_context(|| format!("Invalid [source] of type '{}'", job.source.kind()))?;
    Ok(params)
}

/// Run a full propagation from a parsed job configuration.
pub fn run_propagation(
    job: &JobConfig,
    method_override: Option<PropagationMethod>,
) -> Result<PropagationOutput> {
    let params = validate_job(job)?;
    let method = method_override.unwrap_or(job.optics.method);

    let input = job
        .source
        .render(job.grid.rows, job.grid.cols, params.pixel_pitch)
        .with_context(|| format!("Failed to render source '{}'", job.source.kind()))?;
    println!(
        "  Source '{}': {}x{} samples, pitch={:.3e} m",
        job.source.kind(),
        job.grid.rows,
        job.grid.cols,
        params.pixel_pitch
    );

    let backend = create_backend(&job.compute.backend)?;
    let device = backend.device_info().name;
    let propagator = BeamPropagator::new(backend);

    println!(
        "  {} over z={:.4e} m at λ={:.1} nm",
        method,
        params.distance,
        params.wavelength * 1e9
    );
    let output = propagator
        .propagate(&input, &params, method)
        .map_err(|e| anyhow::anyhow!("Propagation error ({}): {}", method, e))?;

    Ok(PropagationOutput {
        method,
        params,
        input,
        output,
        device,
    })
}

/// Write the output intensity map to a CSV file with a metadata header.
pub fn write_intensity_csv(result: &PropagationOutput, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);

    writeln!(file, "# diffract: output-plane intensity")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# method: {}", result.method)?;
    writeln!(
        file,
        "# wavelength_m: {:e}, distance_m: {:e}, pixel_pitch_m: {:e}",
        result.params.wavelength, result.params.distance, result.params.pixel_pitch
    )?;
    writeln!(file, "# source: {}", job.source.kind())?;
    writeln!(file, "#")?;
    writeln!(file, "row,col,intensity")?;

    let intensity = calculate_intensity(&result.output);
    for ((i, j), v) in intensity.indexed_iter() {
        writeln!(file, "{},{},{:.6e}", i, j, v)?;
    }
    file.flush()?;

    println!("Intensity written to: {}", path.display());
    Ok(())
}

/// Write the run summary to a JSON file.
pub fn write_summary_json(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}

/// Create a compute backend based on the user's preference string.
///
/// - `"cpu"`: always use CPU.
/// - `"auto"` (default): best available backend, currently the CPU.
fn create_backend(preference: &str) -> Result<Arc<dyn ComputeBackend>> {
    match preference {
        "cpu" | "auto" => {
            let backend = diffract_compute::CpuBackend::new();
            println!("Backend: {}", backend.device_info().name);
            Ok(Arc::new(backend))
        }
        other => Err(ComputeError::Unavailable(format!(
            "unknown compute backend '{}'. Valid backends: auto, cpu",
            other
        ))
        .into()),
    }
}
