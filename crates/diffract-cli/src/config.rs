//! TOML configuration deserialisation for propagation jobs.

use diffract_core::sources::SourceField;
use diffract_core::{PropagationMethod, WaveParameters};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub optics: OpticsConfig,
    pub grid: GridConfig,
    pub source: SourceField,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
}

/// Physical parameters from TOML. Lengths in metres.
#[derive(Debug, Deserialize)]
pub struct OpticsConfig {
    pub wavelength: f64,
    pub distance: f64,
    pub pixel_pitch: f64,
    /// Propagation method name, e.g. "TR Fresnel". Default: "IR Fresnel".
    #[serde(default = "default_method")]
    pub method: PropagationMethod,
}

fn default_method() -> PropagationMethod {
    PropagationMethod::ImpulseResponseFresnel
}

impl OpticsConfig {
    pub fn wave_parameters(&self) -> WaveParameters {
        WaveParameters::new(self.wavelength, self.distance, self.pixel_pitch)
    }
}

/// Sampling grid dimensions.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the output intensity as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_intensity: bool,
    /// Whether to also save a JSON run summary (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_intensity: true,
            save_json: false,
        }
    }
}

/// Compute backend selection.
#[derive(Debug, Deserialize)]
pub struct ComputeConfig {
    /// Compute backend: "auto" or "cpu". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> String {
    "auto".into()
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Parse a TOML job description.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
