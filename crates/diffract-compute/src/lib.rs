//! # Diffract Compute
//!
//! Compute backend abstraction for the diffract framework. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the propagation physics from device-specific execution details.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | CPU (Rayon + rustfft) | `cpu` (default) | Implemented |

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{ComputeBackend, ComputeError, DeviceInfo};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;
