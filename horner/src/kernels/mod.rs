//! Horner kernels and their binding.
//!
//! A kernel family supplies two entry points: a scalar one that evaluates the
//! polynomial at a single point and a vector one that evaluates it at a block
//! of [`BLOCK`] points. Every kernel walks the coefficients from the highest
//! degree down, multiplying and adding as two separately rounded operations,
//! so any two kernels produce bit-identical values for the same inputs.

mod portable;
mod provider;
#[cfg(target_arch = "x86_64")]
mod x86;

pub use provider::{Family, KernelKind, KernelProvider, KernelSet};

/// Amount of `f32` lanes a vector kernel evaluates per call.
pub const BLOCK: usize = 8;

/// Evaluates the polynomial given by `coeffs` at a single point.
pub type ScalarKernel = fn(f32, &[f32]) -> f32;

/// Evaluates the polynomial given by `coeffs` at a block of points, lane-wise.
pub type VectorKernel = fn(&[f32; BLOCK], &[f32]) -> [f32; BLOCK];
