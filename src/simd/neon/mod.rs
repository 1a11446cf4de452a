//! ARM NEON backend: 128-bit vectors of 4 × f32.
//!
//! Compiled for every AArch64 target, where Advanced SIMD is architecturally
//! guaranteed.

pub mod f32x4;
