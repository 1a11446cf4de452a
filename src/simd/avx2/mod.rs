//! AVX2 backend: 256-bit vectors of 8 × f32 with FMA3.
//!
//! Only compiled when the build script detects AVX2 and FMA on the build host.

pub mod f32x8;
