use std::arch::x86_64::*;

use super::BLOCK;

/// Scalar Horner evaluation on the SSE scalar unit.
///
/// SSE is part of the x86_64 baseline, so this entry point is always bound
/// and its intrinsics are safe to call.
pub fn scalar(x: f32, coeffs: &[f32]) -> f32 {
    let Some((&last, rest)) = coeffs.split_last() else {
        return 0.0;
    };

    // SAFETY: SSE is part of the x86_64 baseline.
    unsafe {
        let x = _mm_set_ss(x);
        let mut acc = _mm_set_ss(last);

        for &c in rest.iter().rev() {
            acc = _mm_add_ss(_mm_mul_ss(acc, x), _mm_set_ss(c));
        }

        _mm_cvtss_f32(acc)
    }
}

/// Lane-wise Horner evaluation on a 256-bit AVX register.
///
/// Only handed out by `KernelProvider::resolve` once AVX has been detected at
/// runtime, calling it on a CPU without AVX is undefined behavior.
pub fn vector(xs: &[f32; BLOCK], coeffs: &[f32]) -> [f32; BLOCK] {
    // SAFETY: see the function's documentation.
    unsafe { vector_avx(xs, coeffs) }
}

#[target_feature(enable = "avx")]
unsafe fn vector_avx(xs: &[f32; BLOCK], coeffs: &[f32]) -> [f32; BLOCK] {
    let mut out = [0.0; BLOCK];
    let Some((&last, rest)) = coeffs.split_last() else {
        return out;
    };

    // SAFETY: `xs` holds exactly 8 contiguous `f32`.
    let points = unsafe { _mm256_loadu_ps(xs.as_ptr()) };
    let mut acc = _mm256_set1_ps(last);

    for &c in rest.iter().rev() {
        acc = _mm256_add_ps(_mm256_mul_ps(acc, points), _mm256_set1_ps(c));
    }

    // SAFETY: `out` holds exactly 8 contiguous `f32`.
    unsafe { _mm256_storeu_ps(out.as_mut_ptr(), acc) };

    out
}
