use super::BLOCK;

/// Scalar Horner evaluation in plain Rust.
///
/// # Arguments
/// * `x` - The point to evaluate.
/// * `coeffs` - The coefficients, index `i` being the coefficient of degree `i`.
///
/// # Returns
/// The polynomial's value at `x`, or `0` for an empty coefficient sequence.
pub fn scalar(x: f32, coeffs: &[f32]) -> f32 {
    let Some((&last, rest)) = coeffs.split_last() else {
        return 0.0;
    };

    rest.iter().rev().fold(last, |acc, &c| acc * x + c)
}

/// Lane-wise Horner evaluation over a block, left to the compiler to vectorize.
pub fn vector(xs: &[f32; BLOCK], coeffs: &[f32]) -> [f32; BLOCK] {
    let Some((&last, rest)) = coeffs.split_last() else {
        return [0.0; BLOCK];
    };

    let mut acc = [last; BLOCK];
    for &c in rest.iter().rev() {
        acc.iter_mut().zip(xs).for_each(|(a, &x)| *a = *a * x + c);
    }

    acc
}
