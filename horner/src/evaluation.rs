use crate::{
    kernels::{BLOCK, ScalarKernel, VectorKernel},
    progress::{Progress, ProgressSink},
};

/// The kernels bound for one computation.
#[derive(Clone, Copy)]
pub(crate) enum Strategy {
    Scalar(ScalarKernel),
    Vector {
        vector: VectorKernel,
        tail: ScalarKernel,
    },
}

impl Strategy {
    /// Evaluates every point of `points` into the slot of `out` at the same index.
    ///
    /// # Arguments
    /// * `coeffs` - The polynomial's coefficients.
    /// * `points` - The points of this range.
    /// * `out` - The result slots of this range, as long as `points`.
    /// * `progress` - The computation's shared progress.
    pub(crate) fn run<S>(&self, coeffs: &[f32], points: &[f32], out: &mut [f32], progress: &Progress<'_, S>)
    where
        S: ProgressSink + ?Sized,
    {
        debug_assert_eq!(points.len(), out.len());

        match *self {
            Strategy::Scalar(kernel) => scalar_range(kernel, coeffs, points, out, progress),
            Strategy::Vector { vector, tail } => {
                vector_range(vector, tail, coeffs, points, out, progress)
            }
        }
    }
}

fn scalar_range<S>(
    kernel: ScalarKernel,
    coeffs: &[f32],
    points: &[f32],
    out: &mut [f32],
    progress: &Progress<'_, S>,
) where
    S: ProgressSink + ?Sized,
{
    for (y, &x) in out.iter_mut().zip(points) {
        *y = kernel(x, coeffs);
        progress.advance(1);
    }
}

/// Evaluates full blocks with `vector` and the remaining points with `tail`.
fn vector_range<S>(
    vector: VectorKernel,
    tail: ScalarKernel,
    coeffs: &[f32],
    points: &[f32],
    out: &mut [f32],
    progress: &Progress<'_, S>,
) where
    S: ProgressSink + ?Sized,
{
    let mut blocks = points.chunks_exact(BLOCK);
    let mut out_blocks = out.chunks_exact_mut(BLOCK);
    let mut xs = [0.0; BLOCK];

    for (block, out_block) in (&mut blocks).zip(&mut out_blocks) {
        xs.copy_from_slice(block);
        out_block.copy_from_slice(&vector(&xs, coeffs));
        progress.advance(BLOCK);
    }

    scalar_range(
        tail,
        coeffs,
        blocks.remainder(),
        out_blocks.into_remainder(),
        progress,
    );
}
