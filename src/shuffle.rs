//! Stride-parameterised perfect-shuffle network wiring one PE row's
//! outputs to the next row's inputs.
use crate::complex::Complex;

/// Nominal latency the wrapper's cost model charges for one shuffle hop.
pub const SHUFFLE_OPERATION_CYCLES: u32 = 2;

/// Permute the `2*(n/2)` lanes emerging from a PE row of an `n`-wide
/// pipeline at stage `stage` into the `(a, b)` pair the next row expects.
///
/// `y0`/`y1` and the returned `a`/`b` each have `n/2` entries. In GEMM
/// mode the caller should skip this and pass `y0, y1` through unchanged
/// (the shuffle is an FFT-mode-only wiring concern).
pub fn shuffle_stage(n: usize, stage: u32, y0: &[Complex], y1: &[Complex]) -> (Vec<Complex>, Vec<Complex>) {
    let half = n / 4;
    let stride = n >> (stage + 2);
    debug_assert_eq!(y0.len(), n / 2);
    debug_assert_eq!(y1.len(), n / 2);

    let mut a = vec![Complex::ZERO; n / 2];
    let mut b = vec![Complex::ZERO; n / 2];

    for p in 0..half {
        let i = (p / stride) * (2 * stride) + (p % stride);
        a[i] = y0[i];
        b[i] = y0[i + stride];
        a[i + stride] = y1[i];
        b[i + stride] = y1[i + stride];
    }

    (a, b)
}

/// Identity shuffle used in GEMM mode and for bypassed hardware stages
/// whose width doesn't divide evenly into the general formula above.
pub fn shuffle_identity(y0: &[Complex], y1: &[Complex]) -> (Vec<Complex>, Vec<Complex>) {
    (y0.to_vec(), y1.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_zero_splits_halves_contiguously() {
        let y0 = vec![Complex::real(0.0), Complex::real(1.0), Complex::real(2.0), Complex::real(3.0)];
        let y1 = vec![Complex::real(10.0), Complex::real(11.0), Complex::real(12.0), Complex::real(13.0)];
        let (a, b) = shuffle_stage(8, 0, &y0, &y1);
        assert_eq!(a, vec![Complex::real(0.0), Complex::real(1.0), Complex::real(10.0), Complex::real(11.0)]);
        assert_eq!(b, vec![Complex::real(2.0), Complex::real(3.0), Complex::real(12.0), Complex::real(13.0)]);
    }

    #[test]
    fn permutation_is_a_bijection_over_all_lanes() {
        let n = 16;
        let y0: Vec<Complex> = (0..n / 2).map(|i| Complex::real(i as f32)).collect();
        let y1: Vec<Complex> = (0..n / 2).map(|i| Complex::real((i + 100) as f32)).collect();
        for stage in 0..((n as f32).log2() as u32 - 1) {
            let (a, b) = shuffle_stage(n, stage, &y0, &y1);
            let mut seen: Vec<f32> = a.iter().chain(b.iter()).map(|c| c.re).collect();
            seen.sort_by(|x, y| x.partial_cmp(y).unwrap());
            let mut expected: Vec<f32> = y0.iter().chain(y1.iter()).map(|c| c.re).collect();
            expected.sort_by(|x, y| x.partial_cmp(y).unwrap());
            assert_eq!(seen, expected, "stage {stage} did not permute every lane exactly once");
        }
    }
}
