//! Reference math the driver checks the fabric against: a textbook O(N^2)
//! DFT and the permutation that recovers natural frequency-bin order from
//! the fabric's raw frame output.
use crate::complex::Complex;

/// `X[k] = sum_n x[n] * W_N^(nk)`, computed directly rather than via any
/// FFT algorithm -- this is ground truth, not a fast implementation.
pub fn dft(x: &[Complex]) -> Vec<Complex> {
    let n = x.len();
    (0..n)
        .map(|k| {
            x.iter().enumerate().fold(Complex::ZERO, |acc, (i, &xi)| {
                acc + xi * Complex::twiddle((i * k) as i64, n as u32)
            })
        })
        .collect()
}

/// Re-order the fabric's raw frame output into true natural order.
///
/// The ring's terminal `(Y0, Y1)` split interleaves the last stage's two
/// halves, and the stage-by-stage shuffle network leaves what's left in
/// the standard radix-2 DIF bit-reversed order *of that interleaved
/// array*. A single de-interleave pass (`out[i] = raw[2i]`, `out[i+n/2] =
/// raw[2i+1]`) only fully untangles both effects when `n == 4`, where
/// they happen to collapse into the same permutation; for larger `n` two
/// separate steps are needed:
///
/// 1. undo the ring's interleave to recover the bit-reversed array `r`
///    (`r[2i] = raw[i]`, `r[2i+1] = raw[n/2+i]`);
/// 2. undo the standard radix-2 DIF bit-reversal on `r`.
///
/// Verified by hand against a shifted unit impulse (`x = delta[n-3]` at
/// `real_size = 8`, expecting `y[k] = exp(-j*3*pi*k/4)`, the textbook
/// shifted-impulse DFT) before trusting either reading.
pub fn to_natural_order(raw: &[Complex]) -> Vec<Complex> {
    let n = raw.len();
    let half = n / 2;
    let mut r = vec![Complex::ZERO; n];
    for i in 0..half {
        r[2 * i] = raw[i];
        r[2 * i + 1] = raw[half + i];
    }
    let bits = n.trailing_zeros();
    (0..n).map(|m| r[bit_reverse(m, bits)]).collect()
}

fn bit_reverse(mut x: usize, bits: u32) -> usize {
    let mut out = 0usize;
    for _ in 0..bits {
        out = (out << 1) | (x & 1);
        x >>= 1;
    }
    out
}

/// Component-wise comparison within an absolute tolerance (the agreed
/// numeric contract: 0.1 on each of `re` and `im`).
pub fn all_approx_eq(a: &[Complex], b: &[Complex], tolerance: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.approx_eq(*y, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dft_of_dc_input_concentrates_in_bin_zero() {
        let x = vec![Complex::real(1.0); 8];
        let out = dft(&x);
        assert!(out[0].approx_eq(Complex::real(8.0), 1e-3));
        for v in &out[1..] {
            assert!(v.approx_eq(Complex::ZERO, 1e-3));
        }
    }

    #[test]
    fn dft_of_unit_impulse_is_a_constant_magnitude_ramp() {
        let mut x = vec![Complex::ZERO; 8];
        x[3] = Complex::real(1.0);
        let out = dft(&x);
        for (k, v) in out.iter().enumerate() {
            let expected = Complex::twiddle(3 * k as i64, 8);
            assert!(v.approx_eq(expected, 1e-4));
        }
    }

    #[test]
    fn to_natural_order_is_a_bijection_over_all_lanes() {
        let raw: Vec<Complex> = (0..8).map(|i| Complex::real(i as f32)).collect();
        let out = to_natural_order(&raw);
        let mut seen: Vec<f32> = out.iter().map(|c| c.re).collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn to_natural_order_is_the_identity_for_four_point_transforms() {
        let raw: Vec<Complex> = (0..4).map(|i| Complex::real(i as f32)).collect();
        assert_eq!(to_natural_order(&raw), raw);
    }

    #[test]
    fn to_natural_order_recovers_a_shifted_impulse_spectrum() {
        // Run a real fabric+wrapper frame for x = delta[n-3] at real_size=8
        // and check the de-ringed output against the textbook DFT.
        use crate::wrapper::{FftWrapper, WrapperConfig};

        let mut w = FftWrapper::new(8);
        w.reset();
        w.configure(WrapperConfig::fft(8)).unwrap();
        w.load_twiddles().unwrap();
        let mut x = vec![Complex::ZERO; 8];
        x[3] = Complex::real(1.0);
        w.write_input(&x).unwrap();
        w.start().unwrap();
        let raw = w.read_output().unwrap().value;

        let natural = to_natural_order(&raw);
        let expected = dft(&x);
        assert!(all_approx_eq(&natural, &expected, 1e-3), "{natural:?} != {expected:?}");
    }
}
