//! Single-level Cooley-Tukey 2D decomposition: run an `N = N1*N2` transform
//! as an `N1`-point column pass, a per-entry twiddle compensation, and an
//! `N2`-point row pass, letting a fabric whose hardware size is smaller
//! than `N` still cover it. Only this one level is implemented -- the
//! original driver's recursive search for a second decomposition level on
//! top of this one is not; if neither `N1` nor `N2` fits the fabric the
//! caller should report it as unsupported rather than reaching for a
//! deeper split.
use crate::complex::Complex;
use crate::error::SimError;
use crate::reference::to_natural_order;
use crate::wrapper::{FftWrapper, WrapperConfig};

/// Factor `real_size` into `(n1, n2)` with `n1 <= n_hw` and `n2 <= n_hw`,
/// preferring the most balanced split (`n1` as large as possible without
/// exceeding the fabric) among the power-of-two factorizations.
pub fn find_decomposition(real_size: usize, n_hw: usize) -> Result<(usize, usize), SimError> {
    if !real_size.is_power_of_two() {
        return Err(SimError::Configuration(format!(
            "decomposition requires a power-of-two size, got {real_size}"
        )));
    }
    let bits = real_size.trailing_zeros();
    let max_bits = n_hw.trailing_zeros();
    for n1_bits in (0..=bits).rev() {
        let n2_bits = bits - n1_bits;
        if n1_bits <= max_bits && n2_bits <= max_bits {
            return Ok((1usize << n1_bits, 1usize << n2_bits));
        }
    }
    Err(SimError::Configuration(format!(
        "no single-level decomposition of size {real_size} fits a hardware size of {n_hw}"
    )))
}

/// Run a reconfigure+reload+write+start+read round trip against `wrapper`,
/// normalizing the raw output back into natural order before returning it.
fn run_frame(wrapper: &mut FftWrapper, real_size: usize, input: &[Complex]) -> Result<Vec<Complex>, SimError> {
    if wrapper.real_size() != Some(real_size) || wrapper.needs_twiddle_reload() {
        wrapper.configure(WrapperConfig::fft(real_size))?;
        wrapper.load_twiddles()?;
    }
    wrapper.write_input(input)?;
    wrapper.start()?;
    let raw = wrapper.read_output()?.value;
    Ok(to_natural_order(&raw))
}

/// `x` is read as an `n1`-by-`n2` row-major matrix (`x[row*n2 + col]`).
/// Each column is transformed by an `n1`-point pass, multiplied by the
/// compensating twiddle `W_{n1*n2}^(k2*n1_idx)`, then each row by an
/// `n2`-point pass; the result is the `n1*n2`-point DFT of `x`, read back
/// column-major (`out[col*n1 + row] = X[row, col]`), not flattened in the
/// same row-major layout `x` was read in.
pub fn transform_2d(wrapper: &mut FftWrapper, x: &[Complex], n1: usize, n2: usize) -> Result<Vec<Complex>, SimError> {
    let n = n1 * n2;
    if x.len() != n {
        return Err(SimError::Configuration(format!(
            "2D decomposition expected {n} samples ({n1}x{n2}), got {}",
            x.len()
        )));
    }

    // Column pass: for each column c in [0, n2), gather the n1 rows and
    // run an n1-point transform.
    let mut g = vec![Complex::ZERO; n];
    for c in 0..n2 {
        let column: Vec<Complex> = (0..n1).map(|r| x[r * n2 + c]).collect();
        let transformed = run_frame(wrapper, n1, &column)?;
        for (r, &v) in transformed.iter().enumerate() {
            g[r * n2 + c] = v;
        }
    }

    // Twiddle compensation: H[k2, n1_idx] = G[k2, n1_idx] * W_N^(k2*n1_idx).
    let mut h = vec![Complex::ZERO; n];
    for k2 in 0..n1 {
        for n1_idx in 0..n2 {
            let w = Complex::twiddle((k2 * n1_idx) as i64, n as u32);
            h[k2 * n2 + n1_idx] = g[k2 * n2 + n1_idx] * w;
        }
    }

    // Row pass: for each row r in [0, n1), run an n2-point transform. The
    // final output is the column-major read-back of X, not a row-major
    // flatten: out[c*n1 + r] holds X[r, c].
    let mut out = vec![Complex::ZERO; n];
    for r in 0..n1 {
        let row: Vec<Complex> = (0..n2).map(|c| h[r * n2 + c]).collect();
        let transformed = run_frame(wrapper, n2, &row)?;
        for (c, &v) in transformed.iter().enumerate() {
            out[c * n1 + r] = v;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{all_approx_eq, dft};

    #[test]
    fn balanced_split_prefers_equal_factors() {
        assert_eq!(find_decomposition(16, 4).unwrap(), (4, 4));
        assert_eq!(find_decomposition(8, 4).unwrap(), (4, 2));
    }

    #[test]
    fn rejects_sizes_no_split_can_cover() {
        assert!(matches!(find_decomposition(64, 4), Err(SimError::Configuration(_))));
    }

    #[test]
    fn two_dimensional_transform_matches_direct_dft() {
        let mut w = FftWrapper::new(4);
        w.reset();
        let x: Vec<Complex> = (0..16).map(|i| Complex::real(i as f32)).collect();
        let out = transform_2d(&mut w, &x, 4, 4).unwrap();
        let expected = dft(&x);
        assert!(all_approx_eq(&out, &expected, 1e-1), "{out:?} != {expected:?}");
    }
}
