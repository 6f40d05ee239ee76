//! Twiddle factor table generation, shared by the fabric's twiddle-load
//! bus and the driver's 2D-decomposition compensation step.
use crate::complex::Complex;

/// `W_n^k = cos(2*pi*k/n) - j*sin(2*pi*k/n)` for an `n`-point transform.
#[derive(Debug, Clone)]
pub struct TwiddleTable {
    n: usize,
    /// `n/2` base entries: `table[i] == W_n^i`.
    base: Vec<Complex>,
}

impl TwiddleTable {
    /// Stage 0 is filled directly; later stages reuse stage-0 entries at
    /// `stride = 2^level`, indexed by `(idx * stride) mod (n/2)`. Both the
    /// direct fill and the reuse indexing are the same table: `base`
    /// already holds every value any stage could need.
    pub fn generate(n: usize) -> Self {
        assert!(n.is_power_of_two() && n >= 2, "n must be a power of two >= 2");
        let half = n / 2;
        let base = (0..half).map(|i| Complex::twiddle(i as i64, n as u32)).collect();
        Self { n, base }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Twiddle factor for active-stage `level` (0-based from the first
    /// active stage) and PE lane `pe` within that stage.
    pub fn for_stage(&self, level: u32, pe: usize) -> Complex {
        let half = self.n / 2;
        let stride = 1usize << level;
        let idx = (pe * stride) % half;
        self.base[idx]
    }

    pub fn base_entry(&self, i: usize) -> Complex {
        self.base[i]
    }
}
