//! Deterministic input-sequence generators for driving frames through the
//! fabric. `Sequential` is lifted from the original driver's literal test
//! vector formula; the rest round out the fixture set a regression suite
//! needs (impulse response, DC response, an all-zero sanity check, and a
//! seeded-random soak).
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::complex::Complex;

#[derive(Debug, Clone, Copy)]
pub enum Generator {
    /// `x[n] = (start+n) + j*(start+n)`, the original driver's literal
    /// test-vector formula.
    Sequential { start: i32 },
    RandomSeeded { seed: u64 },
    UnitImpulse { position: usize },
    Ones,
    Zeros,
}

impl Generator {
    pub fn generate(&self, n: usize) -> Vec<Complex> {
        match *self {
            Generator::Sequential { start } => (0..n)
                .map(|i| {
                    let v = (start + i as i32) as f32;
                    Complex::new(v, v)
                })
                .collect(),
            Generator::RandomSeeded { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..n)
                    .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                    .collect()
            }
            Generator::UnitImpulse { position } => {
                let mut v = vec![Complex::ZERO; n];
                if position < n {
                    v[position] = Complex::real(1.0);
                }
                v
            }
            Generator::Ones => vec![Complex::real(1.0); n],
            Generator::Zeros => vec![Complex::ZERO; n],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Generator::Sequential { .. } => "sequential",
            Generator::RandomSeeded { .. } => "random_seeded",
            Generator::UnitImpulse { .. } => "unit_impulse",
            Generator::Ones => "ones",
            Generator::Zeros => "zeros",
        }
    }
}
