//! `PEA_FFT`: binds the input ring, the multi-stage pipeline and the
//! output ring into one compute fabric, and drives the load/compute/read
//! handshakes between them. This is the layer the transactional wrapper
//! (`wrapper.rs`) issues commands against.
use crate::complex::Complex;
use crate::error::SimError;
use crate::pe::PeMode;
use crate::pipeline::Pipeline;
use crate::ring::{InputRing, OutputRing};
use crate::twiddle::TwiddleTable;

/// A fixed-`N_hw` FFT compute fabric. Holds exactly one fixed `n_hw`, set
/// at construction and never changed at runtime.
#[derive(Debug, Clone)]
pub struct FftFabric {
    n_hw: usize,
    input_ring: InputRing,
    pipeline: Pipeline,
    output_ring: OutputRing,
}

impl FftFabric {
    pub fn new(n_hw: usize) -> Self {
        assert!(n_hw.is_power_of_two() && n_hw >= 2, "N_hw must be a power of two >= 2");
        Self {
            n_hw,
            input_ring: InputRing::new(n_hw),
            pipeline: Pipeline::new(n_hw),
            output_ring: OutputRing::new(n_hw),
        }
    }

    pub fn n_hw(&self) -> usize {
        self.n_hw
    }

    pub fn reset(&mut self) {
        self.input_ring.reset();
        self.output_ring.reset();
        self.pipeline.reset();
    }

    /// Re-bypass the leading stages for `real_size` and program mode,
    /// conjugate and shift on every PE (bypass dominates on bypassed rows
    /// regardless of what's latched).
    pub fn configure(&mut self, real_size: usize, mode: PeMode, conjugate: bool, shift: u32) -> Result<(), SimError> {
        validate_real_size(real_size, self.n_hw)?;
        self.pipeline.configure(real_size, mode, conjugate, shift);
        Ok(())
    }

    /// Load `W_{real_size}^k` into every active-stage PE; bypassed stages
    /// are skipped entirely. Returns the number of `(stage, pe)` writes
    /// retired, which the wrapper's cost model charges per-write.
    pub fn load_twiddles(&mut self, real_size: usize) -> Result<usize, SimError> {
        validate_real_size(real_size, self.n_hw)?;
        let table = TwiddleTable::generate(real_size);
        self.pipeline.load_twiddles(&table, real_size);
        Ok(real_size / 2 * real_size.trailing_zeros() as usize)
    }

    /// Write `real_size` complex samples into the input ring's two halves,
    /// zero-padding the unused tail of each group's lanes so `groups_ready`
    /// can still observe every physical FIFO as written.
    pub fn write_input(&mut self, real_size: usize, samples: &[Complex]) -> Result<(), SimError> {
        validate_real_size(real_size, self.n_hw)?;
        if samples.len() != real_size {
            return Err(SimError::Configuration(format!(
                "write_input expected {real_size} samples, got {}",
                samples.len()
            )));
        }
        let half = real_size / 2;
        let full_half = self.n_hw / 2;
        for lane in 0..full_half {
            let a = if lane < half { samples[lane] } else { Complex::ZERO };
            let b = if lane < half { samples[half + lane] } else { Complex::ZERO };
            self.input_ring.write_lane(0, lane, a)?;
            self.input_ring.write_lane(1, lane, b)?;
        }
        if !self.input_ring.groups_ready() {
            return Err(SimError::Protocol(
                "input ring did not reach groups_ready after a full write".to_string(),
            ));
        }
        Ok(())
    }

    /// Run the active butterfly network once and split its terminal
    /// `(Y0, Y1)` pair into the output ring at the bypass-aware stride.
    pub fn start(&mut self, real_size: usize) -> Result<(), SimError> {
        validate_real_size(real_size, self.n_hw)?;
        let full_half = self.n_hw / 2;
        let mut a0 = Vec::with_capacity(full_half);
        let mut b0 = Vec::with_capacity(full_half);
        for lane in 0..full_half {
            let (a, b) = self.input_ring.read_pair(lane).ok_or_else(|| {
                SimError::Protocol(format!("input ring lane {lane} was not ready at start"))
            })?;
            a0.push(a);
            b0.push(b);
        }
        let (y0, y1) = self.pipeline.run_active(real_size, &a0, &b0);
        let stride = self.n_hw / real_size;
        self.output_ring.write_stage_output(&y0, &y1, stride)?;
        Ok(())
    }

    /// Drain one frame's worth of output in natural pipeline order.
    pub fn read_output(&mut self, real_size: usize) -> Result<Vec<Complex>, SimError> {
        validate_real_size(real_size, self.n_hw)?;
        Ok(self.output_ring.read_output(real_size))
    }

    pub fn pipeline_latency_cycles(&self, real_size: usize) -> u32 {
        self.pipeline.latency_cycles(real_size)
    }
}

/// `real_size` must be a power of two in `[2, n_hw]`.
fn validate_real_size(real_size: usize, n_hw: usize) -> Result<(), SimError> {
    if real_size < 2 || !real_size.is_power_of_two() {
        return Err(SimError::Configuration(format!(
            "real_size {real_size} is not a power of two >= 2"
        )));
    }
    if real_size > n_hw {
        return Err(SimError::Configuration(format!(
            "real_size {real_size} exceeds hardware size {n_hw}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(fabric: &mut FftFabric, real_size: usize, input: &[Complex]) -> Vec<Complex> {
        fabric.configure(real_size, PeMode::Fft, false, 0).unwrap();
        fabric.load_twiddles(real_size).unwrap();
        fabric.write_input(real_size, input).unwrap();
        fabric.start(real_size).unwrap();
        fabric.read_output(real_size).unwrap()
    }

    #[test]
    fn full_size_round_trip_matches_a_unit_impulse() {
        let mut fabric = FftFabric::new(8);
        let mut input = vec![Complex::ZERO; 8];
        input[0] = Complex::real(1.0);
        let out = run_frame(&mut fabric, 8, &input);
        for v in out {
            assert!(v.approx_eq(Complex::real(1.0), 1e-4));
        }
    }

    #[test]
    fn bypassed_size_matches_a_freshly_instantiated_fabric() {
        let input: Vec<Complex> = (0..4).map(|i| Complex::real((i + 1) as f32)).collect();

        let mut big = FftFabric::new(16);
        let from_big = run_frame(&mut big, 4, &input);

        let mut small = FftFabric::new(4);
        let from_small = run_frame(&mut small, 4, &input);

        for (a, b) in from_big.iter().zip(from_small.iter()) {
            assert!(a.approx_eq(*b, 1e-4), "{a} != {b}");
        }
    }

    #[test]
    fn rejects_real_size_above_hardware_size() {
        let mut fabric = FftFabric::new(8);
        assert!(matches!(
            fabric.configure(16, PeMode::Fft, false, 0),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_non_power_of_two_real_size() {
        let mut fabric = FftFabric::new(8);
        assert!(matches!(
            fabric.configure(6, PeMode::Fft, false, 0),
            Err(SimError::Configuration(_))
        ));
    }
}
