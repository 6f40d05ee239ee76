//! Host-side driver: the frame lifecycle that sits above the wrapper and
//! the fabric it owns -- generate, move into the fabric, compute, move the
//! result back out, and check it against ground truth.
pub mod decompose;
pub mod generator;
pub mod memory;

use crate::complex::Complex;
use crate::error::SimError;
use crate::reference::{all_approx_eq, dft, to_natural_order};
use crate::wrapper::{FftWrapper, WrapperConfig};
use generator::Generator;
use memory::Memory;

/// Absolute tolerance the driver's verify step accepts, applied
/// independently to each of a sample's real and imaginary parts.
pub const VERIFY_TOLERANCE: f32 = 0.1;

/// One frame's round trip: its id, the input that produced it, the
/// fabric's natural-order output, the ground-truth transform it's checked
/// against, and the verdict.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: u64,
    pub real_size: usize,
    pub input: Vec<Complex>,
    pub output: Vec<Complex>,
    pub reference: Vec<Complex>,
    pub passed: bool,
}

/// Summed result of driving a batch of frames through a fabric.
#[derive(Debug, Default, Clone)]
pub struct Report {
    pub frames: Vec<Frame>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.frames.iter().filter(|f| f.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.frames.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.frames.iter().all(|f| f.passed)
    }
}

/// Sequences frames through one [`FftWrapper`], reconfiguring and
/// reloading twiddles only when `real_size` actually changes between
/// consecutive frames.
pub struct Driver {
    wrapper: FftWrapper,
    memory: Memory,
    next_frame_id: u64,
}

impl Driver {
    pub fn new(n_hw: usize) -> Self {
        let mut wrapper = FftWrapper::new(n_hw);
        wrapper.reset();
        tracing::info!(n_hw, "driver: initialized");
        Self {
            wrapper,
            memory: Memory::new(),
            next_frame_id: 0,
        }
    }

    pub fn n_hw(&self) -> usize {
        self.wrapper.n_hw()
    }

    /// Run one frame of `real_size` generated by `generator` straight
    /// through the fabric (no 2D decomposition), staging it through DDR
    /// and AM the way the real driver would move samples before and
    /// after compute.
    pub fn run_frame(&mut self, real_size: usize, generator: Generator) -> Result<Frame, SimError> {
        let id = self.next_frame_id;
        self.next_frame_id += 1;

        let input = generator.generate(real_size);
        tracing::info!(id, real_size, generator = generator.name(), "driver: generated frame");

        let ddr_addr = Memory::ddr_address(id, real_size);
        let am_addr = Memory::am_address(id, real_size);
        self.memory.write_samples(ddr_addr, &input)?;
        self.memory.transfer_ddr_to_am(ddr_addr, am_addr, real_size)?;
        let staged = self.memory.read_samples(am_addr, real_size)?;

        if self.wrapper.real_size() != Some(real_size) || self.wrapper.needs_twiddle_reload() {
            self.wrapper.configure(WrapperConfig::fft(real_size))?;
            self.wrapper.load_twiddles()?;
        }
        self.wrapper.write_input(&staged)?;
        self.wrapper.start()?;
        let raw = self.wrapper.read_output()?.value;
        let output = to_natural_order(&raw);

        let reference = dft(&input);
        let passed = all_approx_eq(&output, &reference, VERIFY_TOLERANCE);
        if passed {
            tracing::debug!(id, "driver: frame verified");
        } else {
            tracing::error!(id, ?output, ?reference, "driver: frame mismatch");
        }

        Ok(Frame {
            id,
            real_size,
            input,
            output,
            reference,
            passed,
        })
    }

    /// Run one frame through the single-level 2D decomposition path
    /// instead of a direct fabric pass, for sizes above the fabric's
    /// hardware size.
    pub fn run_frame_2d(&mut self, real_size: usize, generator: Generator) -> Result<Frame, SimError> {
        let id = self.next_frame_id;
        self.next_frame_id += 1;

        let input = generator.generate(real_size);
        let (n1, n2) = decompose::find_decomposition(real_size, self.wrapper.n_hw())?;
        tracing::info!(id, real_size, n1, n2, "driver: generated frame for 2D decomposition");

        let output = decompose::transform_2d(&mut self.wrapper, &input, n1, n2)?;
        let reference = dft(&input);
        let passed = all_approx_eq(&output, &reference, VERIFY_TOLERANCE);
        if passed {
            tracing::debug!(id, "driver: 2D frame verified");
        } else {
            tracing::error!(id, ?output, ?reference, "driver: 2D frame mismatch");
        }

        Ok(Frame {
            id,
            real_size,
            input,
            output,
            reference,
            passed,
        })
    }

    /// Run a batch of `(real_size, generator)` frames, routing each
    /// through direct or 2D-decomposed execution depending on whether it
    /// fits the fabric's hardware size.
    pub fn run_batch(&mut self, jobs: &[(usize, Generator)]) -> Result<Report, SimError> {
        let mut frames = Vec::with_capacity(jobs.len());
        for &(real_size, generator) in jobs {
            let frame = if real_size <= self.wrapper.n_hw() {
                self.run_frame(real_size, generator)?
            } else {
                self.run_frame_2d(real_size, generator)?
            };
            frames.push(frame);
        }
        Ok(Report { frames })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_frame_passes_verification() {
        let mut d = Driver::new(8);
        let frame = d.run_frame(8, Generator::UnitImpulse { position: 0 }).unwrap();
        assert!(frame.passed);
    }

    #[test]
    fn back_to_back_frames_do_not_contaminate_each_other() {
        let mut d = Driver::new(8);
        let a = d.run_frame(8, Generator::UnitImpulse { position: 0 }).unwrap();
        let b = d.run_frame(8, Generator::Ones).unwrap();
        assert!(a.passed);
        assert!(b.passed);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn resizing_between_frames_reconfigures_and_still_passes() {
        let mut d = Driver::new(16);
        let a = d.run_frame(16, Generator::Sequential { start: 0 }).unwrap();
        let b = d.run_frame(8, Generator::Sequential { start: 0 }).unwrap();
        assert!(a.passed);
        assert!(b.passed);
    }

    #[test]
    fn oversized_frame_routes_through_2d_decomposition() {
        let mut d = Driver::new(4);
        let frame = d.run_frame_2d(16, Generator::Sequential { start: 1 }).unwrap();
        assert!(frame.passed, "{:?} != {:?}", frame.output, frame.reference);
    }

    #[test]
    fn run_batch_aggregates_a_mixed_report() {
        let mut d = Driver::new(8);
        let jobs = vec![
            (8, Generator::UnitImpulse { position: 0 }),
            (4, Generator::Ones),
            (8, Generator::Zeros),
        ];
        let report = d.run_batch(&jobs).unwrap();
        assert_eq!(report.frames.len(), 3);
        assert!(report.all_passed());
        assert_eq!(report.failed(), 0);
    }
}
