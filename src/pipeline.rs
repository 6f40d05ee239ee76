//! `log2(N_hw)` PE rows interleaved with `log2(N_hw)-1` shuffles: the
//! reconfigurable butterfly pipeline itself.
use crate::complex::Complex;
use crate::pe::{PeMode, ProcessingElement};
use crate::shuffle::shuffle_stage;
use crate::twiddle::TwiddleTable;

/// One PE row plus whether the hardware is currently bypassing it.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub pes: Vec<ProcessingElement>,
    pub bypass: bool,
}

impl PipelineStage {
    fn new(width: usize) -> Self {
        Self {
            pes: (0..width).map(|_| ProcessingElement::new()).collect(),
            bypass: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    n_hw: usize,
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new(n_hw: usize) -> Self {
        assert!(n_hw.is_power_of_two() && n_hw >= 2);
        let num_stages = n_hw.trailing_zeros();
        let width = n_hw / 2;
        Self {
            n_hw,
            stages: (0..num_stages).map(|_| PipelineStage::new(width)).collect(),
        }
    }

    pub fn n_hw(&self) -> usize {
        self.n_hw
    }

    pub fn num_stages(&self) -> u32 {
        self.n_hw.trailing_zeros()
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    fn bypass_count(&self, real_size: usize) -> u32 {
        self.num_stages() - real_size.trailing_zeros()
    }

    /// Mark the leading `bypass_count` stages as transparent latches and
    /// set mode/conjugate/shift on every PE (bypass dominates regardless
    /// of the mode programmed into a bypassed row).
    pub fn configure(&mut self, real_size: usize, mode: PeMode, conjugate: bool, shift: u32) {
        let bypass_count = self.bypass_count(real_size);
        for (idx, stage) in self.stages.iter_mut().enumerate() {
            let bypass = (idx as u32) < bypass_count;
            stage.bypass = bypass;
            for pe in stage.pes.iter_mut() {
                pe.set_bypass(bypass);
                pe.configure(mode, conjugate, shift);
            }
        }
    }

    /// Load twiddles into the active (non-bypassed) stages only, using
    /// `real_size`-relative stage levels.
    pub fn load_twiddles(&mut self, table: &TwiddleTable, real_size: usize) {
        let bypass_count = self.bypass_count(real_size);
        let active_stages = real_size.trailing_zeros();
        for level in 0..active_stages {
            let stage_idx = (bypass_count + level) as usize;
            let width = real_size / 2;
            for p in 0..width {
                self.stages[stage_idx].pes[p].load_twiddle(table.for_stage(level, p));
            }
        }
    }

    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            for pe in stage.pes.iter_mut() {
                pe.reset();
            }
            stage.bypass = false;
        }
    }

    /// Run the active butterfly network at width `real_size` on the
    /// already-split `(a, b)` halves, returning the terminal `(Y0, Y1)`
    /// pair. Bypassed leading stages contribute nothing to the active
    /// data path: the hardware's stage-bypass mechanism is exactly
    /// equivalent, for a contiguous low-bit mask, to running the trailing
    /// `log2(real_size)` rows at the reduced width.
    pub fn run_active(&mut self, real_size: usize, a0: &[Complex], b0: &[Complex]) -> (Vec<Complex>, Vec<Complex>) {
        let bypass_count = self.bypass_count(real_size);
        let active_stages = real_size.trailing_zeros();
        let mut cur_a = a0[..real_size / 2].to_vec();
        let mut cur_b = b0[..real_size / 2].to_vec();

        for level in 0..active_stages {
            let stage_idx = (bypass_count + level) as usize;
            let width = real_size / 2;
            let mut y0 = Vec::with_capacity(width);
            let mut y1 = Vec::with_capacity(width);
            for p in 0..width {
                let (out0, out1) = self.stages[stage_idx].pes[p].step(cur_a[p], cur_b[p]);
                y0.push(out0);
                y1.push(out1);
            }
            if level + 1 < active_stages {
                let (next_a, next_b) = shuffle_stage(real_size, level, &y0, &y1);
                cur_a = next_a;
                cur_b = next_b;
            } else {
                return (y0, y1);
            }
        }
        // real_size == 1 is not reachable (power-of-two >= 2 enforced upstream),
        // but keep a defined return for an (unreachable) zero-stage case.
        (cur_a, cur_b)
    }

    /// Nominal cost-model latency for a `real_size`-wide frame: bypassed
    /// stages are free, each active row and inter-row shuffle charges its
    /// own nominal delay.
    pub fn latency_cycles(&self, real_size: usize) -> u32 {
        let active_stages = real_size.trailing_zeros();
        if active_stages == 0 {
            return 0;
        }
        let pe_cost = active_stages * crate::pe::FFT_OPERATION_CYCLES;
        let shuffle_cost = active_stages.saturating_sub(1) * crate::shuffle::SHUFFLE_OPERATION_CYCLES;
        pe_cost + shuffle_cost
    }
}
