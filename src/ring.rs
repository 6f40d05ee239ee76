//! Input and output buffer rings: `4*(N_hw/2)` FIFOs arranged as two
//! groups of `{real, imag}` halves, matching the two `N_hw/2`-wide
//! complex vectors the pipeline consumes and produces each cycle.
use crate::complex::Complex;
use crate::error::SimError;
use crate::fifo::Fifo;

const RING_FIFO_DEPTH: usize = 4;

/// Feeds the pipeline's first PE row. `write_lane` stages one complex
/// sample into a given group/lane; `read_pair` drains one sample from
/// each group in lock-step, which is what the pipeline consumes per
/// cycle to form its `(a, b)` operand pair.
#[derive(Debug, Clone)]
pub struct InputRing {
    lanes: usize,
    group_a_re: Vec<Fifo<f32>>,
    group_a_im: Vec<Fifo<f32>>,
    group_b_re: Vec<Fifo<f32>>,
    group_b_im: Vec<Fifo<f32>>,
}

impl InputRing {
    pub fn new(n_hw: usize) -> Self {
        let lanes = n_hw / 2;
        Self {
            lanes,
            group_a_re: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_a_im: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_b_re: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_b_im: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Write one complex sample into group 0 (lane-indexed) or group 1.
    pub fn write_lane(&mut self, group: usize, lane: usize, value: Complex) -> Result<(), SimError> {
        let (re, im) = match group {
            0 => (&mut self.group_a_re[lane], &mut self.group_a_im[lane]),
            1 => (&mut self.group_b_re[lane], &mut self.group_b_im[lane]),
            _ => return Err(SimError::Protocol(format!("invalid ring group {group}"))),
        };
        re.push(value.re)?;
        im.push(value.im)?;
        Ok(())
    }

    /// Pop one sample from each group at `lane`, returning `(a, b)`.
    pub fn read_pair(&mut self, lane: usize) -> Option<(Complex, Complex)> {
        let a_re = self.group_a_re[lane].try_pop()?;
        let a_im = self.group_a_im[lane].try_pop()?;
        let b_re = self.group_b_re[lane].try_pop()?;
        let b_im = self.group_b_im[lane].try_pop()?;
        Some((Complex::new(a_re, a_im), Complex::new(b_re, b_im)))
    }

    pub fn groups_ready(&self) -> bool {
        (0..self.lanes).all(|lane| {
            !self.group_a_re[lane].is_empty()
                && !self.group_a_im[lane].is_empty()
                && !self.group_b_re[lane].is_empty()
                && !self.group_b_im[lane].is_empty()
        })
    }

    pub fn reset(&mut self) {
        for lane in 0..self.lanes {
            self.group_a_re[lane].reset();
            self.group_a_im[lane].reset();
            self.group_b_re[lane].reset();
            self.group_b_im[lane].reset();
        }
    }
}

/// Mirrors `InputRing` on the pipeline's tail: the last PE row's `(Y0,
/// Y1)` pair is split into the same four-FIFO layout. Natural-order
/// recovery is `concat(Y0, Y1)` (the two terminal half-vectors laid end
/// to end), which the driver's de-interleave step relies on.
#[derive(Debug, Clone)]
pub struct OutputRing {
    lanes: usize,
    group_a_re: Vec<Fifo<f32>>,
    group_a_im: Vec<Fifo<f32>>,
    group_b_re: Vec<Fifo<f32>>,
    group_b_im: Vec<Fifo<f32>>,
}

impl OutputRing {
    pub fn new(n_hw: usize) -> Self {
        let lanes = n_hw / 2;
        Self {
            lanes,
            group_a_re: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_a_im: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_b_re: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
            group_b_im: (0..lanes).map(|_| Fifo::new(RING_FIFO_DEPTH)).collect(),
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Write one active stage's `(Y0, Y1)` pair at a given `stride`. At full
    /// size (`stride == 1`) this fills every physical lane contiguously; for
    /// `real_size < N_hw` only every `stride`-th physical lane receives a
    /// value, matching the hardware's non-trivial bypass readout mapping:
    /// the active butterfly network is narrower than the physical ring, so
    /// its outputs land at strided positions rather than a contiguous
    /// prefix.
    pub fn write_stage_output(&mut self, y0: &[Complex], y1: &[Complex], stride: usize) -> Result<(), SimError> {
        if y0.len() != y1.len() {
            return Err(SimError::Protocol(format!(
                "output ring halves disagree in width: y0={} y1={}",
                y0.len(),
                y1.len()
            )));
        }
        if stride == 0 || y0.len() * stride > self.lanes {
            return Err(SimError::Protocol(format!(
                "output ring write out of range: width={} stride={} lanes={}",
                y0.len(),
                stride,
                self.lanes
            )));
        }
        for (p, (&v0, &v1)) in y0.iter().zip(y1.iter()).enumerate() {
            let phys = p * stride;
            self.group_a_re[phys].push(v0.re)?;
            self.group_a_im[phys].push(v0.im)?;
            self.group_b_re[phys].push(v1.re)?;
            self.group_b_im[phys].push(v1.im)?;
        }
        Ok(())
    }

    /// Drain one frame's worth of output in natural pipeline order,
    /// undoing the strided placement `write_stage_output` used. `real_size`
    /// determines the stride (`N_hw / real_size`, with `N_hw = 2 * lanes`).
    pub fn read_output(&mut self, real_size: usize) -> Vec<Complex> {
        let n_hw = self.lanes * 2;
        let stride = n_hw / real_size;
        let width = real_size / 2;
        let mut out = Vec::with_capacity(real_size);
        for p in 0..width {
            let phys = p * stride;
            let re = self.group_a_re[phys].try_pop().unwrap_or_default();
            let im = self.group_a_im[phys].try_pop().unwrap_or_default();
            out.push(Complex::new(re, im));
        }
        for p in 0..width {
            let phys = p * stride;
            let re = self.group_b_re[phys].try_pop().unwrap_or_default();
            let im = self.group_b_im[phys].try_pop().unwrap_or_default();
            out.push(Complex::new(re, im));
        }
        out
    }

    pub fn reset(&mut self) {
        for lane in 0..self.lanes {
            self.group_a_re[lane].reset();
            self.group_a_im[lane].reset();
            self.group_b_re[lane].reset();
            self.group_b_im[lane].reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_ring_round_trips_a_pair() {
        let mut ring = InputRing::new(8);
        ring.write_lane(0, 0, Complex::new(1.0, 2.0)).unwrap();
        ring.write_lane(1, 0, Complex::new(3.0, 4.0)).unwrap();
        assert!(ring.groups_ready());
        let (a, b) = ring.read_pair(0).unwrap();
        assert_eq!(a, Complex::new(1.0, 2.0));
        assert_eq!(b, Complex::new(3.0, 4.0));
    }

    #[test]
    fn output_ring_concatenates_groups_in_natural_order() {
        let mut ring = OutputRing::new(8);
        let y0 = vec![Complex::real(1.0), Complex::real(2.0), Complex::real(3.0), Complex::real(4.0)];
        let y1 = vec![Complex::real(5.0), Complex::real(6.0), Complex::real(7.0), Complex::real(8.0)];
        ring.write_stage_output(&y0, &y1, 1).unwrap();
        let out = ring.read_output(8);
        assert_eq!(out.iter().map(|c| c.re).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn output_ring_strided_readout_for_bypassed_hardware() {
        // N_hw=16 (lanes=8), real_size=8 -> stride = 16/8 = 2.
        let mut ring = OutputRing::new(16);
        let y0 = vec![Complex::real(1.0), Complex::real(2.0)];
        let y1 = vec![Complex::real(3.0), Complex::real(4.0)];
        ring.write_stage_output(&y0, &y1, 2).unwrap();
        let out = ring.read_output(8);
        assert_eq!(out.iter().map(|c| c.re).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
    }
}
