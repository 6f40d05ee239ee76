//! Dual-mode processing element: a radix-2 butterfly in FFT mode, a
//! multiply-accumulate cell in GEMM mode, with a bypass mode that
//! dominates both and costs zero latency.
use crate::complex::Complex;

/// Nominal pipeline depth of one butterfly evaluation, used only by the
/// wrapper's completion-delay cost model.
pub const FFT_OPERATION_CYCLES: u32 = 20;
/// Nominal pipeline depth of one MAC evaluation.
pub const GEMM_OPERATION_CYCLES: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeMode {
    Fft,
    Gemm,
}

/// One physical PE lane. Mode, conjugate and shift are set once by
/// `Configure` and never inferred from the data flowing through.
#[derive(Debug, Clone)]
pub struct ProcessingElement {
    mode: PeMode,
    bypass: bool,
    conjugate: bool,
    shift: u32,
    twiddle: Complex,
    accumulator: Complex,
}

impl Default for ProcessingElement {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingElement {
    pub fn new() -> Self {
        Self {
            mode: PeMode::Fft,
            bypass: false,
            conjugate: false,
            shift: 0,
            twiddle: Complex::ZERO,
            accumulator: Complex::ZERO,
        }
    }

    pub fn configure(&mut self, mode: PeMode, conjugate: bool, shift: u32) {
        self.mode = mode;
        self.conjugate = conjugate;
        self.shift = shift;
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }

    pub fn load_twiddle(&mut self, w: Complex) {
        self.twiddle = w;
    }

    pub fn reset(&mut self) {
        self.mode = PeMode::Fft;
        self.bypass = false;
        self.conjugate = false;
        self.shift = 0;
        self.twiddle = Complex::ZERO;
        self.accumulator = Complex::ZERO;
    }

    /// Cycles this PE adds to the pipeline's completion delay. Bypass
    /// dominates: a bypassed row is a transparent latch regardless of mode.
    pub fn latency_cycles(&self) -> u32 {
        if self.bypass {
            0
        } else {
            match self.mode {
                PeMode::Fft => FFT_OPERATION_CYCLES,
                PeMode::Gemm => GEMM_OPERATION_CYCLES,
            }
        }
    }

    /// Evaluate one butterfly (or MAC) step. `(a, b)` are the two operand
    /// lanes entering this PE row; the return is `(y0, y1)` in the same
    /// lane order.
    pub fn step(&mut self, a: Complex, b: Complex) -> (Complex, Complex) {
        if self.bypass {
            return (a, b);
        }
        match self.mode {
            PeMode::Fft => {
                let w = if self.conjugate {
                    self.twiddle.conj()
                } else {
                    self.twiddle
                };
                let y0 = (a + b).shr(self.shift);
                let y1 = ((a - b) * w).shr(self.shift);
                (y0, y1)
            }
            PeMode::Gemm => {
                self.accumulator = self.accumulator + a * self.twiddle;
                (self.accumulator, a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_is_identity_and_zero_latency() {
        let mut pe = ProcessingElement::new();
        pe.set_bypass(true);
        let (y0, y1) = pe.step(Complex::new(1.0, 2.0), Complex::new(3.0, 4.0));
        assert_eq!(y0, Complex::new(1.0, 2.0));
        assert_eq!(y1, Complex::new(3.0, 4.0));
        assert_eq!(pe.latency_cycles(), 0);
    }

    #[test]
    fn fft_butterfly_with_unit_twiddle() {
        let mut pe = ProcessingElement::new();
        pe.configure(PeMode::Fft, false, 0);
        pe.load_twiddle(Complex::new(1.0, 0.0));
        let (y0, y1) = pe.step(Complex::new(2.0, 0.0), Complex::new(1.0, 0.0));
        assert_eq!(y0, Complex::new(3.0, 0.0));
        assert_eq!(y1, Complex::new(1.0, 0.0));
    }

    #[test]
    fn shift_scales_both_outputs() {
        let mut pe = ProcessingElement::new();
        pe.configure(PeMode::Fft, false, 1);
        pe.load_twiddle(Complex::new(1.0, 0.0));
        let (y0, y1) = pe.step(Complex::new(2.0, 0.0), Complex::new(0.0, 0.0));
        assert_eq!(y0, Complex::new(1.0, 0.0));
        assert_eq!(y1, Complex::new(1.0, 0.0));
    }

    #[test]
    fn gemm_mode_accumulates_against_the_loaded_twiddle_and_forwards_a() {
        let mut pe = ProcessingElement::new();
        pe.configure(PeMode::Gemm, false, 0);
        pe.load_twiddle(Complex::new(2.0, 0.0));
        let (c0, fwd0) = pe.step(Complex::new(1.0, 0.0), Complex::new(100.0, 0.0));
        assert_eq!(c0, Complex::new(2.0, 0.0));
        assert_eq!(fwd0, Complex::new(1.0, 0.0));
        let (c1, fwd1) = pe.step(Complex::new(3.0, 0.0), Complex::new(200.0, 0.0));
        assert_eq!(c1, Complex::new(8.0, 0.0));
        assert_eq!(fwd1, Complex::new(3.0, 0.0));
    }
}
