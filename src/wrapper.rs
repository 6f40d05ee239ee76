//! Transactional wrapper: a command-oriented façade over [`FftFabric`]
//! with a small, fixed command set, each command's completion delay
//! coming from the cost model in [`crate::timing`]. The wrapper is
//! single-threaded with respect to commands -- a mutex serialises
//! concurrent requests even though this crate's driver never actually
//! contends for it.
use std::sync::Mutex;

use crate::complex::Complex;
use crate::error::SimError;
use crate::fabric::FftFabric;
use crate::pe::PeMode;
use crate::timing;

/// Payload for the `Configure` command.
#[derive(Debug, Clone, Copy)]
pub struct WrapperConfig {
    pub mode: PeMode,
    pub shift: u32,
    pub conjugate: bool,
    pub real_size: usize,
}

impl WrapperConfig {
    pub fn fft(real_size: usize) -> Self {
        Self {
            mode: PeMode::Fft,
            shift: 0,
            conjugate: false,
            real_size,
        }
    }
}

/// Outcome of a command: cycles charged plus whatever payload it returns.
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub cycles: u32,
    pub value: T,
}

/// `CheckStatus` payload: a snapshot of the wrapper's latched state, the
/// ABI's status-byte contract made queryable rather than a fire-and-forget
/// side effect.
#[derive(Debug, Clone, Copy)]
pub struct WrapperStatus {
    pub n_hw: usize,
    pub real_size: Option<usize>,
    pub twiddles_dirty: bool,
}

/// Command façade over one [`FftFabric`]. Owns the latched configuration
/// and the "twiddles must be reloaded" flag that `Configure` sets whenever
/// it changes `real_size`.
pub struct FftWrapper {
    fabric: FftFabric,
    lock: Mutex<()>,
    config: Option<WrapperConfig>,
    twiddles_dirty: bool,
}

impl FftWrapper {
    pub fn new(n_hw: usize) -> Self {
        Self {
            fabric: FftFabric::new(n_hw),
            lock: Mutex::new(()),
            config: None,
            twiddles_dirty: true,
        }
    }

    pub fn n_hw(&self) -> usize {
        self.fabric.n_hw()
    }

    pub fn real_size(&self) -> Option<usize> {
        self.config.map(|c| c.real_size)
    }

    pub fn needs_twiddle_reload(&self) -> bool {
        self.twiddles_dirty
    }

    /// `Reset`: assert reset for the hold window, then release; invalidate
    /// twiddles, config and pipeline occupancy flags.
    pub fn reset(&mut self) -> Completion<()> {
        let _guard = self.lock.lock().unwrap();
        self.fabric.reset();
        self.config = None;
        self.twiddles_dirty = true;
        tracing::info!("wrapper: reset");
        Completion {
            cycles: timing::reset_cost(),
            value: (),
        }
    }

    /// `Configure`: latch the new config and re-bypass stages; flags a
    /// twiddle reload as needed if `real_size` changed.
    pub fn configure(&mut self, cfg: WrapperConfig) -> Result<Completion<()>, SimError> {
        let _guard = self.lock.lock().unwrap();
        self.fabric.configure(cfg.real_size, cfg.mode, cfg.conjugate, cfg.shift)?;
        let size_changed = self.config.map(|c| c.real_size) != Some(cfg.real_size);
        if size_changed {
            self.twiddles_dirty = true;
        }
        self.config = Some(cfg);
        tracing::info!(real_size = cfg.real_size, mode = ?cfg.mode, "wrapper: configure");
        Ok(Completion {
            cycles: timing::FFT_CONFIG_SETUP,
            value: (),
        })
    }

    /// `CheckStatus`: a zero-cost query of the wrapper's latched state,
    /// the ABI's status byte made inspectable without mutating anything.
    pub fn check_status(&self) -> Completion<WrapperStatus> {
        let _guard = self.lock.lock().unwrap();
        Completion {
            cycles: 0,
            value: WrapperStatus {
                n_hw: self.fabric.n_hw(),
                real_size: self.config.map(|c| c.real_size),
                twiddles_dirty: self.twiddles_dirty,
            },
        }
    }

    /// `SetParams`: adjust `conjugate`/`shift` on the already-latched
    /// configuration without touching `real_size` or re-bypassing stages,
    /// so (unlike `Configure`) it never invalidates loaded twiddles.
    pub fn set_params(&mut self, conjugate: bool, shift: u32) -> Result<Completion<()>, SimError> {
        let _guard = self.lock.lock().unwrap();
        let mut cfg = self.config.ok_or_else(|| {
            SimError::Protocol("set_params issued before configure".to_string())
        })?;
        cfg.conjugate = conjugate;
        cfg.shift = shift;
        self.fabric.configure(cfg.real_size, cfg.mode, cfg.conjugate, cfg.shift)?;
        self.config = Some(cfg);
        tracing::debug!(conjugate, shift, "wrapper: set_params");
        Ok(Completion {
            cycles: timing::FFT_CONFIG_SETUP,
            value: (),
        })
    }

    /// `LoadTwiddles`: the wrapper computes `W_{real_size}^k` itself and
    /// loads it into every active-stage PE; bypassed stages are skipped.
    pub fn load_twiddles(&mut self) -> Result<Completion<()>, SimError> {
        let _guard = self.lock.lock().unwrap();
        let cfg = self.config.ok_or_else(|| {
            SimError::Protocol("load_twiddles issued before configure".to_string())
        })?;
        let num_loads = self.fabric.load_twiddles(cfg.real_size)?;
        self.twiddles_dirty = false;
        tracing::debug!(num_loads, "wrapper: load_twiddles");
        Ok(Completion {
            cycles: timing::load_twiddles_cost(num_loads),
            value: (),
        })
    }

    /// `WriteInput`: pump the input ring and wait for `groups_ready`.
    pub fn write_input(&mut self, samples: &[Complex]) -> Result<Completion<()>, SimError> {
        let _guard = self.lock.lock().unwrap();
        let cfg = self.config.ok_or_else(|| {
            SimError::Protocol("write_input issued before configure".to_string())
        })?;
        self.fabric.write_input(cfg.real_size, samples)?;
        tracing::trace!(real_size = cfg.real_size, "wrapper: write_input");
        Ok(Completion {
            cycles: timing::FFT_INPUT_WRITE_SETUP,
            value: (),
        })
    }

    /// `Start`: pulse start and run the active butterfly network once.
    pub fn start(&mut self) -> Result<Completion<()>, SimError> {
        let _guard = self.lock.lock().unwrap();
        let cfg = self.config.ok_or_else(|| {
            SimError::Protocol("start issued before configure".to_string())
        })?;
        if self.twiddles_dirty {
            return Err(SimError::Configuration(
                "start issued with stale twiddles (configure changed real_size without a reload)"
                    .to_string(),
            ));
        }
        self.fabric.start(cfg.real_size)?;
        let pipeline_cycles = self.fabric.pipeline_latency_cycles(cfg.real_size);
        tracing::debug!(real_size = cfg.real_size, pipeline_cycles, "wrapper: start");
        Ok(Completion {
            cycles: timing::start_cost(pipeline_cycles),
            value: (),
        })
    }

    /// `ReadOutput`: apply the active-size-aware extraction mapping.
    pub fn read_output(&mut self) -> Result<Completion<Vec<Complex>>, SimError> {
        let _guard = self.lock.lock().unwrap();
        let cfg = self.config.ok_or_else(|| {
            SimError::Protocol("read_output issued before configure".to_string())
        })?;
        let out = self.fabric.read_output(cfg.real_size)?;
        tracing::trace!(real_size = cfg.real_size, "wrapper: read_output");
        Ok(Completion {
            cycles: timing::read_output_cost(cfg.real_size),
            value: out,
        })
    }
}
