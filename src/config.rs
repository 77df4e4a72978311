//! Build-time configuration for the tapline audio pipeline.
//!
//! On the original microcontroller these are compile-time constants baked
//! into the firmware image. The host-testable port exposes them as ordinary
//! runtime configuration so the same pipeline can be exercised under several
//! configurations (notably the under-provisioning scenario in the test
//! suite, which needs `num_buffers` smaller than its production default).

/// Selects which of the four interchangeable DSP cores a [`PipelineConfig`]
/// wires into the foreground processor.
#[derive(Debug, Clone)]
pub enum DspConfig {
    /// Raw passthrough: the foreground processor leaves each block
    /// untouched.
    Passthrough,
    /// Buffered passthrough: identical steady-state DSP to `Passthrough`,
    /// kept distinct so it can be constructed and exercised as its own
    /// variant (see `DESIGN.md`).
    BufferedPassthrough,
    /// FIR lowpass, parameterized by the windowed-sinc designer inputs.
    Fir {
        /// Cutoff frequency in Hz.
        fc: f32,
        /// Window size parameter.
        n: f32,
        /// Tap count; must be odd.
        num_taps: usize,
    },
    /// Schroeder reverberator with the canonical allpass/comb lengths and
    /// gains.
    Schroeder,
}

impl Default for DspConfig {
    fn default() -> Self {
        DspConfig::Passthrough
    }
}

/// Configuration for the tapline audio pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of blocks in the pool, and the fixed capacity of each of the
    /// three transport queues. Default 4.
    pub num_buffers: usize,
    /// Samples per block. Observed values on the original hardware: 256
    /// (passthrough), 512 (FIR), 2048 (Schroeder).
    pub buffer_size: usize,
    /// Sampling frequency in Hz.
    pub fs: f32,
    /// Timer input clock frequency in Hz, used to derive the timer top
    /// value `N_top = round(f_cpu / fs)`.
    pub f_cpu: f32,
    /// Which DSP core the foreground processor runs.
    pub dsp: DspConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_buffers: 4,
            buffer_size: 256,
            fs: 40_000.0,
            f_cpu: 40_000_000.0,
            dsp: DspConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_buffers(mut self, num_buffers: usize) -> Self {
        self.num_buffers = num_buffers;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_fs(mut self, fs: f32) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_f_cpu(mut self, f_cpu: f32) -> Self {
        self.f_cpu = f_cpu;
        self
    }

    pub fn with_dsp(mut self, dsp: DspConfig) -> Self {
        self.dsp = dsp;
        self
    }

    /// The FIR lowpass variant's canonical configuration
    /// (`fc=1000Hz, fs=40kHz, N=1024, nTaps=9`).
    pub fn fir_lowpass() -> Self {
        Self {
            buffer_size: 512,
            dsp: DspConfig::Fir {
                fc: 1000.0,
                n: 1024.0,
                num_taps: 9,
            },
            ..Self::default()
        }
    }

    /// The Schroeder reverberator variant's canonical configuration.
    pub fn schroeder() -> Self {
        Self {
            buffer_size: 2048,
            fs: 30_000.0,
            dsp: DspConfig::Schroeder,
            ..Self::default()
        }
    }
}
