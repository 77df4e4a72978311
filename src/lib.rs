//! `tapline`: a lock-free, interrupt-driven audio effects pipeline and the
//! block-based DSP primitives (delay line, comb filters, FIR lowpass,
//! Schroeder reverberator) it composes. See `DESIGN.md` for how each piece
//! is grounded and the resolved design decisions.

pub mod config;
pub mod dsp;
pub mod error;
pub mod hal;
pub mod pipeline;
pub mod telemetry;
pub mod transport;

pub use config::{DspConfig, PipelineConfig};
pub use dsp::DspCore;
pub use error::PipelineError;
pub use pipeline::{Consumer, Pipeline, Processor, Producer, SamplingClock};
pub use telemetry::PipelineMetrics;
pub use transport::{BlockHandle, BlockPool, Transport};
