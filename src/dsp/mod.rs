//! DSP building blocks: delay line, comb filters, FIR lowpass, and the
//! Schroeder reverberator that composes them.

pub mod comb;
pub mod core;
pub mod delay;
pub mod fir;
pub mod reverb;

pub use comb::{Apcf, Fbcf, Ffcf};
pub use core::DspCore;
pub use delay::DelayLine;
pub use fir::{design_lowpass, FirFilter};
pub use reverb::SchroederReverb;
