//! The interchangeable DSP core the foreground processor runs over each
//! block. The four variants are instances of one design rather than four
//! separate programs.

use super::{design_lowpass, FirFilter, SchroederReverb};
use crate::config::DspConfig;
use crate::error::PipelineError;
use crate::hal::VectorMath;

/// One of the four interchangeable DSP variants, wired into the foreground
/// processor by [`crate::config::PipelineConfig`].
///
/// `Passthrough` and `BufferedPassthrough` are both identity operators over
/// a block. They stay separate variants rather than collapsing into one so
/// each can be constructed and exercised independently — see `DESIGN.md`.
pub enum DspCore {
    Passthrough,
    BufferedPassthrough,
    Fir(FirFilter),
    Schroeder(SchroederReverb),
}

impl DspCore {
    /// Builds the configured core, running the FIR coefficient designer
    /// when needed. Fails exactly when the designer would.
    pub fn build(config: &DspConfig, fs: f32, vmath: &dyn VectorMath) -> Result<Self, PipelineError> {
        match config {
            DspConfig::Passthrough => Ok(DspCore::Passthrough),
            DspConfig::BufferedPassthrough => Ok(DspCore::BufferedPassthrough),
            DspConfig::Fir { fc, n, num_taps } => {
                let h = design_lowpass(*fc, fs, *n, *num_taps, vmath)?;
                Ok(DspCore::Fir(FirFilter::new(h)))
            }
            DspConfig::Schroeder => Ok(DspCore::Schroeder(SchroederReverb::canonical())),
        }
    }

    /// Runs this core over one block in place.
    pub fn process_block(&mut self, block: &mut [f32]) -> Result<(), PipelineError> {
        match self {
            DspCore::Passthrough | DspCore::BufferedPassthrough => Ok(()),
            DspCore::Fir(filter) => {
                let y = filter.filter(block);
                block.copy_from_slice(&y);
                Ok(())
            }
            DspCore::Schroeder(verb) => verb.process_block(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::StdVectorMath;

    #[test]
    fn passthrough_variants_leave_block_untouched() {
        let mut a = DspCore::build(&DspConfig::Passthrough, 40_000.0, &StdVectorMath).unwrap();
        let mut b = DspCore::build(&DspConfig::BufferedPassthrough, 40_000.0, &StdVectorMath).unwrap();
        let input = vec![1.0, -2.0, 3.0, 0.0];

        let mut block_a = input.clone();
        a.process_block(&mut block_a).unwrap();
        assert_eq!(block_a, input);

        let mut block_b = input.clone();
        b.process_block(&mut block_b).unwrap();
        assert_eq!(block_b, input);
    }

    #[test]
    fn fir_core_matches_standalone_filter() {
        let mut core = DspCore::build(
            &DspConfig::Fir {
                fc: 1000.0,
                n: 1024.0,
                num_taps: 9,
            },
            40_000.0,
            &StdVectorMath,
        )
        .unwrap();

        let mut block = vec![1.0f32; 64];
        core.process_block(&mut block).unwrap();

        let h = design_lowpass(1000.0, 40_000.0, 1024.0, 9, &StdVectorMath).unwrap();
        let expected: f32 = h.iter().sum();
        assert!((block.last().unwrap() - expected).abs() < 1e-4);
    }

    #[test]
    fn fir_build_rejects_bad_designer_arguments() {
        let err = DspCore::build(
            &DspConfig::Fir {
                fc: 1000.0,
                n: 1024.0,
                num_taps: 8,
            },
            40_000.0,
            &StdVectorMath,
        );
        assert!(matches!(err, Err(PipelineError::InvalidArgument(_))));
    }
}
