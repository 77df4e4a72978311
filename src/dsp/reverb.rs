//! Schroeder reverberator: allpass chain feeding a parallel feedback-comb
//! bank, summed at the output.

use super::comb::{Apcf, Fbcf};
use crate::error::PipelineError;

/// APCF delay lengths for the canonical instance.
pub const APCF_LENGTHS: [usize; 3] = [347, 113, 37];
/// Shared APCF gain magnitude for the canonical instance.
pub const APCF_GAIN: f32 = 0.7;
/// FBCF delay lengths for the canonical instance.
pub const FBCF_LENGTHS: [usize; 4] = [1687, 1601, 2053, 2251];
/// FBCF gain magnitudes for the canonical instance.
pub const FBCF_GAINS: [f32; 4] = [0.773, 0.802, 0.753, 0.733];

/// Ordered allpass chain feeding a parallel bank of feedback combs, summed
/// at the output. No wet/dry mix and no output scaling: the caller decides
/// how to combine this with a dry path or scale for the DAC.
#[derive(Clone, Debug)]
pub struct SchroederReverb {
    allpass: Vec<Apcf>,
    combs: Vec<Fbcf>,
}

impl SchroederReverb {
    /// Builds the reverberator from explicit delay-length/gain lists: each
    /// APCF gets gain `+g` (its constructor applies the `ff.bm=-g, fb.am=+g`
    /// split internally); each FBCF gets `b0=1, am=-|g|`.
    pub fn new(apcf_lengths: &[usize], apcf_gain: f32, fbcf_lengths: &[usize], fbcf_gains: &[f32]) -> Self {
        let allpass = apcf_lengths
            .iter()
            .map(|&m| Apcf::new(m, apcf_gain))
            .collect();
        let combs = fbcf_lengths
            .iter()
            .zip(fbcf_gains.iter())
            .map(|(&m, &g)| Fbcf::new(m, 1.0, -g.abs()))
            .collect();
        Self { allpass, combs }
    }

    /// The canonical instance, with the default delay lengths and gains.
    pub fn canonical() -> Self {
        Self::new(&APCF_LENGTHS, APCF_GAIN, &FBCF_LENGTHS, &FBCF_GAINS)
    }

    /// Processes one sample: through the allpass chain in order, then fans
    /// out to every feedback comb in parallel and sums their outputs.
    pub fn shift(&mut self, x: f32) -> Result<f32, PipelineError> {
        let mut chained = x;
        for ap in &mut self.allpass {
            chained = ap.shift(chained)?;
        }

        let mut sum = 0.0f32;
        for comb in &mut self.combs {
            sum += comb.shift(chained)?;
        }

        Ok(sum)
    }

    /// Processes a block in place.
    pub fn process_block(&mut self, block: &mut [f32]) -> Result<(), PipelineError> {
        for sample in block.iter_mut() {
            *sample = self.shift(*sample)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_response_is_bounded() {
        // An impulse produces a bounded output: no sample exceeds the bound
        // derived from the parallel FBCF bank's gains.
        let mut verb = SchroederReverb::canonical();
        let bound: f32 = FBCF_GAINS.iter().map(|g| 1.0 / (1.0 - g.abs())).sum();

        let max_fbcf_len = *FBCF_LENGTHS.iter().max().unwrap();
        let mut max_abs = 0.0f32;
        let mut out_len = 0usize;
        let mut x = 1.0f32;
        for _ in 0..(max_fbcf_len * 4) {
            let y = verb.shift(x).unwrap();
            x = 0.0;
            max_abs = max_abs.max(y.abs());
            out_len += 1;
        }

        assert!(out_len >= max_fbcf_len);
        assert!(
            max_abs <= bound + 1e-3,
            "max_abs={max_abs} bound={bound}"
        );
    }

    #[test]
    fn settles_to_silence_on_silent_input() {
        let mut verb = SchroederReverb::canonical();
        verb.shift(1.0).unwrap();
        for _ in 0..20_000 {
            verb.shift(0.0).unwrap();
        }
        let y = verb.shift(0.0).unwrap();
        assert!(y.abs() < 1e-3, "residual energy did not decay: {y}");
    }
}
