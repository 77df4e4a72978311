//! FIR lowpass coefficient designer and block filter. The tap-history
//! state is owned by the filter instance rather than shared globally, so
//! multiple filters never interfere with each other's history.

use crate::error::PipelineError;
use crate::hal::VectorMath;

/// Designs a windowed-sinc FIR lowpass with `nTaps` coefficients (must be
/// odd), symmetric around the center tap.
///
/// `P = 2*(N*fc/fs) + 1` is the pass-band width parameter; the center tap
/// is `h[m] = P/N` for `m = (nTaps-1)/2`, and each pair `h[m+i] = h[m-i]`
/// follows the standard sinc ratio.
pub fn design_lowpass(
    fc: f32,
    fs: f32,
    n: f32,
    num_taps: usize,
    vmath: &dyn VectorMath,
) -> Result<Vec<f32>, PipelineError> {
    if fs == 0.0 {
        return Err(PipelineError::InvalidArgument("fs must be nonzero".into()));
    }
    if n == 0.0 {
        return Err(PipelineError::InvalidArgument("N must be nonzero".into()));
    }
    if num_taps % 2 == 0 {
        return Err(PipelineError::InvalidArgument(
            "nTaps must be odd".into(),
        ));
    }

    let mut h = vec![0.0f32; num_taps];
    let pass_band_width = 2.0 * (n * fc / fs) + 1.0;
    let m = (num_taps - 1) / 2;

    h[m] = pass_band_width / n;

    for i in 1..=m {
        let numerator = vmath.sin(std::f32::consts::PI * i as f32 * pass_band_width / n);
        let denominator = vmath.sin(std::f32::consts::PI * i as f32 / n);
        h[m + i] = (1.0 / n) * (numerator / denominator);
        h[m - i] = h[m + i];
    }

    Ok(h)
}

/// Block FIR filter: owns its tap-history vector `v` (newest at index 0)
/// across calls to `filter`.
#[derive(Clone, Debug)]
pub struct FirFilter {
    h: Vec<f32>,
    v: Vec<f32>,
}

impl FirFilter {
    /// Creates a filter with coefficient vector `h`. The tap-history state
    /// is sized to match and zero-initialized.
    pub fn new(h: Vec<f32>) -> Self {
        let len = h.len();
        Self {
            h,
            v: vec![0.0; len],
        }
    }

    pub fn num_taps(&self) -> usize {
        self.h.len()
    }

    /// Filters a block of `x` in place into freshly allocated output of the
    /// same length. Zero-length coefficient vectors yield an all-zero
    /// output.
    pub fn filter(&mut self, x: &[f32]) -> Vec<f32> {
        let mut y = vec![0.0f32; x.len()];
        if self.h.is_empty() {
            return y;
        }

        for (i, &xi) in x.iter().enumerate() {
            for j in (1..self.v.len()).rev() {
                self.v[j] = self.v[j - 1];
            }
            self.v[0] = xi;

            let mut output = 0.0f32;
            for (hj, vj) in self.h.iter().zip(self.v.iter()) {
                output += hj * vj;
            }
            y[i] = output;
        }

        y
    }
}
