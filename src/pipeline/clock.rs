//! Sampling clock: the periodic hardware timer that drives both ends of
//! the pipeline.

use crate::hal::Timer;

/// Computes the timer top value for a periodic overflow at `fs` Hz, given
/// a timer input clock of `f_cpu` Hz: `N_top = round(f_cpu / fs)`.
pub fn top_value(f_cpu: f32, fs: f32) -> u32 {
    (f_cpu / fs).round() as u32
}

/// Configures and enables a hardware timer so it overflows at `fs` Hz.
/// On overflow, the caller is responsible for invoking the consumer ISR
/// body and initiating the next ADC conversion: this function only owns
/// the timer's own configuration, not the dispatch.
pub struct SamplingClock {
    fs: f32,
    f_cpu: f32,
}

impl SamplingClock {
    pub fn new(fs: f32, f_cpu: f32) -> Self {
        Self { fs, f_cpu }
    }

    pub fn fs(&self) -> f32 {
        self.fs
    }

    pub fn top_value(&self) -> u32 {
        top_value(self.f_cpu, self.fs)
    }

    /// One block's time budget in nanoseconds, `BUFFER_SIZE/fs`.
    pub fn block_budget_ns(&self, buffer_size: usize) -> u64 {
        ((buffer_size as f64 / self.fs as f64) * 1_000_000_000.0) as u64
    }

    /// Starts the clock: configures the timer to the computed top value and
    /// enables it. The caller arranges for overflow events to reach
    /// [`crate::pipeline::consumer::Consumer::on_timer_overflow`].
    pub fn start(&self, timer: &mut dyn Timer) {
        timer.configure(self.top_value());
        timer.enable();
    }
}
