//! Pipeline telemetry: real-time load and steady-state drop counters.
//!
//! One block's DSP must complete in strictly less than `BUFFER_SIZE/fs`
//! wall time, and a steady-state drop (no block available) is graceful
//! degradation rather than an error. Both are things a deployed instance
//! needs to be able to observe, even though neither is part of the DSP
//! math itself.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

const LOAD_SCALE: f32 = 1_000_000.0; // fixed-point for atomic float storage
const DEFAULT_SMOOTHING: f32 = 0.9;

/// Measures DSP load as the ratio of processing time to one block's budget
/// (`BUFFER_SIZE/fs`). A load of 1.0 means the processor is using the
/// entire budget; anything >= 1.0 means the pipeline will stall.
///
/// Thread-safe via atomics.
pub struct ProcessLoadMeasurer {
    budget_ns: AtomicU64,
    load_fixed: AtomicU32,
    smoothing: f32,
}

impl Default for ProcessLoadMeasurer {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl ProcessLoadMeasurer {
    /// Creates a new measurer. Smoothing in [0.0, 0.99]: higher = slower response.
    pub fn new(smoothing: f32) -> Self {
        Self {
            budget_ns: AtomicU64::new(0),
            load_fixed: AtomicU32::new(0),
            smoothing: smoothing.clamp(0.0, 0.99),
        }
    }

    /// Sets the per-block time budget, `BUFFER_SIZE/fs` in nanoseconds.
    pub fn set_block_budget(&self, ns: u64) {
        self.budget_ns.store(ns, Ordering::Relaxed);
    }

    /// Returns a timer that records elapsed time on drop.
    pub fn start_timer(&self) -> ScopedTimer<'_> {
        ScopedTimer {
            measurer: self,
            start: Instant::now(),
        }
    }

    pub fn record_sample(&self, elapsed_ns: u64) {
        let budget_ns = self.budget_ns.load(Ordering::Relaxed);
        if budget_ns == 0 {
            return;
        }

        let instant_load = (elapsed_ns as f64 / budget_ns as f64).min(2.0) as f32;
        let old_fixed = self.load_fixed.load(Ordering::Relaxed);
        let old_load = old_fixed as f32 / LOAD_SCALE;
        let new_load = self.smoothing * old_load + (1.0 - self.smoothing) * instant_load;
        let new_fixed = (new_load * LOAD_SCALE) as u32;

        self.load_fixed.store(new_fixed, Ordering::Relaxed);
    }

    pub fn get_load(&self) -> f32 {
        self.load_fixed.load(Ordering::Relaxed) as f32 / LOAD_SCALE
    }

    pub fn reset(&self) {
        self.load_fixed.store(0, Ordering::Relaxed);
    }
}

/// RAII timer that records elapsed time on drop.
pub struct ScopedTimer<'a> {
    measurer: &'a ProcessLoadMeasurer,
    start: Instant,
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_nanos() as u64;
        self.measurer.record_sample(elapsed);
    }
}

/// Aggregated pipeline metrics. All fields atomic for cross-thread access
/// from the producer/consumer interrupt contexts and the foreground
/// processor.
pub struct PipelineMetrics {
    pub load: ProcessLoadMeasurer,
    /// ADC samples dropped because the producer held no block (`free` was
    /// empty). Expected occasionally under correct operation; growth without
    /// bound indicates under-provisioning.
    pub producer_drops: AtomicU64,
    /// DAC samples skipped because the consumer held no block (`ready` was
    /// empty).
    pub consumer_drops: AtomicU64,
    /// Total blocks completed by the foreground processor.
    pub blocks_processed: AtomicU64,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            load: ProcessLoadMeasurer::default(),
            producer_drops: AtomicU64::new(0),
            consumer_drops: AtomicU64::new(0),
            blocks_processed: AtomicU64::new(0),
        }
    }
}

impl PipelineMetrics {
    pub fn record_producer_drop(&self) {
        self.producer_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_consumer_drop(&self) {
        self.consumer_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_processed(&self) {
        self.blocks_processed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_measurer_tracks_ratio() {
        let m = ProcessLoadMeasurer::new(0.0); // no smoothing, each sample replaces the estimate
        m.set_block_budget(1_000_000); // 1ms budget
        m.record_sample(500_000); // 0.5ms used
        assert!((m.get_load() - 0.5).abs() < 1e-3);
        m.record_sample(1_000_000); // at budget
        assert!((m.get_load() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn load_measurer_ignores_zero_budget() {
        let m = ProcessLoadMeasurer::default();
        m.record_sample(500_000);
        assert_eq!(m.get_load(), 0.0);
    }

    #[test]
    fn drop_counters_accumulate() {
        let metrics = PipelineMetrics::default();
        metrics.record_producer_drop();
        metrics.record_producer_drop();
        metrics.record_consumer_drop();
        assert_eq!(metrics.producer_drops.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.consumer_drops.load(Ordering::Relaxed), 1);
    }
}
