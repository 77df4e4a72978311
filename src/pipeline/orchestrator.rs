//! Pipeline orchestrator: peripheral init, pool/transport init, DSP-state
//! init, clock start, and the foreground run loop.

use std::sync::Arc;

use super::clock::SamplingClock;
use super::consumer::Consumer;
use super::processor::Processor;
use super::producer::Producer;
use crate::config::PipelineConfig;
use crate::dsp::DspCore;
use crate::error::PipelineError;
use crate::hal::{Timer, VectorMath};
use crate::telemetry::PipelineMetrics;
use crate::transport::{BlockPool, Transport};

/// Resolution of the DAC this core targets, in bits. Not configurable
/// per-instance: it is a property of the board, not the DSP chain.
const DAC_RESOLUTION_BITS: u32 = 12;

/// Owns every piece of a running pipeline instance: the block pool, the
/// three-queue transport (consumed into the producer/processor/consumer),
/// the sampling clock, and shared telemetry.
///
/// Construction performs peripheral init, pool/transport allocation, and
/// DSP-state setup: peripheral initialization is the caller's
/// responsibility (the `Timer`/`Adc`/`Dac`
/// passed in are assumed already configured at the board level), but pool
/// allocation, transport seeding, and DSP-state construction all happen
/// here and fail atomically — on error, nothing partially constructed is
/// left reachable, and [`Pipeline::start`] must never be called.
pub struct Pipeline {
    pool: Arc<BlockPool>,
    metrics: Arc<PipelineMetrics>,
    clock: SamplingClock,
    producer: Producer,
    processor: Processor,
    consumer: Consumer,
}

impl Pipeline {
    /// Builds a pipeline from `config`. Fails with [`PipelineError`] exactly
    /// when block-pool allocation or DSP-core construction would fail; the
    /// sampling clock is not started as part of construction (see
    /// [`Pipeline::start`]).
    pub fn new(config: &PipelineConfig, vmath: &dyn VectorMath) -> Result<Self, PipelineError> {
        if config.num_buffers == 0 {
            return Err(PipelineError::AllocationFailure(
                "num_buffers must be at least 1".into(),
            ));
        }
        if config.buffer_size == 0 {
            return Err(PipelineError::AllocationFailure(
                "buffer_size must be at least 1".into(),
            ));
        }

        log::info!(
            "tapline: starting pipeline (num_buffers={}, buffer_size={}, fs={}Hz, f_cpu={}Hz)",
            config.num_buffers,
            config.buffer_size,
            config.fs,
            config.f_cpu
        );

        let pool = Arc::new(BlockPool::new(config.num_buffers, config.buffer_size));
        let metrics = Arc::new(PipelineMetrics::default());
        let clock = SamplingClock::new(config.fs, config.f_cpu);
        metrics
            .load
            .set_block_budget(clock.block_budget_ns(config.buffer_size));

        let dsp = DspCore::build(&config.dsp, config.fs, vmath).map_err(|e| {
            log::error!("tapline: DSP core construction failed: {e}");
            e
        })?;

        let transport = Transport::new(&pool, config.num_buffers);

        let producer = Producer::new(
            Arc::clone(&pool),
            Arc::clone(&metrics),
            transport.free_rx,
            transport.processing_tx,
            config.buffer_size,
        );
        let processor = Processor::new(
            Arc::clone(&pool),
            Arc::clone(&metrics),
            transport.processing_rx,
            transport.ready_tx,
            dsp,
        );
        let consumer = Consumer::new(
            Arc::clone(&pool),
            Arc::clone(&metrics),
            transport.ready_rx,
            transport.free_tx,
            config.buffer_size,
            DAC_RESOLUTION_BITS,
        );

        Ok(Self {
            pool,
            metrics,
            clock,
            producer,
            processor,
            consumer,
        })
    }

    /// Starts the sampling clock. After this call, overflow/complete events
    /// must be routed to [`Pipeline::consumer_mut`] and
    /// [`Pipeline::producer_mut`] respectively.
    pub fn start(&self, timer: &mut dyn Timer) {
        self.clock.start(timer);
    }

    pub fn producer_mut(&mut self) -> &mut Producer {
        &mut self.producer
    }

    pub fn consumer_mut(&mut self) -> &mut Consumer {
        &mut self.consumer
    }

    pub fn processor_mut(&mut self) -> &mut Processor {
        &mut self.processor
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn clock(&self) -> &SamplingClock {
        &self.clock
    }

    pub fn buffer_size(&self) -> usize {
        self.pool.buffer_size()
    }

    pub fn num_buffers(&self) -> usize {
        self.pool.num_buffers()
    }

    /// Runs the foreground processor until `processing` is drained. Stands
    /// in for an infinite spin loop: a host process has no reason to
    /// busy-spin between blocks, and tests need a point where "caught up"
    /// is observable.
    pub fn drain_processor(&mut self) -> Result<usize, PipelineError> {
        let mut n = 0;
        while self.processor.step()? {
            n += 1;
        }
        Ok(n)
    }

    /// Splits the pipeline into its three owned stages plus a shared
    /// metrics handle, so a host harness can move each stage onto its own
    /// OS thread and run the transport under genuine concurrent contention
    /// — the two interrupt contexts and the foreground task each become a
    /// real thread instead of a single-threaded simulation (`tapline-sim`).
    pub fn into_parts(self) -> (Producer, Processor, Consumer, Arc<PipelineMetrics>) {
        let metrics = Arc::clone(&self.metrics);
        (self.producer, self.processor, self.consumer, metrics)
    }
}
