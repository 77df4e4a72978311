//! Foreground processor: the only preemptible worker, running the
//! configured DSP core over each full block.

use std::sync::Arc;

use crate::dsp::DspCore;
use crate::error::PipelineError;
use crate::telemetry::PipelineMetrics;
use crate::transport::{BlockConsumer, BlockPool, BlockProducer};

/// Owns the foreground side of the pipeline: the `processing` queue's
/// consumer half, the `ready` queue's producer half, and the configured
/// DSP core.
pub struct Processor {
    pool: Arc<BlockPool>,
    metrics: Arc<PipelineMetrics>,
    processing_rx: BlockConsumer,
    ready_tx: BlockProducer,
    dsp: DspCore,
}

impl Processor {
    pub fn new(
        pool: Arc<BlockPool>,
        metrics: Arc<PipelineMetrics>,
        processing_rx: BlockConsumer,
        ready_tx: BlockProducer,
        dsp: DspCore,
    ) -> Self {
        Self {
            pool,
            metrics,
            processing_rx,
            ready_tx,
            dsp,
        }
    }

    /// Processes at most one block: dequeues from `processing` if one is
    /// waiting, runs the DSP core over it in place, and enqueues the
    /// result onto `ready`. Returns `Ok(false)` without doing anything if
    /// `processing` was empty, so callers can spin on this in a loop the
    /// way a bare-metal firmware's foreground task would spin on it.
    pub fn step(&mut self) -> Result<bool, PipelineError> {
        let Some(handle) = self.processing_rx.try_dequeue() else {
            return Ok(false);
        };

        let timer = self.metrics.load.start_timer();
        let result = unsafe { self.pool.with_block_mut(handle, |b| self.dsp.process_block(b)) };
        drop(timer);
        result?;

        self.ready_tx.try_enqueue(handle);
        self.metrics.record_block_processed();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DspConfig;
    use crate::hal::mock::StdVectorMath;
    use crate::transport::{BlockHandle, Transport};

    #[test]
    fn runs_the_configured_dsp_and_forwards_to_ready() {
        let pool = Arc::new(BlockPool::new(1, 4));
        unsafe {
            pool.with_block_mut(BlockHandle(0), |b| b.copy_from_slice(&[1.0, 2.0, 3.0, 4.0]));
        }
        let mut transport = Transport::new(&pool, 1);
        transport.free_rx.try_dequeue();
        transport.processing_tx.try_enqueue(BlockHandle(0));

        let metrics = Arc::new(PipelineMetrics::default());
        let dsp = DspCore::build(&DspConfig::Passthrough, 40_000.0, &StdVectorMath).unwrap();
        let mut processor = Processor::new(
            Arc::clone(&pool),
            Arc::clone(&metrics),
            transport.processing_rx,
            transport.ready_tx,
            dsp,
        );

        assert!(processor.step().unwrap());
        assert_eq!(metrics.blocks_processed.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(transport.ready_rx.try_dequeue(), Some(BlockHandle(0)));
    }

    #[test]
    fn step_is_a_no_op_when_processing_queue_is_empty() {
        let pool = Arc::new(BlockPool::new(1, 4));
        let transport = Transport::new(&pool, 1);
        let metrics = Arc::new(PipelineMetrics::default());
        let dsp = DspCore::build(&DspConfig::Passthrough, 40_000.0, &StdVectorMath).unwrap();
        let mut processor = Processor::new(pool, metrics, transport.processing_rx, transport.ready_tx, dsp);

        assert!(!processor.step().unwrap());
    }
}
