//! Producer ISR: fires once per sample on ADC-complete, fills the current
//! block from the converted sample, and hands it off to the foreground
//! processor when full.

use std::sync::Arc;

use crate::telemetry::PipelineMetrics;
use crate::transport::{BlockConsumer, BlockHandle, BlockPool, BlockProducer};

/// Owns the producer side of the pipeline: the `free` queue's consumer
/// half, the `processing` queue's producer half, and the in-flight block
/// it is currently filling.
pub struct Producer {
    pool: Arc<BlockPool>,
    metrics: Arc<PipelineMetrics>,
    free_rx: BlockConsumer,
    processing_tx: BlockProducer,
    current: Option<BlockHandle>,
    write_index: usize,
    buffer_size: usize,
}

impl Producer {
    pub fn new(
        pool: Arc<BlockPool>,
        metrics: Arc<PipelineMetrics>,
        free_rx: BlockConsumer,
        processing_tx: BlockProducer,
        buffer_size: usize,
    ) -> Self {
        Self {
            pool,
            metrics,
            free_rx,
            processing_tx,
            current: None,
            write_index: 0,
            buffer_size,
        }
    }

    /// Runs the producer ISR body for one converted sample.
    ///
    /// If the producer currently holds no block, it dequeues one from
    /// `free`; if `free` is empty, the sample is dropped — no block is
    /// written and no index advances. `write_index` is reset only once a
    /// new block has actually been acquired.
    pub fn on_adc_complete(&mut self, adc_code: f32) {
        if self.current.is_none() {
            match self.free_rx.try_dequeue() {
                Some(handle) => {
                    self.current = Some(handle);
                    self.write_index = 0;
                }
                None => {
                    self.metrics.record_producer_drop();
                    log::debug!("producer: free queue empty, dropping sample");
                    return;
                }
            }
        }

        let handle = self.current.expect("checked above");

        if self.write_index >= self.buffer_size {
            // The block filled on a previous call but `processing` was full
            // at that instant; retry the handoff before accepting new
            // samples. Under correct queue sizing this never triggers.
            if self.processing_tx.try_enqueue(handle) {
                self.current = None;
            } else {
                self.metrics.record_producer_drop();
            }
            return;
        }

        unsafe {
            self.pool
                .with_block_mut(handle, |b| b[self.write_index] = adc_code);
        }
        self.write_index += 1;

        if self.write_index == self.buffer_size && self.processing_tx.try_enqueue(handle) {
            self.current = None;
        }
    }
}
