//! Consumer ISR: fires once per sample on timer overflow, initiates the
//! next ADC conversion, and drains one sample to the DAC.

use std::sync::Arc;

use crate::hal::{float_to_dac_code, Adc, Dac};
use crate::telemetry::PipelineMetrics;
use crate::transport::{BlockConsumer, BlockHandle, BlockPool, BlockProducer};

/// Owns the consumer side of the pipeline: the `ready` queue's consumer
/// half, the `free` queue's producer half, and the block currently being
/// drained to the DAC.
pub struct Consumer {
    pool: Arc<BlockPool>,
    metrics: Arc<PipelineMetrics>,
    ready_rx: BlockConsumer,
    free_tx: BlockProducer,
    current: Option<BlockHandle>,
    read_index: usize,
    buffer_size: usize,
    dac_resolution_bits: u32,
    last_code: u32,
}

impl Consumer {
    pub fn new(
        pool: Arc<BlockPool>,
        metrics: Arc<PipelineMetrics>,
        ready_rx: BlockConsumer,
        free_tx: BlockProducer,
        buffer_size: usize,
        dac_resolution_bits: u32,
    ) -> Self {
        Self {
            pool,
            metrics,
            ready_rx,
            free_tx,
            current: None,
            read_index: 0,
            buffer_size,
            dac_resolution_bits,
            last_code: 0,
        }
    }

    /// The most recently written DAC code, for tests/harnesses that want to
    /// observe the hold-last-sample behavior directly.
    pub fn last_code(&self) -> u32 {
        self.last_code
    }

    /// Runs the consumer ISR body for one timer-overflow event. Always
    /// initiates the next ADC conversion first — this is the clock that
    /// drives the producer side.
    ///
    /// If no block is available on `ready`, the DAC is left at its
    /// previously written code (hold), per the resolved Open Question in
    /// `DESIGN.md`; no index advances and no block is touched.
    pub fn on_timer_overflow(&mut self, adc: &mut dyn Adc, dac: &mut dyn Dac) {
        adc.start_single();

        if self.current.is_none() {
            match self.ready_rx.try_dequeue() {
                Some(handle) => {
                    self.current = Some(handle);
                    self.read_index = 0;
                }
                None => {
                    self.metrics.record_consumer_drop();
                    log::debug!("consumer: ready queue empty, holding last DAC code");
                    dac.write(self.last_code);
                    return;
                }
            }
        }

        let handle = self.current.expect("checked above");

        if self.read_index >= self.buffer_size {
            // Drained on a previous call but `free` was full; retry the
            // handoff before reading further. Under correct sizing this
            // never triggers.
            if self.free_tx.try_enqueue(handle) {
                self.current = None;
            }
            dac.write(self.last_code);
            return;
        }

        let sample = unsafe { self.pool.with_block_mut(handle, |b| b[self.read_index]) };
        let code = float_to_dac_code(sample, self.dac_resolution_bits);
        dac.write(code);
        self.last_code = code;
        self.read_index += 1;

        if self.read_index == self.buffer_size && self.free_tx.try_enqueue(handle) {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{MockAdc, MockDac};
    use crate::transport::{BlockHandle, Transport};

    #[test]
    fn drains_a_block_sample_by_sample_then_recycles_it() {
        let pool = Arc::new(BlockPool::new(1, 3));
        unsafe {
            pool.with_block_mut(BlockHandle(0), |b| b.copy_from_slice(&[10.0, 20.0, 30.0]));
        }
        let mut transport = Transport::new(&pool, 1);
        // seed `ready` directly instead of `free`, standing in for a block
        // the foreground processor already finished.
        transport.free_rx.try_dequeue();
        transport.ready_tx.try_enqueue(BlockHandle(0));

        let metrics = Arc::new(PipelineMetrics::default());
        let mut consumer = Consumer::new(
            Arc::clone(&pool),
            metrics,
            transport.ready_rx,
            transport.free_tx,
            3,
            12,
        );
        let mut adc = MockAdc::new(vec![]);
        let mut dac = MockDac::default();

        for _ in 0..3 {
            consumer.on_timer_overflow(&mut adc, &mut dac);
        }

        assert_eq!(dac.codes, vec![10, 20, 30]);
        assert_eq!(transport.free_rx.try_dequeue(), Some(BlockHandle(0)));
    }

    #[test]
    fn holds_last_code_when_ready_queue_is_empty() {
        let pool = Arc::new(BlockPool::new(1, 2));
        let transport = Transport::new(&pool, 1);
        let metrics = Arc::new(PipelineMetrics::default());
        let mut consumer = Consumer::new(
            pool,
            Arc::clone(&metrics),
            transport.ready_rx,
            transport.free_tx,
            2,
            12,
        );
        let mut adc = MockAdc::new(vec![]);
        let mut dac = MockDac::default();

        consumer.on_timer_overflow(&mut adc, &mut dac);
        consumer.on_timer_overflow(&mut adc, &mut dac);

        assert_eq!(dac.codes, vec![0, 0]);
        assert_eq!(
            metrics.consumer_drops.load(std::sync::atomic::Ordering::Relaxed),
            2
        );
    }

    #[test]
    fn overflow_always_starts_the_next_conversion() {
        let pool = Arc::new(BlockPool::new(1, 1));
        let transport = Transport::new(&pool, 1);
        let metrics = Arc::new(PipelineMetrics::default());
        let mut consumer = Consumer::new(pool, metrics, transport.ready_rx, transport.free_tx, 1, 12);
        let mut adc = MockAdc::new(vec![7, 8]);
        let mut dac = MockDac::default();

        consumer.on_timer_overflow(&mut adc, &mut dac);
        assert_eq!(adc.read_result(), 7);
        consumer.on_timer_overflow(&mut adc, &mut dac);
        assert_eq!(adc.read_result(), 8);
    }
}
