//! Lock-free transport: the block pool and the three queues the pipeline
//! stages hand block handles through. This is the
//! module the rest of the pipeline is built around.

mod pool;
mod queue;

pub use pool::{BlockHandle, BlockPool};
pub use queue::{block_queue, BlockConsumer, BlockProducer};

/// The three queues a pipeline instance wires together: blocks flow
/// `free -> processing -> ready -> free`, cycling forever.
///
/// - `free`: blocks available for the producer ISR to fill with fresh ADC
///   samples.
/// - `processing`: full blocks waiting for (or held by) the foreground
///   processor.
/// - `ready`: processed blocks waiting for the consumer ISR to drain to
///   the DAC.
pub struct Transport {
    pub free_tx: BlockProducer,
    pub free_rx: BlockConsumer,
    pub processing_tx: BlockProducer,
    pub processing_rx: BlockConsumer,
    pub ready_tx: BlockProducer,
    pub ready_rx: BlockConsumer,
}

impl Transport {
    /// Builds the three queues at the given capacity and seeds `free` with
    /// every handle in `pool`, so the producer ISR has blocks to claim
    /// immediately at startup.
    pub fn new(pool: &BlockPool, queue_capacity: usize) -> Self {
        let (mut free_tx, free_rx) = block_queue(queue_capacity);
        let (processing_tx, processing_rx) = block_queue(queue_capacity);
        let (ready_tx, ready_rx) = block_queue(queue_capacity);

        for handle in pool.all_handles() {
            // capacity is sized to exactly pool.num_buffers() by convention;
            // if it's smaller this silently drops the remainder, counted by
            // the caller via PipelineMetrics on first use.
            free_tx.try_enqueue(handle);
        }

        Self {
            free_tx,
            free_rx,
            processing_tx,
            processing_rx,
            ready_tx,
            ready_rx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_seeds_free_queue_with_every_block() {
        let pool = BlockPool::new(3, 8);
        let mut t = Transport::new(&pool, 3);
        let mut seen = Vec::new();
        while let Some(h) = t.free_rx.try_dequeue() {
            seen.push(h);
        }
        assert_eq!(seen, vec![BlockHandle(0), BlockHandle(1), BlockHandle(2)]);
    }

    #[test]
    fn a_block_cycles_through_all_three_queues() {
        let pool = BlockPool::new(2, 4);
        let mut t = Transport::new(&pool, 2);

        let h = t.free_rx.try_dequeue().unwrap();
        assert!(t.processing_tx.try_enqueue(h));
        let h = t.processing_rx.try_dequeue().unwrap();
        assert!(t.ready_tx.try_enqueue(h));
        let h = t.ready_rx.try_dequeue().unwrap();
        assert!(t.free_tx.try_enqueue(h));
        assert_eq!(t.free_rx.try_dequeue(), Some(h));
    }
}
