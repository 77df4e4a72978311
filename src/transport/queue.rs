//! The SPSC queue transport linking pipeline stages:
//! `free -> processing -> ready -> free`, each a bounded single-producer
//! single-consumer queue of [`BlockHandle`] values.
//!
//! Built on `ringbuf`'s heap-allocated ring buffer, split into producer and
//! consumer halves at construction so each side can be moved into its own
//! interrupt/foreground context and called without synchronization.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use super::pool::BlockHandle;

/// The producer (enqueuing) half of a block queue.
pub struct BlockProducer {
    inner: HeapProd<BlockHandle>,
}

impl BlockProducer {
    /// Enqueues `handle`. Returns `false` without blocking if the queue is
    /// full: a full queue means drop the newest block and count it, never
    /// block the caller.
    pub fn try_enqueue(&mut self, handle: BlockHandle) -> bool {
        self.inner.try_push(handle).is_ok()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

/// The consumer (dequeuing) half of a block queue.
pub struct BlockConsumer {
    inner: HeapCons<BlockHandle>,
}

impl BlockConsumer {
    /// Dequeues the oldest handle, or `None` without blocking if the queue
    /// is empty: an empty queue is a no-op for the caller, not an error.
    pub fn try_dequeue(&mut self) -> Option<BlockHandle> {
        self.inner.try_pop()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Creates a bounded queue of the given capacity, split into its producer
/// and consumer halves.
pub fn block_queue(capacity: usize) -> (BlockProducer, BlockConsumer) {
    let rb = HeapRb::<BlockHandle>::new(capacity);
    let (prod, cons) = rb.split();
    (BlockProducer { inner: prod }, BlockConsumer { inner: cons })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_is_preserved() {
        let (mut prod, mut cons) = block_queue(4);
        for i in 0..3 {
            assert!(prod.try_enqueue(BlockHandle(i)));
        }
        for i in 0..3 {
            assert_eq!(cons.try_dequeue(), Some(BlockHandle(i)));
        }
        assert_eq!(cons.try_dequeue(), None);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (mut prod, _cons) = block_queue(2);
        assert!(prod.try_enqueue(BlockHandle(0)));
        assert!(prod.try_enqueue(BlockHandle(1)));
        assert!(prod.is_full());
        assert!(!prod.try_enqueue(BlockHandle(2)));
    }

    #[test]
    fn empty_dequeue_is_a_no_op() {
        let (_prod, mut cons) = block_queue(2);
        assert!(cons.is_empty());
        assert_eq!(cons.try_dequeue(), None);
    }
}
