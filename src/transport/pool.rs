//! Block pool: the fixed set of audio blocks allocated once at startup and
//! recycled through the three queues for the program's lifetime.

use std::cell::UnsafeCell;

/// Stable identity for a pooled block — an index, not a copy of its
/// contents. The pipeline passes these through the queues; block data
/// itself never moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle(pub usize);

/// The fixed set of `num_buffers` blocks, each `buffer_size` samples,
/// allocated at startup with identity stable for the program's lifetime.
///
/// Interior mutability via `UnsafeCell` is required because block contents
/// are written from whichever stage currently owns the handle (a producer
/// interrupt, the foreground processor, or a consumer interrupt), never
/// from two contexts at once. Soundness rests on the invariant the three
/// queues exist to enforce: at any instant a given `BlockHandle` is held
/// by exactly one owner, so no two contexts ever call `with_block_mut` on
/// the same handle concurrently.
pub struct BlockPool {
    blocks: Vec<UnsafeCell<Vec<f32>>>,
    buffer_size: usize,
}

// SAFETY: concurrent access to *different* handles from different threads is
// fine; the single-owner invariant above rules out concurrent access to the
// *same* handle.
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// Allocates `num_buffers` zero-initialized blocks of `buffer_size`
    /// samples each.
    pub fn new(num_buffers: usize, buffer_size: usize) -> Self {
        let blocks = (0..num_buffers)
            .map(|_| UnsafeCell::new(vec![0.0f32; buffer_size]))
            .collect();
        Self {
            blocks,
            buffer_size,
        }
    }

    pub fn num_buffers(&self) -> usize {
        self.blocks.len()
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Block handles in pool index order, for seeding the `free` queue at
    /// startup.
    pub fn all_handles(&self) -> impl Iterator<Item = BlockHandle> {
        (0..self.blocks.len()).map(BlockHandle)
    }

    /// Runs `f` against the block data for `handle`.
    ///
    /// # Safety
    ///
    /// The caller must currently hold exclusive ownership of `handle`
    /// (i.e. it was dequeued from a queue and not yet re-enqueued
    /// elsewhere). Violating this aliases the same block from two owners.
    pub unsafe fn with_block_mut<R>(&self, handle: BlockHandle, f: impl FnOnce(&mut [f32]) -> R) -> R {
        let cell = &self.blocks[handle.0];
        f((*cell.get()).as_mut_slice())
    }
}
