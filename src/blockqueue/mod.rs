//! Provides a queue of blocks the worker threads pick their work
//! from: image tiles for the camera ray integrators, or batches of
//! photons for the random walk simulations. The queue itself is not
//! changed after creation we simply work through it with an atomic
//! counter to track the index of the next block to work on.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

// see github/tray_rust/src/sampler/block_queue.rs

/// The queue of blocks to be worked on shared immutably between worker threads.
pub struct BlockQueue {
    /// The block indices of blocks to work on
    blocks: Vec<(u32, u32)>,
    /// Get the dimensions of an individual block
    dimensions: (u32, u32),
    /// Number of items (pixels or photons) covered by the queue
    limit: u64,
    /// Index of the next block to be worked on
    next: AtomicUsize,
}

impl BlockQueue {
    /// Create a block queue covering an image with dimensions `img`
    /// with tiles of dimension `dim`. Border tiles may stick out of
    /// the image.
    pub fn new(img: (u32, u32), dim: (u32, u32)) -> BlockQueue {
        let dim: (u32, u32) = (dim.0.max(1), dim.1.max(1));
        let num_blocks = ((img.0 + dim.0 - 1) / dim.0, (img.1 + dim.1 - 1) / dim.1);
        let mut blocks: Vec<(u32, u32)> = (0..num_blocks.0 * num_blocks.1)
            .map(|i| (i % num_blocks.0, i / num_blocks.0))
            .collect();
        blocks.sort_by(|a, b| morton2(*a).cmp(&morton2(*b)));
        BlockQueue {
            blocks,
            dimensions: dim,
            limit: img.0 as u64 * img.1 as u64,
            next: AtomicUsize::new(0),
        }
    }
    /// Create a block queue handing out `number_photons` photons in
    /// batches of `batch_size`.
    pub fn photon_batches(number_photons: u64, batch_size: u32) -> BlockQueue {
        let batch_size: u32 = batch_size.max(1);
        let num_blocks: u64 = (number_photons + batch_size as u64 - 1) / batch_size as u64;
        BlockQueue {
            blocks: (0..num_blocks).map(|i| (i as u32, 0)).collect(),
            dimensions: (batch_size, 1),
            limit: number_photons,
            next: AtomicUsize::new(0),
        }
    }
    /// Get the dimensions of an individual block in the queue
    pub fn block_dim(&self) -> (u32, u32) {
        self.dimensions
    }
    /// Photon indices of a block created by **photon_batches()**.
    pub fn photon_range(&self, block: (u32, u32)) -> Range<u64> {
        let start: u64 = block.0 as u64 * self.dimensions.0 as u64;
        let end: u64 = (start + self.dimensions.0 as u64).min(self.limit);
        start.min(end)..end
    }
    /// Get an iterator to work through the queue
    pub fn iter(&self) -> BlockQueueIterator {
        BlockQueueIterator { queue: self }
    }
    /// Get the next block in the queue or None if the queue is finished
    pub fn next(&self) -> Option<(u32, u32)> {
        let i = self.next.fetch_add(1, Ordering::AcqRel);
        self.blocks.get(i).cloned()
    }
    /// Get the length of the queue
    pub fn len(&self) -> usize {
        self.blocks.len()
    }
    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.next.load(Ordering::Acquire) >= self.blocks.len()
    }
}

/// Iterator to work through the queue safely
pub struct BlockQueueIterator<'a> {
    queue: &'a BlockQueue,
}

impl<'a> Iterator for BlockQueueIterator<'a> {
    type Item = (u32, u32);
    fn next(&mut self) -> Option<(u32, u32)> {
        self.queue.next()
    }
}

// see github/tray_rust/src/sampler/morton.rs

/// Insert a 0 bit between each of the low 16 bits of x
fn part1_by1(mut x: u32) -> u32 {
    // x = ---- ---- ---- ---- fedc ba98 7654 3210
    x &= 0x0000_ffff;
    // x = ---- ---- fedc ba98 ---- ---- 7654 3210
    x = (x ^ (x << 8)) & 0x00ff_00ff;
    // x = ---- fedc ---- ba98 ---- 7654 ---- 3210
    x = (x ^ (x << 4)) & 0x0f0f_0f0f;
    // x = --fe --dc --ba --98 --76 --54 --32 --10
    x = (x ^ (x << 2)) & 0x3333_3333;
    // x = -f-e -d-c -b-a -9-8 -7-6 -5-4 -3-2 -1-0
    (x ^ (x << 1)) & 0x5555_5555
}
/// Compute the Morton code for the `(x, y)` position.
fn morton2(p: (u32, u32)) -> u32 {
    (part1_by1(p.1) << 1) + part1_by1(p.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn photon_batches_cover_all_photons() {
        let bq = BlockQueue::photon_batches(10, 4);
        assert_eq!(bq.len(), 3);
        let ranges: Vec<Range<u64>> = bq.iter().map(|b| bq.photon_range(b)).collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert!(bq.is_empty());
        assert_eq!(BlockQueue::photon_batches(0, 4).len(), 0);
    }

    #[test]
    fn tiles_cover_image() {
        let bq = BlockQueue::new((33, 16), (16, 16));
        assert_eq!(bq.len(), 3);
        assert_eq!(bq.block_dim(), (16, 16));
        let mut tiles: Vec<(u32, u32)> = bq.iter().collect();
        tiles.sort();
        assert_eq!(tiles, vec![(0, 0), (1, 0), (2, 0)]);
    }
}
