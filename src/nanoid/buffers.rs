//! Reusable scratch and output buffers.
//!
//! Each generator keeps two bounded pools: one of byte vectors that
//! receive raw random draws, one of strings that receive the assembled
//! identifier. Requests larger than the standard capacity get a fresh
//! allocation instead of a pooled buffer, and only buffers between the
//! standard capacity and `MAX_RETAINED_FACTOR` times it are taken back.

use crossbeam_queue::ArrayQueue;

/// Maximum number of idle buffers kept per pool.
const POOL_DEPTH: usize = 64;

/// Buffers larger than this multiple of the standard capacity are dropped
/// on return.
const MAX_RETAINED_FACTOR: usize = 8;

pub(crate) trait Buffer {
    fn with_capacity(capacity: usize) -> Self;
    fn capacity(&self) -> usize;
    fn clear(&mut self);
}

impl Buffer for Vec<u8> {
    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    // Scratch holds raw keystream; wipe it before reuse.
    fn clear(&mut self) {
        self.fill(0);
        Vec::clear(self);
    }
}

impl Buffer for String {
    fn with_capacity(capacity: usize) -> Self {
        String::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        String::capacity(self)
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

pub(crate) struct BufferPool<B> {
    idle: ArrayQueue<B>,
    standard: usize,
}

impl<B: Buffer> BufferPool<B> {
    pub(crate) fn new(standard: usize) -> Self {
        Self {
            idle: ArrayQueue::new(POOL_DEPTH),
            standard: standard.max(1),
        }
    }

    /// Returns an empty buffer with at least `min_capacity` bytes of room.
    pub(crate) fn get(&self, min_capacity: usize) -> B {
        if min_capacity > self.standard {
            return B::with_capacity(min_capacity);
        }

        match self.idle.pop() {
            Some(buf) if buf.capacity() >= min_capacity => buf,
            _ => B::with_capacity(self.standard),
        }
    }

    /// Hands a buffer back to the pool, or drops it.
    pub(crate) fn put(&self, mut buf: B) {
        let capacity = buf.capacity();
        if capacity < self.standard || capacity > self.standard * MAX_RETAINED_FACTOR {
            return;
        }

        buf.clear();
        let _ = self.idle.push(buf);
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.idle.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_standard_buffers() {
        let pool: BufferPool<Vec<u8>> = BufferPool::new(32);

        let mut buf = pool.get(16);
        assert!(buf.capacity() >= 32);
        buf.extend_from_slice(&[0xAB; 20]);
        pool.put(buf);
        assert_eq!(pool.idle(), 1);

        let buf = pool.get(32);
        assert!(buf.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn oversized_requests_bypass_the_pool() {
        let pool: BufferPool<String> = BufferPool::new(8);
        pool.put(pool.get(8));
        assert_eq!(pool.idle(), 1);

        let big = pool.get(100);
        assert!(big.capacity() >= 100);
        assert_eq!(pool.idle(), 1);

        // 100 > 8 * 8, so it is not retained.
        pool.put(big);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn small_buffers_are_not_retained() {
        let pool: BufferPool<Vec<u8>> = BufferPool::new(64);

        pool.put(Vec::with_capacity(4));

        assert_eq!(pool.idle(), 0);
    }
}
