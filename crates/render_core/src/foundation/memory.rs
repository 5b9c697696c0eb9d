//! Memory management utilities
//!
//! [`LinearAllocator`] is a bump arena: a fixed byte buffer sized once up
//! front and an offset that only moves forward. It never frees individual
//! blocks; [`LinearAllocator::reset`] rewinds the whole arena at once.
//!
//! Blocks are handed out as [`ArenaBlock`] offsets rather than references, so
//! callers can hold several blocks while still allocating more. Each block
//! carries the arena generation it was cut from, and a block that survives a
//! `reset` is rejected instead of aliasing newer data.

use thiserror::Error;

/// Linear allocator failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The arena cannot satisfy the request
    #[error("Arena exhausted: requested {requested} bytes, {available} of {capacity} bytes available")]
    ArenaExhausted {
        /// Bytes requested, including alignment padding
        requested: usize,
        /// Bytes left in the arena
        available: usize,
        /// Total arena size
        capacity: usize,
    },

    /// Alignment is zero or not a power of two
    #[error("Invalid alignment: {0}")]
    InvalidAlignment(usize),

    /// Block was allocated before the last reset, or by another arena
    #[error("Arena block is stale or does not belong to this arena")]
    InvalidBlock,
}

/// A region inside a [`LinearAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaBlock {
    offset: usize,
    len: usize,
    generation: u32,
}

impl ArenaBlock {
    /// Offset from the start of the arena
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Size in bytes
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the block is zero-sized
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator over a pre-sized byte arena
///
/// Not thread-safe; it is meant to be owned by the thread that creates GPU
/// resources and to live only for the initialization phase that uses it.
#[derive(Debug)]
pub struct LinearAllocator {
    buffer: Vec<u8>,
    offset: usize,
    peak: usize,
    generation: u32,
}

impl LinearAllocator {
    /// Create an arena of `capacity` zeroed bytes
    pub fn new(capacity: usize) -> Self {
        log::debug!("Creating LinearAllocator with {} bytes", capacity);
        Self {
            buffer: vec![0; capacity],
            offset: 0,
            peak: 0,
            generation: 0,
        }
    }

    /// Total arena size in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes handed out since the last reset, including padding
    pub const fn used(&self) -> usize {
        self.offset
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    /// Highest `used()` value seen over the allocator's lifetime
    pub const fn peak(&self) -> usize {
        self.peak
    }

    /// Reserve `size` bytes aligned to `align` relative to the arena start
    ///
    /// # Errors
    /// [`MemoryError::InvalidAlignment`] for a non power-of-two alignment and
    /// [`MemoryError::ArenaExhausted`] when the arena is too small.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<ArenaBlock, MemoryError> {
        if !align.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment(align));
        }

        let exhausted = MemoryError::ArenaExhausted {
            requested: size,
            available: self.remaining(),
            capacity: self.capacity(),
        };
        let start = self
            .offset
            .checked_next_multiple_of(align)
            .ok_or(exhausted)?;
        let end = start.checked_add(size).ok_or(exhausted)?;
        if end > self.capacity() {
            return Err(MemoryError::ArenaExhausted {
                requested: end - self.offset,
                available: self.remaining(),
                capacity: self.capacity(),
            });
        }

        self.offset = end;
        self.peak = self.peak.max(end);
        Ok(ArenaBlock {
            offset: start,
            len: size,
            generation: self.generation,
        })
    }

    /// Reserve a block and fill it with `data`
    ///
    /// # Errors
    /// Same as [`LinearAllocator::allocate`].
    pub fn allocate_copy(&mut self, data: &[u8], align: usize) -> Result<ArenaBlock, MemoryError> {
        let block = self.allocate(data.len(), align)?;
        self.bytes_mut(block)?.copy_from_slice(data);
        Ok(block)
    }

    /// Read access to a block
    ///
    /// # Errors
    /// [`MemoryError::InvalidBlock`] for blocks from before the last reset.
    pub fn bytes(&self, block: ArenaBlock) -> Result<&[u8], MemoryError> {
        let range = self.checked_range(block)?;
        Ok(&self.buffer[range])
    }

    /// Write access to a block
    ///
    /// # Errors
    /// [`MemoryError::InvalidBlock`] for blocks from before the last reset.
    pub fn bytes_mut(&mut self, block: ArenaBlock) -> Result<&mut [u8], MemoryError> {
        let range = self.checked_range(block)?;
        Ok(&mut self.buffer[range])
    }

    /// Rewind the arena, invalidating every outstanding block
    pub fn reset(&mut self) {
        self.offset = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn checked_range(&self, block: ArenaBlock) -> Result<std::ops::Range<usize>, MemoryError> {
        let end = block.offset + block.len;
        if block.generation != self.generation || end > self.offset {
            return Err(MemoryError::InvalidBlock);
        }
        Ok(block.offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_advance_monotonically() {
        let mut arena = LinearAllocator::new(64);
        let a = arena.allocate(10, 1).unwrap();
        let b = arena.allocate(4, 4).unwrap();

        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 12);
        assert_eq!(arena.used(), 16);
        assert_eq!(arena.remaining(), 48);
    }

    #[test]
    fn test_exhaustion_is_reported() {
        let mut arena = LinearAllocator::new(16);
        arena.allocate(12, 1).unwrap();
        let err = arena.allocate(8, 1).unwrap_err();
        assert_eq!(
            err,
            MemoryError::ArenaExhausted {
                requested: 8,
                available: 4,
                capacity: 16
            }
        );
        // A failed request leaves the arena untouched.
        assert_eq!(arena.used(), 12);
    }

    #[test]
    fn test_exhaustion_counts_alignment_padding() {
        let mut arena = LinearAllocator::new(8);
        arena.allocate(1, 1).unwrap();
        assert!(matches!(
            arena.allocate(4, 8),
            Err(MemoryError::ArenaExhausted { requested: 11, .. })
        ));
    }

    #[test]
    fn test_invalid_alignment() {
        let mut arena = LinearAllocator::new(8);
        assert_eq!(arena.allocate(1, 0), Err(MemoryError::InvalidAlignment(0)));
        assert_eq!(arena.allocate(1, 3), Err(MemoryError::InvalidAlignment(3)));
    }

    #[test]
    fn test_copy_and_read_back() {
        let mut arena = LinearAllocator::new(32);
        let block = arena.allocate_copy(b"vertex", 1).unwrap();
        let other = arena.allocate_copy(&[1, 2, 3, 4], 4).unwrap();
        assert_eq!(arena.bytes(block).unwrap(), b"vertex");
        assert_eq!(arena.bytes(other).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_reset_invalidates_blocks() {
        let mut arena = LinearAllocator::new(32);
        let block = arena.allocate_copy(b"stale", 1).unwrap();
        arena.reset();

        assert_eq!(arena.used(), 0);
        assert_eq!(arena.peak(), 5);
        assert_eq!(arena.bytes(block), Err(MemoryError::InvalidBlock));
    }

    #[test]
    fn test_zero_sized_allocation() {
        let mut arena = LinearAllocator::new(0);
        let block = arena.allocate(0, 1).unwrap();
        assert!(block.is_empty());
        assert!(arena.bytes(block).unwrap().is_empty());
    }
}
