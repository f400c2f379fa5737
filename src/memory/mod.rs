//! Staging of byte buffers into foreign-addressable memory.
//!
//! Some procedures take large payloads (model files, images) as an
//! `(address, length)` pair instead of an inline value. The functions here
//! copy the payload into a native region, hand the caller one
//! [`MemoryBlock`] per buffer, and release the region when the callback
//! returns. Release happens exactly once on every exit path: normal return,
//! an `Err` from the callback, or unwinding.
//!
//! ```ignore
//! let loaded = memory::stage(&model, |block| {
//!     gateway.call_for_int("LoadAiMemory", &mut args![block])
//! })?;
//! ```

mod allocator;
mod buffer;
mod error;

pub use allocator::{HeapAllocator, HeapRegion, NativeAllocator, NativeRegion};
pub use error::MemoryError;

use buffer::{wire_len, write_slice};

use crate::logging::trace;

/// Descriptor of a staged buffer as passed to the automation object.
///
/// Only valid inside the staging callback that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryBlock {
    pub address: i64,
    pub length: i64,
}

impl MemoryBlock {
    pub const fn new(address: i64, length: i64) -> Self {
        Self { address, length }
    }
}

/// Stage a single buffer on the heap and run `f` with its descriptor.
pub fn stage<T, E>(bytes: &[u8], f: impl FnOnce(MemoryBlock) -> Result<T, E>) -> Result<T, E>
where
    E: From<MemoryError>,
{
    stage_with(&HeapAllocator, bytes, f)
}

/// Stage a single buffer using a custom allocator.
pub fn stage_with<A, T, E>(
    allocator: &A,
    bytes: &[u8],
    f: impl FnOnce(MemoryBlock) -> Result<T, E>,
) -> Result<T, E>
where
    A: NativeAllocator,
    E: From<MemoryError>,
{
    stage_contiguous_with(allocator, &[bytes], |blocks| match blocks.first() {
        Some(block) => f(*block),
        None => Err(MemoryError::RegionTooSmall {
            needed: bytes.len(),
            available: 0,
        }
        .into()),
    })
}

/// Stage several buffers back to back in one heap allocation.
pub fn stage_contiguous<T, E>(
    buffers: &[&[u8]],
    f: impl FnOnce(&[MemoryBlock]) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<MemoryError>,
{
    stage_contiguous_with(&HeapAllocator, buffers, f)
}

/// Stage several buffers back to back using a custom allocator.
///
/// The region is sized to the sum of all buffer lengths; block `i` starts at
/// the base address plus the combined length of buffers `0..i`.
pub fn stage_contiguous_with<A, T, E>(
    allocator: &A,
    buffers: &[&[u8]],
    f: impl FnOnce(&[MemoryBlock]) -> Result<T, E>,
) -> Result<T, E>
where
    A: NativeAllocator,
    E: From<MemoryError>,
{
    let total = buffers
        .iter()
        .try_fold(0usize, |acc, b| acc.checked_add(b.len()))
        .ok_or(MemoryError::TooLarge(usize::MAX))?;

    let mut region = allocator.allocate(total)?;
    let base = region.base_address();

    let mut blocks = Vec::with_capacity(buffers.len());
    let mut offset = 0usize;
    for bytes in buffers {
        write_slice(region.bytes_mut(), offset, bytes)?;
        blocks.push(MemoryBlock::new(base + wire_len(offset)?, wire_len(bytes.len())?));
        offset += bytes.len();
    }
    trace!(base, total, buffers = blocks.len(), "staged native memory");

    let result = f(&blocks);
    drop(region);
    trace!(base, "released native memory");
    result
}
