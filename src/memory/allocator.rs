//! Allocators backing staged memory regions.

use super::MemoryError;

/// A contiguous native region whose address can be handed to the
/// automation object. Dropping the region releases it.
pub trait NativeRegion {
    /// Address of the first byte as seen by the foreign object.
    fn base_address(&self) -> i64;

    /// Writable view of the whole region.
    fn bytes_mut(&mut self) -> &mut [u8];
}

/// Source of native regions used by the stager.
pub trait NativeAllocator {
    type Region: NativeRegion;

    /// Allocate a zeroed region of exactly `len` bytes.
    fn allocate(&self, len: usize) -> Result<Self::Region, MemoryError>;
}

/// Allocates regions on the process heap.
///
/// The automation object runs in-process, so a heap address is directly
/// usable by it. The backing buffer is boxed and never resized, which keeps
/// the address stable for the region's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

/// A heap-backed region, freed on drop.
#[derive(Debug)]
pub struct HeapRegion {
    data: Box<[u8]>,
}

impl NativeAllocator for HeapAllocator {
    type Region = HeapRegion;

    fn allocate(&self, len: usize) -> Result<HeapRegion, MemoryError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MemoryError::AllocationFailed { requested: len })?;
        data.resize(len, 0u8);
        Ok(HeapRegion {
            data: data.into_boxed_slice(),
        })
    }
}

impl NativeRegion for HeapRegion {
    fn base_address(&self) -> i64 {
        self.data.as_ptr() as usize as i64
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl HeapRegion {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
