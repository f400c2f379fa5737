//! Bounds-checked writes into a staged region.

use super::MemoryError;

/// Copy `data` into `region` at `start`, failing instead of panicking when
/// the region is too small.
#[inline]
pub fn write_slice(region: &mut [u8], start: usize, data: &[u8]) -> Result<(), MemoryError> {
    let end = start
        .checked_add(data.len())
        .ok_or(MemoryError::TooLarge(usize::MAX))?;
    let available = region.len();
    region
        .get_mut(start..end)
        .ok_or(MemoryError::RegionTooSmall {
            needed: end,
            available,
        })?
        .copy_from_slice(data);
    Ok(())
}

/// Convert a byte offset or length to the integer width used on the wire.
#[inline]
pub fn wire_len(len: usize) -> Result<i64, MemoryError> {
    i64::try_from(len).map_err(|_| MemoryError::TooLarge(len))
}
