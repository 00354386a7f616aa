//! Allocator engine
//!
//! Owns the backing storage and runs first-fit allocation and tag-bounded
//! release over its status table.
//!
//! # Implementation Notes
//! - O(n) allocation: linear scan for the first long-enough free run
//! - O(n) release: forward scan while the tag matches
//! - No locking; wrap the allocator in a mutex to share it across threads

use crate::config::RegionConfig;
use crate::layout::{RegionLayout, CHUNK_SIZE};
use crate::status::{Status, StatusTable};
use crate::tag::derive_tag;
use crate::{AllocError, Result};

/// Byte offset of an allocation inside the data area
///
/// Handles are plain offsets: they stay meaningful in a dump, and turning
/// one into memory always goes through the allocator's bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(usize);

impl Handle {
    pub const fn from_offset(offset: usize) -> Self {
        Self(offset)
    }

    pub const fn offset(self) -> usize {
        self.0
    }

    /// Index of the first chunk (truncates misaligned offsets)
    pub const fn chunk_index(self) -> usize {
        self.0 / CHUNK_SIZE
    }
}

/// Fixed-capacity allocator over one owned region
///
/// `S` is any byte storage: a `[u8; N]` keeps everything off the heap,
/// a `Vec<u8>` or `&mut [u8]` work as well. The storage is zeroed on
/// construction and laid out as described by [`RegionLayout`].
pub struct ChunkAllocator<S> {
    storage: S,
    layout: RegionLayout,
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ChunkAllocator<S> {
    /// Take ownership of `storage` and mark every chunk free
    ///
    /// # Errors
    /// Returns [`AllocError::RegionTooSmall`] if the storage cannot hold one
    /// status byte plus its four chunks.
    pub fn new(mut storage: S) -> Result<Self> {
        let layout = RegionConfig::new(storage.as_ref().len()).validate()?;
        storage.as_mut().fill(0);

        log::debug!(
            "region ready: {} bytes, {} status bytes, {} padding, {} chunks",
            layout.total_size(),
            layout.status_len(),
            layout.padding(),
            layout.chunk_count()
        );

        Ok(Self { storage, layout })
    }

    /// Give the storage back, status table and data included
    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn chunk_count(&self) -> usize {
        self.layout.chunk_count()
    }

    /// Read-only codec view of the status table
    pub fn status_table(&self) -> StatusTable<&[u8]> {
        StatusTable::new(self.status_bytes())
    }

    fn table_mut(&mut self) -> StatusTable<&mut [u8]> {
        let range = self.layout.status_range();
        StatusTable::new(&mut self.storage.as_mut()[range])
    }

    /// Raw status table, four 2-bit codes per byte
    pub fn status_bytes(&self) -> &[u8] {
        &self.storage.as_ref()[self.layout.status_range()]
    }

    /// Code of one chunk, `None` past the end
    pub fn status(&self, chunk: usize) -> Option<Status> {
        self.status_table().get(chunk)
    }

    pub fn free_chunks(&self) -> usize {
        self.status_table().count_free()
    }

    pub fn used_chunks(&self) -> usize {
        self.chunk_count() - self.free_chunks()
    }

    /// Claim `ceil(size / 8)` contiguous chunks
    ///
    /// Returns `None` for `size == 0` and when no free run is long enough.
    /// Neither case touches the status table. The block spans
    /// `ceil(size / 8) * 8` bytes from the returned handle.
    pub fn allocate(&mut self, size: usize) -> Option<Handle> {
        if size == 0 {
            return None;
        }

        let chunks_needed = size.div_ceil(CHUNK_SIZE);
        let first = self.find_free_run(chunks_needed)?;
        let last = first + chunks_needed - 1;

        let (prev, next) = self.neighbours(first, last);
        let tag = derive_tag(prev, next);
        self.table_mut().write_range(first, last, tag);

        let handle = Handle::from_offset(first * CHUNK_SIZE);
        log::debug!(
            "allocate {} bytes -> offset {:#x} (chunks {}..={}, {})",
            size,
            handle.offset(),
            first,
            last,
            tag
        );
        Some(handle)
    }

    /// First chunk of the lowest run of `chunks_needed` free chunks
    fn find_free_run(&self, chunks_needed: usize) -> Option<usize> {
        if chunks_needed > self.chunk_count() {
            log::trace!(
                "request for {} chunks exceeds capacity of {}",
                chunks_needed,
                self.chunk_count()
            );
            return None;
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for (chunk, status) in self.status_table().iter().enumerate() {
            if !status.is_free() {
                run_len = 0;
                continue;
            }
            if run_len == 0 {
                run_start = chunk;
            }
            run_len += 1;
            if run_len == chunks_needed {
                return Some(run_start);
            }
        }

        log::trace!("no free run of {} chunks", chunks_needed);
        None
    }

    /// Codes just outside `first..=last`, `Free` beyond either table edge
    fn neighbours(&self, first: usize, last: usize) -> (Status, Status) {
        let table = self.status_table();
        let prev = match first.checked_sub(1) {
            Some(chunk) => table.read(chunk),
            None => Status::Free,
        };
        let next = table.get(last + 1).unwrap_or(Status::Free);
        (prev, next)
    }

    /// Free the block that starts at `handle`
    ///
    /// Clears chunks forward from the handle for as long as they carry the
    /// handle chunk's tag. Nothing before the handle is examined, so only
    /// handles returned by [`ChunkAllocator::allocate`] release whole blocks.
    ///
    /// # Errors
    /// - [`AllocError::InvalidHandle`] if the offset is misaligned or past
    ///   the last chunk
    /// - [`AllocError::DoubleRelease`] if the chunk is already free
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        let first = self.chunk_of(handle)?;

        let mut table = self.table_mut();
        let target = table.read(first);
        if target.is_free() {
            log::warn!("release of free chunk at offset {:#x}", handle.offset());
            return Err(AllocError::DoubleRelease {
                offset: handle.offset(),
            });
        }

        let mut cleared = 0;
        for chunk in first..table.len() {
            if table.read(chunk) != target {
                break;
            }
            table.write_one(chunk, Status::Free);
            cleared += 1;
        }

        log::debug!(
            "release offset {:#x}: {} chunks ({})",
            handle.offset(),
            cleared,
            target
        );
        Ok(())
    }

    fn chunk_of(&self, handle: Handle) -> Result<usize> {
        let offset = handle.offset();
        if offset % CHUNK_SIZE != 0 || handle.chunk_index() >= self.chunk_count() {
            log::warn!("rejected handle at offset {:#x}", offset);
            return Err(AllocError::InvalidHandle { offset });
        }
        Ok(handle.chunk_index())
    }

    /// The whole data area
    pub fn data(&self) -> &[u8] {
        &self.storage.as_ref()[self.layout.data_range()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let range = self.layout.data_range();
        &mut self.storage.as_mut()[range]
    }

    /// `len` bytes of the data area starting at `handle`
    ///
    /// Only the bounds are checked; the status of the chunks is not.
    pub fn bytes(&self, handle: Handle, len: usize) -> Result<&[u8]> {
        let range = self.byte_range(handle, len)?;
        Ok(&self.data()[range])
    }

    pub fn bytes_mut(&mut self, handle: Handle, len: usize) -> Result<&mut [u8]> {
        let range = self.byte_range(handle, len)?;
        Ok(&mut self.data_mut()[range])
    }

    fn byte_range(&self, handle: Handle, len: usize) -> Result<core::ops::Range<usize>> {
        let offset = handle.offset();
        match offset.checked_add(len) {
            Some(end) if end <= self.layout.data_len() => Ok(offset..end),
            _ => Err(AllocError::OutOfBounds { offset, len }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> ChunkAllocator<[u8; 4096]> {
        ChunkAllocator::new([0xAA; 4096]).unwrap()
    }

    #[test]
    fn test_new_zeroes_storage() {
        let alloc = region();
        assert_eq!(alloc.chunk_count(), 496);
        assert_eq!(alloc.free_chunks(), 496);
        assert!(alloc.status_bytes().iter().all(|&b| b == 0));
        assert!(alloc.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_new_rejects_tiny_storage() {
        let result = ChunkAllocator::new([0u8; 16]);
        assert!(matches!(result, Err(AllocError::RegionTooSmall { size: 16, .. })));
    }

    #[test]
    fn test_zero_size() {
        let mut alloc = region();
        assert_eq!(alloc.allocate(0), None);
        assert_eq!(alloc.free_chunks(), 496);
    }

    #[test]
    fn test_first_allocation_rounds_up() {
        let mut alloc = region();
        let handle = alloc.allocate(17).unwrap();
        assert_eq!(handle.offset(), 0);
        assert_eq!(alloc.used_chunks(), 3);
        assert_eq!(alloc.status(0), Some(Status::TagA));
        assert_eq!(alloc.status(2), Some(Status::TagA));
        assert_eq!(alloc.status(3), Some(Status::Free));
    }

    #[test]
    fn test_neighbour_tags() {
        let mut alloc = region();
        let a = alloc.allocate(8).unwrap();
        let b = alloc.allocate(8).unwrap();
        let c = alloc.allocate(8).unwrap();
        assert_eq!(alloc.status(a.chunk_index()), Some(Status::TagA));
        assert_eq!(alloc.status(b.chunk_index()), Some(Status::TagB));
        assert_eq!(alloc.status(c.chunk_index()), Some(Status::TagA));

        // Refill the gap between TagA neighbours
        alloc.release(b).unwrap();
        let b = alloc.allocate(8).unwrap();
        assert_eq!(b.chunk_index(), 1);
        assert_eq!(alloc.status(1), Some(Status::TagB));
    }

    #[test]
    fn test_next_neighbour_read_across_byte() {
        let mut alloc = region();
        let a = alloc.allocate(8 * 4).unwrap();
        let b = alloc.allocate(8 * 4).unwrap();
        alloc.release(a).unwrap();

        // Run 0..=3 is followed by chunk 4 (TagB) in the next status byte
        let a = alloc.allocate(8 * 4).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(alloc.status(0), Some(Status::TagA));
        assert_eq!(alloc.status(b.chunk_index()), Some(Status::TagB));
    }

    #[test]
    fn test_release_stops_at_tag_change() {
        let mut alloc = region();
        let a = alloc.allocate(24).unwrap();
        let b = alloc.allocate(24).unwrap();
        alloc.release(a).unwrap();
        assert_eq!(alloc.used_chunks(), 3);
        assert_eq!(alloc.status(b.chunk_index()), Some(Status::TagB));
    }

    #[test]
    fn test_release_errors() {
        let mut alloc = region();
        let handle = alloc.allocate(8).unwrap();

        assert_eq!(
            alloc.release(Handle::from_offset(3)),
            Err(AllocError::InvalidHandle { offset: 3 })
        );
        assert_eq!(
            alloc.release(Handle::from_offset(3968)),
            Err(AllocError::InvalidHandle { offset: 3968 })
        );
        assert_eq!(
            alloc.release(Handle::from_offset(8)),
            Err(AllocError::DoubleRelease { offset: 8 })
        );

        alloc.release(handle).unwrap();
        assert_eq!(alloc.release(handle), Err(AllocError::DoubleRelease { offset: 0 }));
    }

    #[test]
    fn test_release_last_chunk() {
        let mut alloc = region();
        let all = alloc.allocate(3968 - 8).unwrap();
        let last = alloc.allocate(8).unwrap();
        assert_eq!(last.chunk_index(), 495);
        assert_eq!(alloc.free_chunks(), 0);

        alloc.release(last).unwrap();
        assert_eq!(alloc.free_chunks(), 1);
        assert_eq!(alloc.status(494), Some(Status::TagA));

        alloc.release(all).unwrap();
        assert_eq!(alloc.free_chunks(), 496);
    }

    #[test]
    fn test_capacity_exhausted_leaves_table() {
        let mut alloc = region();
        alloc.allocate(100).unwrap();
        let before = alloc.status_bytes().to_vec();
        assert_eq!(alloc.allocate(3968), None);
        assert_eq!(alloc.status_bytes(), &before[..]);
    }

    #[test]
    fn test_bytes_access() {
        let mut alloc = region();
        let handle = alloc.allocate(12).unwrap();
        alloc.bytes_mut(handle, 16).unwrap().copy_from_slice(&[7; 16]);
        assert_eq!(alloc.bytes(handle, 16).unwrap(), &[7; 16]);
        assert_eq!(&alloc.data()[16..24], &[0; 8]);

        assert_eq!(
            alloc.bytes(Handle::from_offset(3960), 16),
            Err(AllocError::OutOfBounds { offset: 3960, len: 16 })
        );
        assert!(alloc.bytes(Handle::from_offset(usize::MAX), 2).is_err());
    }

    #[test]
    fn test_borrowed_storage() {
        let mut buf = [0u8; 256];
        let mut alloc = ChunkAllocator::new(&mut buf[..]).unwrap();
        let handle = alloc.allocate(8).unwrap();
        alloc.bytes_mut(handle, 8).unwrap().fill(0x5A);
        let layout = *alloc.layout();
        drop(alloc);
        assert_eq!(buf[0], 0b01);
        assert_eq!(buf[layout.data_offset()], 0x5A);
    }
}
