//! Region geometry
//!
//! A region of `total_size` bytes is split into the status table, alignment
//! padding and the chunked data area, in that order. Each status byte costs
//! 33 bytes of region: itself plus the four 8-byte chunks it describes.

use core::ops::Range;

use static_assertions::const_assert_eq;

use crate::config::DEFAULT_REGION_SIZE;
use crate::status::CHUNKS_PER_STATUS;

/// Allocation granularity in bytes
pub const CHUNK_SIZE: usize = 8;

/// Alignment of the data area relative to the region start
pub const DATA_ALIGN: usize = 8;

const BYTES_PER_STATUS: usize = 1 + CHUNK_SIZE * CHUNKS_PER_STATUS;

/// Smallest region that holds one status byte and its four chunks
pub const MIN_REGION_SIZE: usize = RegionLayout::footprint(1);

/// Round `value` up to a multiple of `align` (a power of two)
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Offsets and sizes derived from a region's total size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    total_size: usize,
    status_len: usize,
    data_offset: usize,
}

impl RegionLayout {
    /// Fit as many status bytes as possible into `total_size`
    ///
    /// Starts from `total_size / 33` and backs off while the padding that
    /// aligns the data area pushes the layout past the end.
    pub const fn for_size(total_size: usize) -> Self {
        let mut status_len = total_size / BYTES_PER_STATUS;
        while status_len > 0 && Self::footprint(status_len) > total_size {
            status_len -= 1;
        }

        Self {
            total_size,
            status_len,
            data_offset: align_up(status_len, DATA_ALIGN),
        }
    }

    const fn footprint(status_len: usize) -> usize {
        align_up(status_len, DATA_ALIGN) + status_len * CHUNKS_PER_STATUS * CHUNK_SIZE
    }

    pub const fn total_size(&self) -> usize {
        self.total_size
    }

    /// Status table length in bytes
    pub const fn status_len(&self) -> usize {
        self.status_len
    }

    /// Bytes between the status table and the data area
    pub const fn padding(&self) -> usize {
        self.data_offset - self.status_len
    }

    pub const fn data_offset(&self) -> usize {
        self.data_offset
    }

    pub const fn data_len(&self) -> usize {
        self.chunk_count() * CHUNK_SIZE
    }

    pub const fn chunk_count(&self) -> usize {
        self.status_len * CHUNKS_PER_STATUS
    }

    /// Region bytes past the data area that the layout leaves unused
    pub const fn unused_tail(&self) -> usize {
        self.total_size - self.data_offset - self.data_len()
    }

    /// True when the region cannot hold a single chunk
    pub const fn is_empty(&self) -> bool {
        self.status_len == 0
    }

    pub const fn status_range(&self) -> Range<usize> {
        0..self.status_len
    }

    pub const fn data_range(&self) -> Range<usize> {
        self.data_offset..self.data_offset + self.data_len()
    }
}

const DEFAULT_LAYOUT: RegionLayout = RegionLayout::for_size(DEFAULT_REGION_SIZE);

const_assert_eq!(DEFAULT_LAYOUT.status_len(), 124);
const_assert_eq!(DEFAULT_LAYOUT.chunk_count(), 496);
const_assert_eq!(DEFAULT_LAYOUT.data_len(), 3968);
const_assert_eq!(DEFAULT_LAYOUT.data_offset() % DATA_ALIGN, 0);
const_assert_eq!(MIN_REGION_SIZE, 40);
