//! Chunk Allocator - Fixed-capacity in-place allocation over a single region
//!
//! # Purpose
//! Hands out byte ranges of one contiguous region without any external heap.
//! Occupancy lives in a packed status table (2 bits per 8-byte chunk) instead
//! of block headers, so the data area carries no per-allocation metadata.
//!
//! # Integration Points
//! - Depends on: nothing but the storage handed to [`ChunkAllocator::new`]
//! - Provides to: embedded components, the `status-viewer` host tool
//! - Exports: raw status table bytes for offline inspection
//!
//! # Architecture
//! ```text
//!   region (total_size bytes)
//!   ┌──────────────┬─────────┬──────────────────────────────────────┐
//!   │ status table │ padding │ data: chunk 0 | chunk 1 | ... | N-1  │
//!   └──────────────┴─────────┴──────────────────────────────────────┘
//!     1 byte = 4 chunks        8 bytes per chunk
//!
//!   status byte:  [ c3 | c2 | c1 | c0 ]   c0 = bits 0..1
//! ```
//! - First-fit scan over the status codes for a run of free chunks
//! - New runs get one of three group tags, derived from the neighbouring
//!   codes; the result never equals either neighbour
//! - Release clears forward from the handle while the tag matches
//!
//! The tag is a colouring, not a length. Release must be called with the
//! exact handle returned by [`ChunkAllocator::allocate`]: an offset inside a
//! block frees only the chunks from there to the end of the block.
//!
//! # Testing Strategy
//! - Unit tests: codec masks, tag table, layout arithmetic, engine paths
//! - Integration tests: reference scenario, boundaries, dump round-trip
//! - Property tests: range writes stay in bounds, live blocks never overlap
//! - Benchmarks: allocation/release latency on a fragmented region

#![no_std]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

mod config;
mod layout;
mod region;
mod status;
mod tag;

#[cfg(feature = "std")]
pub mod dump;

pub use config::{RegionConfig, DEFAULT_REGION_SIZE};
pub use layout::{align_up, RegionLayout, CHUNK_SIZE, DATA_ALIGN, MIN_REGION_SIZE};
pub use region::{ChunkAllocator, Handle};
pub use status::{Status, StatusTable, CHUNKS_PER_STATUS};
pub use tag::derive_tag;

use thiserror::Error;

/// Errors reported by the allocator
///
/// Running out of space is not an error: [`ChunkAllocator::allocate`]
/// returns `None` for both capacity exhaustion and zero-sized requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("Invalid handle: offset {offset:#x} is not a chunk inside the data area")]
    InvalidHandle { offset: usize },

    #[error("Double release detected at offset {offset:#x}")]
    DoubleRelease { offset: usize },

    #[error("Region too small (size: {size} bytes, minimum: {min} bytes)")]
    RegionTooSmall { size: usize, min: usize },

    #[error("Access out of bounds (offset: {offset:#x}, len: {len})")]
    OutOfBounds { offset: usize, len: usize },
}

pub type Result<T> = core::result::Result<T, AllocError>;
