//! Group tag selection for new runs
//!
//! Release stops at the first chunk whose tag differs from the block being
//! freed, so a new run should not share its tag with either neighbour. With
//! only three tags that is not always possible; the table below is the fixed
//! choice for every `(prev, next)` pair.

use crate::status::Status::{self, Free, TagA, TagB, TagC};

/// Rows are indexed by `prev`, columns by `next`
const TAG_TABLE: [[Status; 4]; 4] = [
    //  next: Free  TagA  TagB  TagC
    [TagA, TagB, TagA, TagA], // prev: Free
    [TagB, TagB, TagC, TagB], // prev: TagA
    [TagA, TagC, TagA, TagA], // prev: TagB
    [TagA, TagB, TagA, TagA], // prev: TagC
];

/// Tag for a run whose neighbours carry `prev` and `next`
///
/// Chunks outside the table count as [`Status::Free`]. The result is never
/// `Free`.
#[inline]
pub const fn derive_tag(prev: Status, next: Status) -> Status {
    TAG_TABLE[prev as usize][next as usize]
}
