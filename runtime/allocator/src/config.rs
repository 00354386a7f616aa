//! Construction-time configuration

use crate::layout::{RegionLayout, MIN_REGION_SIZE};
use crate::{AllocError, Result};

/// Region size used when nothing else is configured: 124 status bytes and
/// 496 chunks
pub const DEFAULT_REGION_SIZE: usize = 4096;

/// Sizing for one allocator region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegionConfig {
    /// Bytes of backing storage, status table and padding included
    pub total_size: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_SIZE)
    }
}

impl RegionConfig {
    pub const fn new(total_size: usize) -> Self {
        Self { total_size }
    }

    pub const fn layout(&self) -> RegionLayout {
        RegionLayout::for_size(self.total_size)
    }

    /// Layout for this size, or an error if it holds no chunk at all
    pub fn validate(&self) -> Result<RegionLayout> {
        let layout = self.layout();
        if layout.is_empty() {
            return Err(AllocError::RegionTooSmall {
                size: self.total_size,
                min: MIN_REGION_SIZE,
            });
        }
        Ok(layout)
    }
}
