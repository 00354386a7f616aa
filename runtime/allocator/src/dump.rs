//! Status table export
//!
//! A dump is the status table verbatim: one byte per four chunks, no
//! header. `status-viewer` reads these files back.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::vec::Vec;

use crate::region::ChunkAllocator;

/// Write the raw status table to `writer`
pub fn write_status<S, W>(allocator: &ChunkAllocator<S>, mut writer: W) -> io::Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
    W: Write,
{
    writer.write_all(allocator.status_bytes())?;
    writer.flush()
}

/// Write the raw status table to a file, replacing it if present
pub fn save_status<S, P>(allocator: &ChunkAllocator<S>, path: P) -> io::Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    fs::write(path, allocator.status_bytes())?;
    log::debug!(
        "status dump: {} bytes -> {}",
        allocator.status_bytes().len(),
        path.display()
    );
    Ok(())
}

/// Read a dump written by [`save_status`]
pub fn load_status<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    fs::read(path)
}
