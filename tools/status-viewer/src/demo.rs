//! Reference allocate/release run that produces a status dump

use std::path::Path;

use anyhow::{ensure, Context, Result};
use chunk_allocator::{dump, ChunkAllocator, Handle, RegionConfig, Status};
use colored::Colorize;

fn allocate<S>(alloc: &mut ChunkAllocator<S>, size: usize, expected: usize) -> Result<Handle>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    let handle = alloc
        .allocate(size)
        .with_context(|| format!("Allocation of {} bytes failed", size))?;
    ensure!(
        handle.offset() == expected,
        "allocate({}) returned offset {}, expected {}",
        size,
        handle.offset(),
        expected
    );

    let tag = alloc.status(handle.chunk_index()).unwrap_or(Status::Free);
    println!(
        "  {} allocate({:>3}) -> offset {:>4} {}",
        "✓".green(),
        size,
        handle.offset(),
        tag.to_string().bold()
    );
    Ok(handle)
}

fn release<S>(alloc: &mut ChunkAllocator<S>, handle: Handle) -> Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    alloc
        .release(handle)
        .with_context(|| format!("Release of offset {} failed", handle.offset()))?;
    println!("  {} release(offset {:>4})", "✓".green(), handle.offset());
    Ok(())
}

/// Replay the reference sequence, checking every placement
pub fn replay<S>(alloc: &mut ChunkAllocator<S>) -> Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    let first = allocate(alloc, 8, 0)?;
    let second = allocate(alloc, 70, 8)?;
    let third = allocate(alloc, 80, 80)?;

    release(alloc, second)?;
    ensure!(alloc.status(1) == Some(Status::Free), "chunk 1 still in use after release");

    let again = allocate(alloc, 70, 8)?;
    release(alloc, again)?;

    allocate(alloc, 20, 8)?;
    release(alloc, first)?;
    release(alloc, third)?;

    allocate(alloc, 80, 32)?;
    ensure!(alloc.used_chunks() == 3 + 10, "unexpected chunk usage {}", alloc.used_chunks());
    Ok(())
}

/// Build a region, replay the sequence and save its status table to `out`
pub fn run(region: &RegionConfig, out: &Path) -> Result<()> {
    let layout = region.validate()?;
    println!(
        "{} Replaying reference sequence on a {}-byte region ({} chunks)",
        "▶".cyan(),
        layout.total_size(),
        layout.chunk_count()
    );

    let mut alloc = ChunkAllocator::new(vec![0u8; layout.total_size()])?;
    replay(&mut alloc)?;

    dump::save_status(&alloc, out)
        .with_context(|| format!("Failed to write status dump {}", out.display()))?;

    println!(
        "{} {} status bytes written to {} ({} of {} chunks in use)",
        "✅".green(),
        alloc.status_bytes().len(),
        out.display().to_string().bold(),
        alloc.used_chunks(),
        alloc.chunk_count()
    );
    Ok(())
}
