//! Paged grid rendering of a status dump

use std::ops::Range;

use chunk_allocator::{StatusTable, CHUNKS_PER_STATUS};

use crate::tui::{cursor, screen, style, Color};

/// Position within a dump, one page of status bytes at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    page_size: usize,
    start: usize,
}

impl Pager {
    /// `page_size` is clamped to at least one status byte
    pub fn new(len: usize, page_size: usize) -> Self {
        Self {
            len,
            page_size: page_size.max(1),
            start: 0,
        }
    }

    /// Advance one page if there is anything after the current one
    pub fn next(&mut self) {
        if self.start + self.page_size < self.len {
            self.start += self.page_size;
        }
    }

    /// Step back one page unless already on the first
    pub fn prev(&mut self) {
        if self.start >= self.page_size {
            self.start -= self.page_size;
        }
    }

    /// 1-based number of the current page
    pub fn page(&self) -> usize {
        self.start / self.page_size + 1
    }

    pub fn page_count(&self) -> usize {
        self.len.div_ceil(self.page_size).max(1)
    }

    /// Status byte indices shown on the current page
    pub fn range(&self) -> Range<usize> {
        self.start..(self.start + self.page_size).min(self.len)
    }
}

/// Build one full frame: header, coloured cells and the help line
///
/// Each status byte becomes four cells showing its codes in chunk order.
/// A line break follows every `columns` status bytes.
pub fn render_page(data: &[u8], pager: &Pager, columns: usize) -> String {
    let columns = columns.max(1);
    let mut out = String::new();

    screen::clear(&mut out);
    cursor::home(&mut out);
    out.push_str("Status Viewer\n");
    out.push_str(&format!("Page: {} / {}\n\n", pager.page(), pager.page_count()));

    let page = StatusTable::new(&data[pager.range()]);
    for (idx, status) in page.iter().enumerate() {
        style::bg(&mut out, Color::for_status(status));
        out.push_str(&format!(" {} ", status.bits()));
        style::reset(&mut out);

        let bytes_done = idx / CHUNKS_PER_STATUS + 1;
        if idx % CHUNKS_PER_STATUS == CHUNKS_PER_STATUS - 1 && bytes_done % columns == 0 {
            out.push('\n');
        }
    }

    out.push_str("\nUse Left/Right arrows to navigate, 'q' to quit.\n");
    out
}
