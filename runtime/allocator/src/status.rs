//! Packed status table
//!
//! Every chunk owns a 2-bit code. Four codes share one byte, the first chunk
//! of the group in the least-significant pair:
//!
//! ```text
//!   bit   7 6   5 4   3 2   1 0
//!        [ c3 ][ c2 ][ c1 ][ c0 ]
//! ```
//!
//! Several allocations can live in the same byte, so every write is masked
//! to the chunks it was asked to touch.

use core::fmt;

/// Number of chunk codes packed into one status byte
pub const CHUNKS_PER_STATUS: usize = 4;

const BITS_PER_CHUNK: usize = 2;
const CODE_MASK: u8 = 0b11;

/// Allocation state of a single chunk
///
/// The three non-free values are group tags. They tell release where one
/// block stops and the next begins; they say nothing about block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Free = 0b00,
    TagA = 0b01,
    TagB = 0b10,
    TagC = 0b11,
}

impl Status {
    /// All codes in numeric order
    pub const ALL: [Status; 4] = [Status::Free, Status::TagA, Status::TagB, Status::TagC];

    /// Decode the low two bits of `bits`
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & CODE_MASK {
            0b00 => Status::Free,
            0b01 => Status::TagA,
            0b10 => Status::TagB,
            _ => Status::TagC,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_free(self) -> bool {
        matches!(self, Status::Free)
    }

    /// The code repeated into all four slots of a byte
    #[inline]
    pub const fn replicated(self) -> u8 {
        let code = self as u8;
        code << 6 | code << 4 | code << 2 | code
    }

    pub const fn name(self) -> &'static str {
        match self {
            Status::Free => "FREE",
            Status::TagA => "TAG_A",
            Status::TagB => "TAG_B",
            Status::TagC => "TAG_C",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Mask covering slots `start..=end` of one status byte
#[inline]
const fn span_mask(start: usize, end: usize) -> u8 {
    (0xFFu8 << (start * BITS_PER_CHUNK)) & (0xFFu8 >> ((CHUNKS_PER_STATUS - 1 - end) * BITS_PER_CHUNK))
}

#[inline]
const fn split(chunk: usize) -> (usize, usize) {
    (chunk / CHUNKS_PER_STATUS, chunk % CHUNKS_PER_STATUS)
}

/// 2-bit codec over a byte buffer
///
/// Reads work on any `AsRef<[u8]>`, so a dump loaded from disk decodes the
/// same way as the live table. Writes additionally need `AsMut<[u8]>`.
///
/// Chunk indices are not range-checked beyond slice indexing: passing an
/// index at or past [`StatusTable::len`] panics.
pub struct StatusTable<B> {
    bytes: B,
}

impl<B: AsRef<[u8]>> StatusTable<B> {
    pub fn new(bytes: B) -> Self {
        Self { bytes }
    }

    /// Number of chunks described by the table
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.as_ref().len() * CHUNKS_PER_STATUS
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }

    #[inline]
    pub fn read(&self, chunk: usize) -> Status {
        let (byte, slot) = split(chunk);
        Status::from_bits(self.bytes.as_ref()[byte] >> (slot * BITS_PER_CHUNK))
    }

    /// Like [`StatusTable::read`], `None` past the end
    pub fn get(&self, chunk: usize) -> Option<Status> {
        (chunk < self.len()).then(|| self.read(chunk))
    }

    /// Every code in chunk order
    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        self.bytes.as_ref().iter().flat_map(|&byte| {
            (0..CHUNKS_PER_STATUS).map(move |slot| Status::from_bits(byte >> (slot * BITS_PER_CHUNK)))
        })
    }

    pub fn count_free(&self) -> usize {
        self.iter().filter(|status| status.is_free()).count()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> StatusTable<B> {
    #[inline]
    fn write_masked(&mut self, byte: usize, mask: u8, status: Status) {
        let cell = &mut self.bytes.as_mut()[byte];
        *cell = (*cell & !mask) | (status.replicated() & mask);
    }

    /// Replace one chunk's code, leaving its three neighbours untouched
    #[inline]
    pub fn write_one(&mut self, chunk: usize, status: Status) {
        let (byte, slot) = split(chunk);
        self.write_masked(byte, span_mask(slot, slot), status);
    }

    /// Set every chunk in `first..=last` to `status`
    ///
    /// A run inside one byte gets a single two-sided mask. Longer runs mask
    /// the head and tail bytes and fill the bytes between them whole.
    pub fn write_range(&mut self, first: usize, last: usize, status: Status) {
        debug_assert!(first <= last, "inverted range {first}..={last}");

        let (first_byte, first_slot) = split(first);
        let (last_byte, last_slot) = split(last);

        if first_byte == last_byte {
            self.write_masked(first_byte, span_mask(first_slot, last_slot), status);
            return;
        }

        self.write_masked(first_byte, span_mask(first_slot, CHUNKS_PER_STATUS - 1), status);
        self.bytes.as_mut()[first_byte + 1..last_byte].fill(status.replicated());
        self.write_masked(last_byte, span_mask(0, last_slot), status);
    }

    /// Mark every chunk free
    pub fn clear(&mut self) {
        self.bytes.as_mut().fill(0);
    }
}
