//! Least-significant-bit-first writer over a caller-owned buffer.
//!
//! Bits accumulate in a 32-bit register. Each flush stores the whole
//! register as a little-endian word at the cursor, then advances the cursor
//! over the completed bytes only, so the partial byte is rewritten by the
//! next flush. Up to [`BitWriter::MARGIN`] bytes past the logical end of the
//! output may therefore be overwritten.

use crate::error::{Error, Result};

/// Bit accumulator writing into a pre-allocated byte buffer.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    /// Next byte to be written; with `fill > 0` it holds the partial byte.
    pos: usize,
    reg: u32,
    /// Valid bits in `reg`. At most 7 right after a flush.
    fill: u32,
}

impl<'a> BitWriter<'a> {
    /// Width of the accumulation register.
    pub const REGISTER_BITS: u32 = u32::BITS;

    /// Scratch bytes a flush may write past the cursor.
    pub const MARGIN: usize = (u32::BITS / 8) as usize;

    /// Create a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            reg: 0,
            fill: 0,
        }
    }

    /// Append the low `width` bits of `value` above the bits already held.
    ///
    /// Preconditions are only checked in debug builds; use
    /// [`try_add_bits`](Self::try_add_bits) for untrusted input.
    #[inline]
    pub fn add_bits(&mut self, value: u32, width: u32) {
        debug_assert!(width <= Self::REGISTER_BITS - self.fill);
        debug_assert!(u64::from(value) < 1u64 << width);
        if width == 0 {
            return;
        }
        self.reg |= value << self.fill;
        self.fill += width;
    }

    /// Checked variant of [`add_bits`](Self::add_bits).
    ///
    /// # Errors
    /// Returns `Error::ValueTooWide` if `value` needs more than `width` bits and
    /// `Error::RegisterOverflow` if the register cannot take `width` more bits.
    pub fn try_add_bits(&mut self, value: u32, width: u32) -> Result<()> {
        if width > Self::REGISTER_BITS - self.fill {
            return Err(Error::RegisterOverflow {
                fill: self.fill,
                width,
            });
        }
        if u64::from(value) >= 1u64 << width {
            return Err(Error::ValueTooWide { value, width });
        }
        self.add_bits(value, width);
        Ok(())
    }

    /// Store the register at the cursor and advance over completed bytes.
    ///
    /// Always writes a full register width. The remaining `fill % 8` bits
    /// stay in the register and are rewritten by the next flush.
    ///
    /// # Errors
    /// Returns `Error::BufferTooSmall` if fewer than [`MARGIN`](Self::MARGIN)
    /// bytes remain at the cursor; nothing is written in that case.
    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        let available = self.buf.len();
        let dst = self
            .buf
            .get_mut(self.pos..self.pos + Self::MARGIN)
            .ok_or(Error::BufferTooSmall {
                needed: self.pos + Self::MARGIN,
                available,
            })?;
        dst.copy_from_slice(&self.reg.to_le_bytes());

        let nbytes = self.fill / 8;
        self.pos += nbytes as usize;
        self.reg = self.reg.checked_shr(nbytes * 8).unwrap_or(0);
        self.fill &= 7;
        Ok(())
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bits currently held in the register.
    pub fn fill(&self) -> u32 {
        self.fill
    }

    /// Raw register contents.
    pub fn register(&self) -> u32 {
        self.reg
    }

    /// Total bits appended since the start of the buffer.
    pub fn bits_written(&self) -> usize {
        self.pos * 8 + self.fill as usize
    }

    /// Number of bytes spanned by the output, counting a trailing partial byte.
    ///
    /// Bits added since the last flush are not in the buffer; flush first.
    pub fn finish(self) -> usize {
        self.pos + usize::from(self.fill > 0)
    }
}
