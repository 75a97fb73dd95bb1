//! Error types for normalized-count serialization.

use thiserror::Error;

/// Error variants for header encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Table log outside the supported 5..=8 range.
    #[error("invalid table log: {0} (expected 5..=8)")]
    InvalidTableLog(u32),

    /// An entry carries a count that cannot appear in a normalized table
    /// (zero, or negative other than the `-1` sentinel).
    #[error("invalid count {cnt} at entry {index}")]
    InvalidCount {
        /// Position of the offending entry.
        index: usize,
        /// The rejected count.
        cnt: i16,
    },

    /// The entries do not cover the table exactly.
    #[error("coverage mismatch: {0}")]
    CoverageMismatch(Mismatch),

    /// The destination cannot hold the header plus the flush margin.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required, including the trailing flush margin.
        needed: usize,
        /// Bytes available in the destination.
        available: usize,
    },

    /// A value does not fit in the requested number of bits.
    #[error("value {value} does not fit in {width} bits")]
    ValueTooWide {
        /// The value passed to the writer.
        value: u32,
        /// The requested width.
        width: u32,
    },

    /// Appending would run past the 32-bit register.
    #[error("register overflow: {fill} bits held, {width} more requested")]
    RegisterOverflow {
        /// Bits currently held in the register.
        fill: u32,
        /// The requested width.
        width: u32,
    },
}

/// Ways a count array can fail to cover `2^tableLog` slots.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// The entries ran out before reaching full coverage.
    #[error("entries cover {covered} of {expected} slots")]
    Short {
        /// Slots covered by all supplied entries.
        covered: u32,
        /// Table size.
        expected: u32,
    },

    /// An entry pushed coverage past the table size.
    #[error("entry {index} overshoots: {covered} of {expected} slots")]
    Overshoot {
        /// Position of the entry that overshot.
        index: usize,
        /// Coverage after that entry.
        covered: u32,
        /// Table size.
        expected: u32,
    },

    /// Every covering entry is the `-1` sentinel.
    #[error("no entry has a positive count")]
    NoPositiveCount,
}

/// A specialized Result type for header encoding.
pub type Result<T> = std::result::Result<T, Error>;
