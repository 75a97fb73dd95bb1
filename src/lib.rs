//! # Normalized-Count Headers for tANS
//!
//! *Compact, bit-exact serialization of an entropy coder's probability model.*
//!
//! ## Intuition First
//!
//! A table-based ANS (tANS) coder is driven by a table of `2^L` states shared
//! out among symbols in proportion to their probabilities. The decoder has to
//! rebuild exactly the same table, so the encoder ships the *normalized
//! counts* ahead of the payload.
//!
//! Each count is written knowing how many slots are still unclaimed. Early
//! counts can be large and get a fixed-width field; as the table fills up, the
//! range of possible values shrinks and fields shrink with it.
//!
//! ## The Problem
//!
//! Writing every count in `L + 1` bits is simple but wasteful:
//! - Most tables have a few large counts and a long tail of small ones.
//! - Once most of the table is covered, a count cannot exceed the remainder,
//!   so the high bits of a fixed field carry no information.
//!
//! ## Format
//!
//! ```text
//! 3 bits      L - 5                         (L in 5..=8)
//! 1|2 bits    mode, fixes the field width k0 at L - 1, L + 1 or L - 2
//! per entry   cnt + 1 in k0 bits, or truncated binary over 0..=remaining+1
//! ```
//!
//! Counts of `-1` mark negligible symbols; they take one slot and are written
//! as zero. The list ends once the counts cover all `2^L` slots, so no length
//! field is needed.
//!
//! Truncated binary codes `m` values with `k = floor(log2 m)` or `k + 1`
//! bits: the first `u = 2^(k+1) - m` values take the short form. Because the
//! stream is read least-significant-bit first, long codewords emit their top
//! `k` bits first so a reader can tell the two forms apart.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(n)$ for `n` table entries (one validation pass, one write pass).
//! - **Space**: $O(1)$ beyond the caller's buffer.
//!
//! ## Failure Modes
//!
//! 1. **Malformed tables**: counts that miss or overshoot `2^L`, zero counts,
//!    or tables made only of `-1` entries are rejected before anything is written.
//! 2. **Scratch margin**: every flush stores a whole 32-bit word, so the
//!    destination needs [`BitWriter::MARGIN`] spare bytes past the header.
//!
//! ## References
//!
//! - Duda, J. (2013). "Asymmetric numeral systems: entropy coding combining speed of Huffman coding with compression rate of arithmetic coding."
//! - Collet, Y. "Finite State Entropy" (FSE), normalized-count header.
//! - [Truncated binary encoding](https://en.wikipedia.org/wiki/Truncated_binary_encoding)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod error;
pub mod ncount;

pub use bits::BitWriter;
pub use error::{Error, Mismatch, Result};
pub use ncount::{write_ncount, Field, Mode, NCountEncoder, NormalizedCount, Plan, TableLog};
