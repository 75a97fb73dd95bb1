//! Normalized-count table serialization.
//!
//! A header is laid out least-significant-bit first:
//!
//! ```text
//! 3 bits      tableLog - 5
//! 1|2 bits    mode: `1` exact, `00` overflow, `10` underflow (first bit read first)
//! per entry   cnt + 1, fixed k0 bits or truncated binary in k / k+1 bits
//! ```
//!
//! Entries are consumed until their absolute counts add up to `2^tableLog`;
//! whatever follows in the slice is never read.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::bits::BitWriter;
use crate::error::{Error, Mismatch, Result};

/// Bits used to store `tableLog - TableLog::MIN`.
const TABLE_LOG_BITS: u32 = 3;

/// One symbol's entry in a normalized table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NormalizedCount {
    /// Normalized count. `-1` marks a negligible symbol that still takes one
    /// slot. Zero never appears; such symbols are left out of the table.
    pub cnt: i16,
    /// Start of the symbol's value range or half-range, 0..=63. The ranges
    /// are `[0], [1], [2|3], [4-5|6-7], [8-11|12-15], ...`. Not encoded here.
    pub range_start: u8,
    /// Span of that range: -1 half-range, 0 single range, 1 double range.
    /// Not encoded here.
    pub range_span: i8,
}

impl NormalizedCount {
    /// The `-1` sentinel entry.
    pub const NEGLIGIBLE: Self = Self::new(-1);

    /// Entry with the given count and an empty range.
    pub const fn new(cnt: i16) -> Self {
        Self::with_range(cnt, 0, 0)
    }

    /// Entry carrying range classification alongside the count.
    pub const fn with_range(cnt: i16, range_start: u8, range_span: i8) -> Self {
        Self {
            cnt,
            range_start,
            range_span,
        }
    }

    /// Table slots this entry accounts for.
    #[inline]
    pub fn coverage(&self) -> u32 {
        u32::from(self.cnt.unsigned_abs())
    }
}

/// Validated log2 of the table size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableLog(u32);

impl TableLog {
    /// Smallest supported table log (32 states).
    pub const MIN: u32 = 5;
    /// Largest supported table log (256 states).
    pub const MAX: u32 = 8;

    /// Validate a raw table log.
    ///
    /// # Errors
    /// Returns `Error::InvalidTableLog` outside `MIN..=MAX`.
    pub fn new(log: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&log) {
            Ok(Self(log))
        } else {
            Err(Error::InvalidTableLog(log))
        }
    }

    /// The raw table log.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of table states, `2^log`.
    pub fn table_size(self) -> u32 {
        1 << self.0
    }
}

impl TryFrom<u32> for TableLog {
    type Error = Error;

    fn try_from(log: u32) -> Result<Self> {
        Self::new(log)
    }
}

/// A value and the number of low bits it occupies in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Bits to emit, already rebiased and arranged for LSB-first output.
    pub value: u32,
    /// Number of bits.
    pub width: u32,
}

impl Field {
    const fn new(value: u32, width: u32) -> Self {
        Self { value, width }
    }
}

/// How the fixed field width `k0` relates to the table log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// `k0 == tableLog - 1`.
    Exact,
    /// Largest count needs more than `tableLog - 1` bits; `k0 = tableLog + 1`.
    Overflow,
    /// Largest count fits in fewer bits; `k0 = tableLog - 2`.
    Underflow,
}

impl Mode {
    /// Pick the mode for a table whose largest count is `max_cnt` (> 0).
    pub fn select(max_cnt: u16, table_log: TableLog) -> Self {
        let k0 = highbit(u32::from(max_cnt) + 1) + 1;
        match k0.cmp(&(table_log.get() - 1)) {
            Ordering::Equal => Mode::Exact,
            Ordering::Greater => Mode::Overflow,
            Ordering::Less => Mode::Underflow,
        }
    }

    /// Selector bits as written to the stream.
    pub fn code(self) -> Field {
        match self {
            Mode::Exact => Field::new(1, 1),
            Mode::Overflow => Field::new(0, 2),
            Mode::Underflow => Field::new(2, 2),
        }
    }

    /// Width of the fixed-size field under this mode.
    pub fn k0(self, table_log: TableLog) -> u32 {
        let log = table_log.get();
        match self {
            Mode::Exact => log - 1,
            Mode::Overflow => log + 1,
            Mode::Underflow => log - 2,
        }
    }
}

/// Outcome of the validation pass: what will be written and how long it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    /// Table log the header declares.
    pub table_log: TableLog,
    /// Entries consumed before coverage reached the table size.
    pub len: usize,
    /// Largest raw count among consumed entries.
    pub max_cnt: i16,
    /// Selected mode.
    pub mode: Mode,
    /// Effective fixed field width.
    pub k0: u32,
    /// Exact header length in bits.
    pub bit_len: usize,
}

impl Plan {
    fn new(entries: &[NormalizedCount], table_log: TableLog) -> Result<Self> {
        let expected = table_log.table_size();
        let mut covered = 0u32;
        let mut max_cnt = i16::MIN;
        let mut len = None;

        for (index, entry) in entries.iter().enumerate() {
            if entry.cnt == 0 || entry.cnt < -1 {
                debug!("ncount: rejecting count {} at entry {}", entry.cnt, index);
                return Err(Error::InvalidCount {
                    index,
                    cnt: entry.cnt,
                });
            }
            max_cnt = max_cnt.max(entry.cnt);
            covered += entry.coverage();
            match covered.cmp(&expected) {
                Ordering::Less => {}
                Ordering::Equal => {
                    len = Some(index + 1);
                    break;
                }
                Ordering::Greater => {
                    debug!("ncount: entry {} overshoots {} slots", index, expected);
                    return Err(Error::CoverageMismatch(Mismatch::Overshoot {
                        index,
                        covered,
                        expected,
                    }));
                }
            }
        }

        let Some(len) = len else {
            debug!("ncount: entries cover {} of {} slots", covered, expected);
            return Err(Error::CoverageMismatch(Mismatch::Short { covered, expected }));
        };
        if max_cnt <= 0 {
            debug!("ncount: no positive count among {} entries", len);
            return Err(Error::CoverageMismatch(Mismatch::NoPositiveCount));
        }

        let mode = Mode::select(max_cnt.unsigned_abs(), table_log);
        let k0 = mode.k0(table_log);
        let body: usize = Fields::new(&entries[..len], expected, k0)
            .map(|f| f.width as usize)
            .sum();

        Ok(Self {
            table_log,
            len,
            max_cnt,
            mode,
            k0,
            bit_len: (TABLE_LOG_BITS + mode.code().width) as usize + body,
        })
    }

    /// Header length rounded up to whole bytes.
    pub fn byte_len(&self) -> usize {
        self.bit_len.div_ceil(8)
    }

    /// Buffer length needed to write the header after `start_bits` already
    /// written bits, including the flush margin.
    pub fn required_capacity(&self, start_bits: usize) -> usize {
        (start_bits + self.bit_len) / 8 + BitWriter::MARGIN
    }
}

/// Serializes normalized-count tables for one table log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NCountEncoder {
    table_log: TableLog,
}

impl NCountEncoder {
    /// Create an encoder for tables of `2^table_log` states.
    ///
    /// # Errors
    /// Returns `Error::InvalidTableLog` if `table_log` is outside 5..=8.
    pub fn new(table_log: u32) -> Result<Self> {
        Ok(Self {
            table_log: TableLog::new(table_log)?,
        })
    }

    /// The table log this encoder writes.
    pub fn table_log(&self) -> TableLog {
        self.table_log
    }

    /// Validate `entries` and size the header without writing anything.
    ///
    /// # Errors
    /// `Error::InvalidCount` or `Error::CoverageMismatch` for malformed tables.
    pub fn plan(&self, entries: &[NormalizedCount]) -> Result<Plan> {
        Plan::new(entries, self.table_log)
    }

    /// Write the header for `entries` into `writer`.
    ///
    /// The writer may already hold bits from earlier output; it is left
    /// positioned right after the last entry. Nothing is written on error.
    ///
    /// # Errors
    /// Table validation errors as in [`plan`](Self::plan), plus
    /// `Error::BufferTooSmall` and `Error::RegisterOverflow` when the writer
    /// cannot take the header.
    pub fn encode(
        &self,
        entries: &[NormalizedCount],
        writer: &mut BitWriter<'_>,
    ) -> Result<Plan> {
        let plan = self.plan(entries)?;
        self.write(&plan, entries, writer)?;
        Ok(plan)
    }

    /// Encode into a fresh buffer trimmed to the header's byte length.
    ///
    /// # Errors
    /// Table validation errors as in [`plan`](Self::plan).
    pub fn encode_to_vec(&self, entries: &[NormalizedCount]) -> Result<Vec<u8>> {
        let plan = self.plan(entries)?;
        let mut buf = vec![0u8; plan.required_capacity(0)];
        let mut writer = BitWriter::new(&mut buf);
        self.write(&plan, entries, &mut writer)?;
        let len = writer.finish();
        buf.truncate(len);
        Ok(buf)
    }

    fn write(
        &self,
        plan: &Plan,
        entries: &[NormalizedCount],
        writer: &mut BitWriter<'_>,
    ) -> Result<()> {
        let code = plan.mode.code();

        // Header bits share the register with the first field.
        let head = TABLE_LOG_BITS + code.width + plan.k0;
        if head > BitWriter::REGISTER_BITS - writer.fill() {
            return Err(Error::RegisterOverflow {
                fill: writer.fill(),
                width: head,
            });
        }
        let needed = plan.required_capacity(writer.bits_written());
        if needed > writer.capacity() {
            return Err(Error::BufferTooSmall {
                needed,
                available: writer.capacity(),
            });
        }

        writer.add_bits(self.table_log.get() - TableLog::MIN, TABLE_LOG_BITS);
        writer.add_bits(code.value, code.width);

        let fields = Fields::new(&entries[..plan.len], self.table_log.table_size(), plan.k0);
        for (index, field) in fields.enumerate() {
            trace!("ncount: entry {} -> {:#x}/{}", index, field.value, field.width);
            writer.add_bits(field.value, field.width);
            writer.flush()?;
        }

        debug!(
            "ncount: table_log={} entries={} mode={:?} k0={} bits={}",
            self.table_log.get(),
            plan.len,
            plan.mode,
            plan.k0,
            plan.bit_len
        );
        Ok(())
    }
}

/// Serialize `entries` for a table of `2^table_log` states into `writer`.
///
/// # Errors
/// See [`NCountEncoder::new`] and [`NCountEncoder::encode`].
pub fn write_ncount(
    entries: &[NormalizedCount],
    table_log: u32,
    writer: &mut BitWriter<'_>,
) -> Result<Plan> {
    NCountEncoder::new(table_log)?.encode(entries, writer)
}

/// Per-entry fields in stream order. Expects entries already validated and
/// cut at the covering point.
struct Fields<'a> {
    entries: std::slice::Iter<'a, NormalizedCount>,
    deficit: u32,
    k0: u32,
}

impl<'a> Fields<'a> {
    fn new(entries: &'a [NormalizedCount], table_size: u32, k0: u32) -> Self {
        Self {
            entries: entries.iter(),
            deficit: table_size,
            k0,
        }
    }
}

impl Iterator for Fields<'_> {
    type Item = Field;

    fn next(&mut self) -> Option<Field> {
        if self.deficit == 0 {
            return None;
        }
        let entry = self.entries.next()?;
        // -1 maps to 0
        let x = (i32::from(entry.cnt) + 1) as u32;
        let field = entry_field(x, self.deficit + 1, self.k0);
        self.deficit -= entry.coverage();
        Some(field)
    }
}

/// Field for value `x` when at most `n` can still occur (`x <= n`).
///
/// Below the `2^k0 - 1` threshold this is truncated binary over `0..=n`:
/// `x < u` takes `k` bits, otherwise `x + u` takes `k + 1` bits. Long codes
/// are rotated so their top `k` bits come out first; a reader sees a `k`-bit
/// prefix `>= u` and knows to take one more bit.
fn entry_field(x: u32, n: u32, k0: u32) -> Field {
    let n0 = (1 << k0) - 1;
    if n >= n0 {
        return Field::new(x, k0);
    }
    let m = n + 1;
    let k = highbit(m);
    let u = (1 << (k + 1)) - m;
    debug_assert!(k < k0);
    if x < u {
        Field::new(x, k)
    } else {
        let c = x + u;
        Field::new((c >> 1) | ((c & 1) << k), k + 1)
    }
}

/// Index of the highest set bit; `x` must be non-zero.
#[inline]
fn highbit(x: u32) -> u32 {
    31 - x.leading_zeros()
}
