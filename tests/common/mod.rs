//! Reference decoder for normalized-count headers.

#![allow(dead_code)]

use ncount::NormalizedCount;
use proptest::prelude::*;

/// LSB-first bit reader.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], bit: usize) -> Self {
        Self { data, bit }
    }

    pub fn read(&mut self, width: u32) -> Option<u32> {
        let mut v = 0u32;
        for i in 0..width {
            let byte = *self.data.get(self.bit / 8)?;
            v |= u32::from((byte >> (self.bit % 8)) & 1) << i;
            self.bit += 1;
        }
        Some(v)
    }

    pub fn position(&self) -> usize {
        self.bit
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Decoded {
    pub table_log: u32,
    pub k0: u32,
    pub counts: Vec<i16>,
    /// Bit position just past the last entry.
    pub end: usize,
}

fn highbit(x: u32) -> u32 {
    31 - x.leading_zeros()
}

/// Parse a header starting `start` bits into `data`.
pub fn decode_at(data: &[u8], start: usize) -> Option<Decoded> {
    let mut r = BitReader::new(data, start);
    let table_log = r.read(3)? + 5;
    let k0 = if r.read(1)? == 1 {
        table_log - 1
    } else if r.read(1)? == 0 {
        table_log + 1
    } else {
        table_log - 2
    };
    let n0 = (1u32 << k0) - 1;

    let mut deficit = 1u32 << table_log;
    let mut counts = Vec::new();
    while deficit > 0 {
        let n = deficit + 1;
        let x = if n < n0 {
            let m = n + 1;
            let k = highbit(m);
            let u = (1 << (k + 1)) - m;
            let prefix = r.read(k)?;
            if prefix < u {
                prefix
            } else {
                ((prefix << 1) | r.read(1)?) - u
            }
        } else {
            r.read(k0)?
        };
        let cnt = x as i32 - 1;
        let coverage = match cnt {
            0 => return None,
            -1 => 1,
            c => c as u32,
        };
        if coverage > deficit {
            return None;
        }
        deficit -= coverage;
        counts.push(cnt as i16);
    }

    Some(Decoded {
        table_log,
        k0,
        counts,
        end: r.position(),
    })
}

pub fn decode(data: &[u8]) -> Option<Decoded> {
    decode_at(data, 0)
}

pub fn entries(cnts: &[i16]) -> Vec<NormalizedCount> {
    cnts.iter().copied().map(NormalizedCount::new).collect()
}

/// Random valid table: `(table_log, counts)` with at least one positive count
/// and an arbitrary mix of `-1` sentinels.
pub fn valid_table() -> impl Strategy<Value = (u32, Vec<i16>)> {
    (5u32..=8)
        .prop_flat_map(|log| {
            let size = 1i32 << log;
            (
                Just(log),
                1..=size,
                prop::collection::vec(prop_oneof![Just(-1i16), 1i16..=300], 0..80),
                any::<prop::sample::Index>(),
            )
        })
        .prop_map(|(log, first, wants, at)| {
            let size = 1i32 << log;
            let mut remaining = size - first;
            let mut counts = Vec::new();
            for want in wants {
                if remaining == 0 {
                    break;
                }
                let c = if want < 0 { -1 } else { i32::from(want).min(remaining) };
                remaining -= c.abs();
                counts.push(c as i16);
            }
            if remaining > 0 {
                counts.push(remaining as i16);
            }
            counts.insert(at.index(counts.len() + 1), first as i16);
            (log, counts)
        })
}
