mod common;

use common::{decode, decode_at, entries, valid_table};
use ncount::{BitWriter, NCountEncoder, NormalizedCount};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_ncount_roundtrip((table_log, counts) in valid_table()) {
        let encoder = NCountEncoder::new(table_log).unwrap();
        let bytes = encoder.encode_to_vec(&entries(&counts)).unwrap();

        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(decoded.table_log, table_log);
        prop_assert_eq!(&decoded.counts, &counts);
        prop_assert_eq!(bytes.len(), decoded.end.div_ceil(8));
    }

    #[test]
    fn test_ncount_deterministic((table_log, counts) in valid_table()) {
        let encoder = NCountEncoder::new(table_log).unwrap();
        let table = entries(&counts);
        let first = encoder.encode_to_vec(&table).unwrap();
        let second = encoder.encode_to_vec(&table).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_ncount_ignores_buffer_contents(
        (table_log, counts) in valid_table(),
        fill_byte in any::<u8>(),
    ) {
        let encoder = NCountEncoder::new(table_log).unwrap();
        let table = entries(&counts);
        let expected = encoder.encode_to_vec(&table).unwrap();

        let mut buf = vec![fill_byte; 1024];
        let mut writer = BitWriter::new(&mut buf);
        let plan = encoder.encode(&table, &mut writer).unwrap();
        let len = writer.finish();
        prop_assert_eq!(len, plan.byte_len());
        prop_assert_eq!(&buf[..len], &expected[..]);
    }

    #[test]
    fn test_ncount_range_fields_not_encoded(
        (table_log, counts) in valid_table(),
        range_start in 0u8..64,
        range_span in -1i8..=1,
    ) {
        let encoder = NCountEncoder::new(table_log).unwrap();
        let plain = entries(&counts);
        let ranged: Vec<_> = counts
            .iter()
            .map(|&c| NormalizedCount::with_range(c, range_start, range_span))
            .collect();
        prop_assert_eq!(
            encoder.encode_to_vec(&plain).unwrap(),
            encoder.encode_to_vec(&ranged).unwrap()
        );
    }

    #[test]
    fn test_ncount_after_leading_bits(
        (table_log, counts) in valid_table(),
        lead in 0u32..128,
        lead_bits in 0u32..8,
    ) {
        let lead = lead & ((1 << lead_bits) - 1);
        let mut buf = vec![0u8; 1024];
        let mut writer = BitWriter::new(&mut buf);
        writer.add_bits(lead, lead_bits);
        writer.flush().unwrap();

        let encoder = NCountEncoder::new(table_log).unwrap();
        let plan = encoder.encode(&entries(&counts), &mut writer).unwrap();
        prop_assert_eq!(writer.bits_written(), lead_bits as usize + plan.bit_len);
        writer.finish();

        prop_assert_eq!(u32::from(buf[0]) & ((1 << lead_bits) - 1), lead);
        let decoded = decode_at(&buf, lead_bits as usize).unwrap();
        prop_assert_eq!(decoded.counts, counts);
    }
}
