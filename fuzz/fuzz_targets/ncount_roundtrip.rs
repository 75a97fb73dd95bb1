#![no_main]
use libfuzzer_sys::fuzz_target;
use ncount::{BitWriter, Error, NCountEncoder, NormalizedCount};

fuzz_target!(|data: (u8, Vec<i16>)| {
    let (log, cnts) = data;
    let table_log = u32::from(log % 6) + 4; // 4..=9, includes invalid logs
    let table: Vec<NormalizedCount> = cnts.into_iter().map(NormalizedCount::new).collect();

    let encoder = match NCountEncoder::new(table_log) {
        Ok(encoder) => encoder,
        Err(e) => {
            assert_eq!(e, Error::InvalidTableLog(table_log));
            return;
        }
    };

    let Ok(plan) = encoder.plan(&table) else {
        assert!(encoder.encode_to_vec(&table).is_err());
        return;
    };

    let bytes = encoder.encode_to_vec(&table).unwrap();
    assert_eq!(bytes.len(), plan.byte_len());

    // Exactly the planned capacity must be enough.
    let mut buf = vec![0u8; plan.required_capacity(0)];
    let mut writer = BitWriter::new(&mut buf);
    encoder.encode(&table, &mut writer).unwrap();
    assert_eq!(writer.bits_written(), plan.bit_len);
    let len = writer.finish();
    assert_eq!(&buf[..len], &bytes[..]);
});
