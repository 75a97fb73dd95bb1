use ncount::{BitWriter, NCountEncoder, NormalizedCount};

fn main() {
    let tables: Vec<(u32, Vec<NormalizedCount>)> = (5..=8u32)
        .map(|log| {
            let size = 1i16 << log;
            let mut cnts = vec![size / 2, size / 4, size / 8];
            let rest = size - size / 2 - size / 4 - size / 8;
            cnts.extend(std::iter::repeat(-1).take(rest as usize / 2));
            cnts.extend(std::iter::repeat(1).take((rest - rest / 2) as usize));
            (log, cnts.into_iter().map(NormalizedCount::new).collect())
        })
        .collect();

    let mut buf = vec![0u8; 1024];
    for _ in 0..1_000_000 {
        for (log, table) in &tables {
            let encoder = NCountEncoder::new(*log).unwrap();
            let mut writer = BitWriter::new(&mut buf);
            encoder.encode(table, &mut writer).unwrap();
            std::hint::black_box(writer.finish());
        }
    }
}
