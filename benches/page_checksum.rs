//! Benchmarks for Ogg page construction.
//!
//! Measures raw CRC throughput and the cost of framing one Opus packet.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::mock::StepRng;
use rtprec::media::ogg::{build_page, PageHeader, PageType, MAX_PAYLOAD_SIZE};
use rtprec::media::{ChecksumTable, ManualClock, OggOptions, OggWriter};

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    let table = ChecksumTable::ogg();

    for size in [64, 1024, 16 * 1024, MAX_PAYLOAD_SIZE] {
        let data: Vec<u8> = (0..size).map(|i| (i * 31) as u8).collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("table_{}", size), |b| {
            b.iter(|| black_box(table.checksum(black_box(&data))));
        });
    }

    group.bench_function("build_table", |b| b.iter(|| black_box(ChecksumTable::ogg())));

    group.finish();
}

fn bench_build_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_page");
    let table = ChecksumTable::ogg();
    let header = PageHeader {
        page_type: PageType::ContinuationOfStream,
        granule_position: 48_000,
        serial: 0x5eed,
        sequence: 50,
    };

    // 20 ms Opus packets at common bitrates, plus a full page
    for size in [80, 160, 320, MAX_PAYLOAD_SIZE] {
        let payload = vec![0xfc; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("payload_{}", size), |b| {
            b.iter(|| black_box(build_page(&table, &header, black_box(&payload)).unwrap()));
        });
    }

    group.finish();
}

fn bench_write_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("ogg_write_data");
    let payload = vec![0xfc; 160];

    group.throughput(Throughput::Elements(50));
    group.bench_function("one_second_of_packets", |b| {
        b.iter(|| {
            let options = OggOptions::new().clock(Arc::new(ManualClock::new(0)));
            let mut writer =
                OggWriter::with_rng(Vec::<u8>::new(), options, &mut StepRng::new(1, 0)).unwrap();
            for i in 0..50u32 {
                writer.write_data(&payload, i * 960).unwrap();
            }
            black_box(writer.finish().unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_checksum, bench_build_page, bench_write_data);
criterion_main!(benches);
