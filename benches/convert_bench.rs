//! Benchmarks for binconv.
//!
//! Run with:
//!     cargo bench

use bytes::Bytes;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use futures_util::TryStreamExt;

use binconv::{ConvertOptions, Data, Registry, RepresentationTag};

fn sample(size: usize) -> Vec<u8> {
    // Deterministic pseudo-random data
    (0..size).map(|i| (i * 7 + 13) as u8).collect()
}

fn bench_encodings(c: &mut Criterion) {
    let mut group = c.benchmark_group("encodings");
    let reg = Registry::new();
    let options = ConvertOptions::new();

    for size in [64 * 1024, 1024 * 1024] {
        let data = sample(size);
        let encoded = tokio_test::block_on(reg.convert(
            RepresentationTag::Base64Text,
            Data::byte_array(data.clone()),
            &options,
        ))
        .unwrap();
        let encoded = encoded.as_str().unwrap().to_string();
        let decode = options
            .clone()
            .with_src_string_type(RepresentationTag::Base64Text);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("base64_encode_{}kb", size / 1024), |b| {
            b.iter(|| {
                let out = tokio_test::block_on(reg.convert(
                    RepresentationTag::Base64Text,
                    Data::byte_array(black_box(data.clone())),
                    &options,
                ))
                .unwrap();
                black_box(out)
            });
        });

        group.bench_function(format!("base64_decode_{}kb", size / 1024), |b| {
            b.iter(|| {
                let out = tokio_test::block_on(reg.convert(
                    RepresentationTag::MutableByteArray,
                    Data::text(black_box(encoded.clone())),
                    &decode,
                ))
                .unwrap();
                black_box(out)
            });
        });

        group.bench_function(format!("hex_encode_{}kb", size / 1024), |b| {
            b.iter(|| {
                let out = tokio_test::block_on(reg.convert(
                    RepresentationTag::HexText,
                    Data::byte_array(black_box(data.clone())),
                    &options,
                ))
                .unwrap();
                black_box(out)
            });
        });
    }

    group.finish();
}

fn bench_ranges(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranges");
    let reg = Registry::new();
    let size = 1024 * 1024; // 1 MB
    let chunks: Vec<Bytes> = Bytes::from(sample(size))
        .chunks(16 * 1024)
        .map(Bytes::copy_from_slice)
        .collect();

    // Range in the middle: the source is dropped once it is read
    let middle = ConvertOptions::new().with_range(size as u64 / 2, 4096);
    group.bench_function("stream_middle_4kb", |b| {
        b.iter(|| {
            let source = Data::push(futures_util::stream::iter(
                black_box(chunks.clone()).into_iter().map(Ok::<_, std::io::Error>),
            ));
            let out = tokio_test::block_on(reg.convert(
                RepresentationTag::MutableByteArray,
                source,
                &middle,
            ))
            .unwrap();
            black_box(out)
        });
    });

    // Whole stream, for comparison
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("stream_whole", |b| {
        b.iter(|| {
            let source = Data::push(futures_util::stream::iter(
                black_box(chunks.clone()).into_iter().map(Ok::<_, std::io::Error>),
            ));
            let stream = tokio_test::block_on(reg.convert(
                RepresentationTag::PushStream,
                source,
                &ConvertOptions::new(),
            ))
            .unwrap()
            .into_push()
            .unwrap();
            let out: Vec<Bytes> = tokio_test::block_on(stream.try_collect()).unwrap();
            black_box(out.len())
        });
    });

    // Zero-copy buffer slice
    let buffer = Bytes::from(sample(size));
    group.bench_function("buffer_slice", |b| {
        b.iter(|| {
            let out = tokio_test::block_on(reg.convert(
                RepresentationTag::FixedByteBuffer,
                Data::Buffer(black_box(buffer.clone())),
                &middle,
            ))
            .unwrap();
            black_box(out)
        });
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let reg = Registry::new();
    let options = ConvertOptions::new();
    let size = 1024 * 1024; // 1 MB

    for pieces in [16, 256] {
        let parts: Vec<Vec<u8>> = sample(size)
            .chunks(size / pieces)
            .map(<[u8]>::to_vec)
            .collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("byte_arrays_{pieces}"), |b| {
            b.iter(|| {
                let chunks = black_box(parts.clone()).into_iter().map(Data::ByteArray).collect();
                let out = tokio_test::block_on(reg.merge(
                    RepresentationTag::MutableByteArray,
                    chunks,
                    &options,
                ))
                .unwrap();
                black_box(out)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encodings, bench_ranges, bench_merge);
criterion_main!(benches);
