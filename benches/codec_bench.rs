#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use radio_codeplug::core::channel::{Channel, RecordKind};
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::layout::{CHANNEL_COUNT, CHANNEL_LEN, IMAGE_SIZE, PAGE_SIZE};
use radio_codeplug::core::zones::{normalize, set_channel_valid, ValidityBitmap};
use radio_codeplug::utils::cipher::SeedCipher;

fn populated_image() -> MemoryImage {
    let mut image = MemoryImage::zeroed();
    ValidityBitmap::default().write(&mut image);
    for n in (1..=CHANNEL_COUNT as u16).step_by(3) {
        set_channel_valid(&mut image, n, true);
    }
    image
}

fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_cipher");
    let cipher = SeedCipher::new(0x5A);

    for size in [PAGE_SIZE, IMAGE_SIZE] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("apply_{size}b"), |b| {
            b.iter_batched(
                || vec![0xA5u8; size],
                |mut buf| cipher.apply(&mut buf),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_channel_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_codec");
    let channel = Channel::simplex("Repeater", 439_500_000);
    let base = [0u8; CHANNEL_LEN];
    let record = channel.to_record(&base, RecordKind::Memory).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| channel.to_record(&base, RecordKind::Memory).unwrap())
    });
    group.bench_function("decode", |b| {
        b.iter(|| Channel::from_record(&record, RecordKind::Memory))
    });
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("zones");
    group.bench_function("normalize_scrambled", |b| {
        b.iter_batched(populated_image, |mut image| normalize(&mut image), BatchSize::SmallInput)
    });
    group.bench_function("normalize_clean", |b| {
        let mut image = populated_image();
        normalize(&mut image);
        b.iter(|| normalize(&mut image))
    });
    group.finish();
}

criterion_group!(benches, bench_cipher, bench_channel_codec, bench_normalize);
criterion_main!(benches);
