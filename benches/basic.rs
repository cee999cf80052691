use criterion::{criterion_group, criterion_main, Criterion};
use port_channel::channel::normalize_line_endings;
use port_channel::{AsciiEncoder, ByteEncoder, Utf8Encoder};
use std::hint::black_box;
use std::time::Duration;

const SAMPLE: &str = "+CSQ: 23,99\r\r\nOK\r\n";

pub fn bench_encode(c: &mut Criterion) {
    c.bench_function("ascii_encode", |b| {
        b.iter(|| black_box(AsciiEncoder.encode(black_box(SAMPLE))))
    });
    c.bench_function("utf8_encode", |b| {
        b.iter(|| black_box(Utf8Encoder.encode(black_box(SAMPLE))))
    });
}

pub fn bench_decode(c: &mut Criterion) {
    let mut buffer = vec![0u8; 4096];
    buffer[..SAMPLE.len()].copy_from_slice(SAMPLE.as_bytes());
    c.bench_function("decode_and_normalize", |b| {
        b.iter(|| {
            let text = AsciiEncoder.decode_ascii(black_box(&buffer), SAMPLE.len());
            black_box(normalize_line_endings(&text))
        })
    });
}

criterion_group!{
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_encode, bench_decode
}
criterion_main!(benches);
