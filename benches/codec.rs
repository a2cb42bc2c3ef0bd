//! Criterion benchmarks for the POCKET+ compress/decompress API.
//!
//! Run with:
//!   cargo bench --bench codec

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pocketplus::{compress, decompress};

/// Synthetic housekeeping stream: `num_packets` packets of `packet_size`
/// bytes, each packet a small perturbation of the previous one so the mask
/// stabilizes quickly, the way real telemetry does after a few samples.
fn synthetic_stream(packet_size: usize, num_packets: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(packet_size * num_packets);
    let mut packet = vec![0u8; packet_size];
    for t in 0..num_packets {
        packet[t % packet_size] = packet[t % packet_size].wrapping_add(1);
        out.extend_from_slice(&packet);
    }
    out
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for &(packet_size, num_packets) in &[(90usize, 256usize), (256, 256)] {
        let data = synthetic_stream(packet_size, num_packets);
        let packet_bits = packet_size * 8;

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("compress", format!("{packet_size}x{num_packets}")),
            &data,
            |b, data| {
                b.iter(|| compress(data, packet_bits, 1, 10, 20, 50).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for &(packet_size, num_packets) in &[(90usize, 256usize), (256, 256)] {
        let data = synthetic_stream(packet_size, num_packets);
        let packet_bits = packet_size * 8;
        let compressed = compress(&data, packet_bits, 1, 10, 20, 50).unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("decompress", format!("{packet_size}x{num_packets}")),
            &compressed,
            |b, compressed| {
                b.iter(|| decompress(compressed, packet_bits, 1).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
