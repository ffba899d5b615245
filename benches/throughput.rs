use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inmem_pipe::pipe;
use std::io::{Read, Write};
use std::thread;

const BYTES_PER_RUN: u64 = 64 * 1024 * 1024; // 64 MiB per benchmark iteration
const CHUNK_SIZE: usize = 4096;

fn bench_spsc_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_pipe");
    group.throughput(Throughput::Bytes(BYTES_PER_RUN));

    group.bench_function("blocking_byte_pipe", |b| {
        b.iter(|| {
            let (mut writer, mut reader) = pipe(64 * 1024).unwrap();

            let producer = thread::spawn(move || {
                let chunk = vec![0xABu8; CHUNK_SIZE];
                let mut sent = 0u64;
                while sent < BYTES_PER_RUN {
                    let want = CHUNK_SIZE.min((BYTES_PER_RUN - sent) as usize);
                    writer.write_all(&chunk[..want]).unwrap();
                    sent += want as u64;
                }
                writer.close();
            });

            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut received = 0u64;
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        black_box(&buf[..n]);
                        received += n as u64;
                    }
                    Err(e) => panic!("unexpected read error: {e}"),
                }
            }
            producer.join().unwrap();
            black_box(received);
        });
    });

    group.finish();
}

fn bench_capacity_sensitivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_pipe_capacity");
    group.throughput(Throughput::Bytes(BYTES_PER_RUN));

    for capacity in [256usize, 4096, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let (mut writer, mut reader) = pipe(capacity).unwrap();
                    let producer = thread::spawn(move || {
                        let chunk = vec![0xCDu8; CHUNK_SIZE];
                        let mut sent = 0u64;
                        while sent < BYTES_PER_RUN {
                            let want = CHUNK_SIZE.min((BYTES_PER_RUN - sent) as usize);
                            writer.write_all(&chunk[..want]).unwrap();
                            sent += want as u64;
                        }
                        writer.close();
                    });

                    let mut buf = vec![0u8; CHUNK_SIZE];
                    loop {
                        match reader.read(&mut buf) {
                            Ok(0) => break,
                            Ok(n) => {
                                black_box(&buf[..n]);
                            }
                            Err(e) => panic!("unexpected read error: {e}"),
                        }
                    }
                    producer.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spsc_throughput, bench_capacity_sensitivity);
criterion_main!(benches);
