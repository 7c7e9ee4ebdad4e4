use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use shardstore::store::catalog::{display_name, filter_catalog};
use shardstore::store::ident::{generate_id, ALPHABET};
use shardstore::store::mime::media_type_for;
use shardstore::store::ObjectSummary;

const LABELS: [&str; 6] = ["holiday", "invoice", "scan", "meme", "report_q3", "voice-note"];
const EXTS: [&str; 6] = ["png", "jpg", "pdf", "mp4", "txt", "bin"];

fn gen_catalog(n: usize, shards: usize, seed: u64) -> Vec<ObjectSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let token: String = (0..6).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
            let ext = EXTS[rng.gen_range(0..EXTS.len())];
            let name = if rng.gen_bool(0.6) { format!("{}_{}.{}", LABELS[rng.gen_range(0..LABELS.len())], token, ext) } else { format!("{}.{}", token, ext) };
            ObjectSummary {
                original_name: name.clone(),
                custom_name: display_name(&name),
                file_name: name.clone(),
                url: None,
                size: rng.gen_range(1..5 * 1024 * 1024),
                media_type: media_type_for(&name).to_string(),
                uploaded_at: None,
                repo_index: i % shards,
                repo_name: format!("store{}", i % shards),
            }
        })
        .collect()
}

fn bench_catalog(c: &mut Criterion) {
    let ns = [1_000usize, 10_000usize];
    let mut group = c.benchmark_group("catalog");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    for &n in &ns {
        let items = gen_catalog(n, 4, 0xBEEF_CAFE);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("display_name", n.to_string()), &items, |b, items| {
            b.iter(|| {
                for o in items { criterion::black_box(display_name(&o.file_name)); }
            });
        });

        group.bench_with_input(BenchmarkId::new("search", n.to_string()), &items, |b, items| {
            b.iter(|| criterion::black_box(filter_catalog(items.clone(), "INVOICE")));
        });
    }
    group.finish();

    c.bench_function("generate_id_6", |b| b.iter(|| criterion::black_box(generate_id(6))));
}

criterion_group!(benches, bench_catalog);
criterion_main!(benches);
