use std::hint::black_box;

use bytepair::{Segmenter, Tokenizer, Trainer, TrainerConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};

const SYLLABLES: &[&str] = &[
    "ka", "to", "ren", "iz", "er", "mer", "ge", "by", "te", "pa", "ir", "über", "naï", "日本", "語",
    "10", "24", "n't", "'ll", "qu",
];

fn build_text(target_bytes: usize) -> String {
    let mut text = String::with_capacity(target_bytes + 16);
    let mut state = 0x9E37_79B9u32;
    while text.len() < target_bytes {
        // xorshift keeps the word shapes varied without pulling in an rng
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let mut word_state = state;
        for _ in 0..=(state % 3) {
            text.push_str(SYLLABLES[word_state as usize % SYLLABLES.len()]);
            word_state /= SYLLABLES.len() as u32;
        }
        text.push(if state % 11 == 0 { '\n' } else { ' ' });
    }
    text
}

fn bench_training(c: &mut Criterion) {
    let text = build_text(64 * 1024);
    let cfg = TrainerConfig::builder()
        .vocab_size(512)
        .show_progress(false)
        .build()
        .expect("configuration");
    let segmenter = Segmenter::gpt4();

    let mut group = c.benchmark_group("train_text_corpus");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);
    group.bench_function(BenchmarkId::new("segmented", "KiB_64"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artifacts = trainer.train(&text, Some(&segmenter)).expect("training");
            let _ = black_box(artifacts);
        });
    });
    group.bench_function(BenchmarkId::new("unsegmented", "KiB_64"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artifacts = trainer.train(&text, None).expect("training");
            let _ = black_box(artifacts);
        });
    });
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let corpus = build_text(64 * 1024);
    let mut tokenizer = Tokenizer::regex();
    tokenizer.train(&corpus, 512, false).expect("training");
    let text = build_text(256 * 1024);

    let mut group = c.benchmark_group("encode_text");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function(BenchmarkId::from_parameter("KiB_256"), |b| {
        b.iter(|| black_box(tokenizer.encode(black_box(&text))));
    });
    group.finish();
}

criterion_group!(benches, bench_training, bench_encoding);
criterion_main!(benches);
