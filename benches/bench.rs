//! Criterion benchmarks for the relief training pipeline.
//!
//! Covers the stages that dominate a training run:
//! - Message analysis (stop words, lemmatization)
//! - Count and TF-IDF vectorization
//! - Random forest fitting, single label and multi-output

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use relief::analysis::analyzer::MessageAnalyzer;
use relief::ml::forest::{ForestParams, RandomForestClassifier};
use relief::ml::multi_output::{LabelMatrix, MultiOutputClassifier};
use relief::ml::sparse::SparseMatrix;
use relief::ml::stage::{Estimator, Transformer};
use relief::ml::tfidf::TfIdfTransformer;
use relief::ml::vectorizer::CountVectorizer;

/// Generate disaster-style messages for benchmarking.
fn generate_messages(count: usize) -> Vec<String> {
    let words = [
        "water", "food", "shelter", "tents", "medical", "doctor", "injured", "flood",
        "earthquake", "storm", "rain", "road", "blocked", "bridge", "village", "families",
        "children", "help", "need", "please", "urgent", "hospital", "clothes", "fire",
        "missing", "people", "aid", "electricity", "cold", "hungry",
    ];

    (0..count)
        .map(|i| {
            let length = 8 + (i % 25);
            (0..length)
                .map(|j| words[(i * 7 + j * 13) % words.len()]) // Pseudo-random distribution
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Labels that depend on which words a message contains.
fn generate_labels(messages: &[String], n_labels: usize) -> LabelMatrix {
    let rows = messages
        .iter()
        .map(|m| {
            (0..n_labels)
                .map(|j| m.len() % (j + 2) == 0 || m.contains(["water", "food", "fire"][j % 3]))
                .collect()
        })
        .collect();
    LabelMatrix::from_rows(rows).unwrap()
}

fn features(messages: &[String]) -> SparseMatrix {
    let analyzer = Arc::new(MessageAnalyzer::english().unwrap());
    let counts = CountVectorizer::new(analyzer).fit_transform(messages).unwrap();
    TfIdfTransformer::default().fit_transform(&counts).unwrap()
}

/// Benchmark message analysis.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    let analyzer = MessageAnalyzer::english().unwrap();
    let messages = generate_messages(1000);

    group.bench_function("tokenize_single_message", |b| {
        b.iter(|| black_box(analyzer.tokenize(black_box(&messages[0]))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("tokenize_batch", |b| {
        b.iter(|| {
            for message in messages.iter().take(100) {
                let _ = black_box(analyzer.tokenize(black_box(message)));
            }
        })
    });

    group.finish();
}

/// Benchmark vectorization.
fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorization");

    let messages = generate_messages(1000);
    let analyzer = Arc::new(MessageAnalyzer::english().unwrap());

    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("count_fit_transform", |b| {
        b.iter(|| {
            let mut vectorizer = CountVectorizer::new(analyzer.clone());
            black_box(vectorizer.fit_transform(black_box(&messages)).unwrap())
        })
    });

    let mut vectorizer = CountVectorizer::new(analyzer.clone());
    let counts = vectorizer.fit_transform(&messages).unwrap();
    group.bench_function("tfidf_fit_transform", |b| {
        b.iter(|| {
            let mut tfidf = TfIdfTransformer::default();
            black_box(tfidf.fit_transform(black_box(&counts)).unwrap())
        })
    });

    group.finish();
}

/// Benchmark forest fitting.
fn bench_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest");
    group.sample_size(10);

    let messages = generate_messages(500);
    let x = features(&messages);
    let labels = generate_labels(&messages, 6);

    group.bench_function("fit_single_label", |b| {
        let y = labels.column(0);
        b.iter(|| {
            let mut forest = RandomForestClassifier::new(ForestParams::default());
            forest.fit(black_box(&x), black_box(&y)).unwrap();
            black_box(forest)
        })
    });

    for parallel in [false, true] {
        let name = if parallel {
            "fit_multi_output_parallel"
        } else {
            "fit_multi_output_sequential"
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut model =
                    MultiOutputClassifier::new(ForestParams::default()).with_parallel(parallel);
                model.fit(black_box(&x), black_box(&labels)).unwrap();
                black_box(model)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_vectorization, bench_forest);

criterion_main!(benches);
