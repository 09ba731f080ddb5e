//! Benchmarks for reference detection, log writes and a full run.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ingestflow::prelude::*;
use ingestflow::testing::StaticTranscriptFetcher;
use std::sync::Arc;

const NOTE: &str = "Some notes first.\n\nThen a link: https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s\n";

fn extract_benchmark(c: &mut Criterion) {
    let extractor = ReferenceExtractor::youtube().expect("patterns compile");

    c.bench_function("extract_watch_link", |b| {
        b.iter(|| extractor.extract(black_box(NOTE)));
    });
    c.bench_function("extract_no_link", |b| {
        b.iter(|| extractor.extract(black_box("plain text without any reference at all")));
    });
}

fn records_benchmark(c: &mut Criterion) {
    let records = RecordManager::in_memory();

    c.bench_function("add_and_complete", |b| {
        b.iter(|| {
            records.add_action("bench", Operation::FetchTranscript.start());
            records.complete_action("bench", Operation::FetchTranscript.done());
        });
    });
}

fn run_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let fetcher = Arc::new(StaticTranscriptFetcher::new("transcript words"));
    let pipeline = Pipeline::transcript(fetcher, &PipelineConfig::default()).expect("pipeline");

    c.bench_function("transcript_pipeline_run", |b| {
        b.iter(|| {
            let mut ctx = PipelineContext::new("bench", NOTE, RecordManager::in_memory());
            runtime.block_on(pipeline.run(&mut ctx)).expect("run")
        });
    });
}

criterion_group!(benches, extract_benchmark, records_benchmark, run_benchmark);
criterion_main!(benches);
