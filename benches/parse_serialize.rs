use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use promptchip::core::editor::{EditorConfig, EditorEvent, MentionEditor};
use promptchip::core::filter::filter;
use promptchip::core::registry::{MentionRegistry, RegistryEntry};
use promptchip::core::serializer::{parse, serialize};

fn make_registry(n: usize) -> MentionRegistry {
    let entries = (0..n)
        .map(|i| {
            if i % 3 == 0 {
                RegistryEntry::tool(format!("tool-{i}"), format!("Tool {i}"))
            } else {
                RegistryEntry::model(format!("model-{i}"), format!("Model {i}"))
            }
        })
        .collect();
    MentionRegistry::new(entries).unwrap_or_default()
}

fn make_prompt(mentions: usize) -> String {
    let mut text = String::new();
    for i in 0..mentions {
        text.push_str("please compare the answer from ");
        text.push_str(&format!("[Model:Model {}]", i * 3 + 1));
        text.push_str(" with [Tool:Tool 0] output [not a token]\n");
    }
    text
}

fn bench_parse_serialize(c: &mut Criterion) {
    let registry = make_registry(300);

    for &mentions in &[10usize, 200usize] {
        let text = make_prompt(mentions);
        let document = parse(&text, &registry);

        let mut group = c.benchmark_group(format!("prompt_mentions{mentions}"));
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_function(BenchmarkId::new("parse", mentions), |b| {
            b.iter(|| parse(&text, &registry))
        });
        group.bench_function(BenchmarkId::new("serialize", mentions), |b| {
            b.iter(|| serialize(&document))
        });
        group.finish();
    }

    let mut group = c.benchmark_group("completion");
    group.bench_function("filter_300", |b| b.iter(|| filter(&registry, "del 1")));
    group.bench_function("type_and_commit", |b| {
        b.iter(|| {
            let mut editor =
                MentionEditor::new("Ask ", registry.clone(), EditorConfig::default());
            for c in "@model 4".chars() {
                editor.handle(EditorEvent::Insert(c));
            }
            editor.handle(EditorEvent::Key(
                promptchip::core::completion::CompletionKey::Enter,
            ))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse_serialize);
criterion_main!(benches);
