use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagesmith_compiler::{generate, load_document, GenerateOptions};
use pagesmith_document::{Document, TemplateRegistry};

fn sample_document(blocks: usize) -> Document {
    let registry = TemplateRegistry::builtin();
    let mut doc = Document::new("home");

    for i in 0..blocks {
        let container = doc.add_block(registry, "container", None).unwrap();
        let heading = doc.add_block(registry, "heading", Some(container)).unwrap();
        doc.update_field(registry, heading, "text", format!("Section {}", i))
            .unwrap();
        doc.add_block(registry, "textview", Some(container)).unwrap();
        doc.add_block(registry, "button", Some(container)).unwrap();
    }

    doc
}

fn generate_persisted(c: &mut Criterion) {
    let registry = TemplateRegistry::builtin();
    let doc = sample_document(50);
    let options = GenerateOptions::persisted();

    c.bench_function("generate_persisted_50_sections", |b| {
        b.iter(|| generate(black_box(&doc), registry, &options))
    });
}

fn load_snapshot(c: &mut Criterion) {
    let registry = TemplateRegistry::builtin();
    let doc = sample_document(50);
    let code = generate(&doc, registry, &GenerateOptions::persisted()).unwrap();

    c.bench_function("load_snapshot_50_sections", |b| {
        b.iter(|| load_document(black_box(&code), "home", registry))
    });
}

criterion_group!(benches, generate_persisted, load_snapshot);
criterion_main!(benches);
