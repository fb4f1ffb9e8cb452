use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use linear_doc_engine::{Annotation, AnnotationMethod, Item, Range, Transaction};
mod common;

fn bench_factories(c: &mut Criterion) {
    let mut group = c.benchmark_group("factories");
    group.sample_size(20);

    let doc = common::generate_document(200);
    let middle = doc.len() / 2;

    group.bench_function("insertion_with_fixup", |b| {
        let data = common::paragraph("inserted");
        b.iter(|| {
            let tx = Transaction::new_from_insertion(&doc, black_box(middle), data.clone()).unwrap();
            black_box(tx);
        });
    });

    group.bench_function("removal_across_sections", |b| {
        let range = Range::new(10, doc.len() - 10);
        b.iter(|| {
            let tx = Transaction::new_from_removal(&doc, black_box(range)).unwrap();
            black_box(tx);
        });
    });

    group.bench_function("annotation_over_document", |b| {
        let range = Range::new(0, doc.len());
        b.iter(|| {
            let tx = Transaction::new_from_annotation(
                &doc,
                black_box(range),
                AnnotationMethod::Set,
                Annotation::new("textStyle/bold"),
            )
            .unwrap();
            black_box(tx);
        });
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    group.sample_size(20);

    let doc = common::generate_document(200);
    let tx = Transaction::new_from_insertion(&doc, 1, Item::text("typed")).unwrap();
    let undo = tx.reversed();

    group.bench_function("apply_and_undo", |b| {
        let mut doc = doc.clone();
        b.iter(|| {
            doc.apply(black_box(&tx)).unwrap();
            doc.apply(black_box(&undo)).unwrap();
        });
    });

    group.bench_function("translate_offset", |b| {
        b.iter(|| {
            for offset in (0..doc.len()).step_by(97) {
                black_box(tx.translate_offset(black_box(offset), false, false));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_factories, bench_apply);
criterion_main!(benches);
