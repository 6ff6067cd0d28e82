use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hta_core::{EvidenceExtractor, LiteratureRecord, ProjectCategory};

fn batch(size: usize) -> Vec<LiteratureRecord> {
    (0..size)
        .map(|i| {
            LiteratureRecord::new(i.to_string())
                .with_title(format!("Screening study {i}"))
                .with_abstract(format!(
                    "We evaluated community screening in {i} districts. Sensitivity was {}% and \
                     specificity {}% against laboratory reference. The cost per person screened \
                     was ₹{},{:03}.",
                    60 + i % 40,
                    70 + i % 30,
                    1 + i % 9,
                    i % 1000
                ))
                .with_year("2023")
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let records = batch(200);
    let extractor = EvidenceExtractor::new(ProjectCategory::NcdScreening);

    c.bench_function("extract_ncd_200", |b| {
        b.iter(|| extractor.extract_with_report(black_box(&records)))
    });

    c.bench_function("extract_general_200", |b| {
        let general = EvidenceExtractor::new(ProjectCategory::General);
        b.iter(|| general.extract(black_box(&records)))
    });
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
