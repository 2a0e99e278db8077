use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use voxfix::correction::backend::{MockBackend, ScoringBackend};
use voxfix::correction::candidates::CandidateGenerator;
use voxfix::correction::reranker::PseudoLikelihoodReranker;
use voxfix::defaults::MAX_LENGTH;
use voxfix::lexicon::Lexicon;

const UTTERANCES: &[(&str, &str)] = &[
    (
        "email",
        "hey ansh can u send the payment proof to my g mail dot com",
    ),
    ("rupees", "please pay rs 123456 by tomorrow"),
    ("digits", "my number is double nine five two triple seven oh one"),
    ("spelled", "mail j o h n d at yahooo dot com pls"),
];

fn lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::from_names([
        "Ansh", "Priya", "Rahul Verma", "Kabir", "Meera", "Arjun", "Sneha", "Vikram",
    ]))
}

fn bench_generate(c: &mut Criterion) {
    let generator = CandidateGenerator::new(lexicon());
    let mut group = c.benchmark_group("generate");
    for (label, text) in UTTERANCES {
        group.bench_with_input(BenchmarkId::from_parameter(label), text, |b, text| {
            b.iter(|| generator.generate(black_box(text)))
        });
    }
    group.finish();
}

fn bench_rerank(c: &mut Criterion) {
    let generator = CandidateGenerator::new(lexicon());
    let backend: Arc<dyn ScoringBackend> =
        Arc::new(MockBackend::new().with_preferred(&["gmail.com.", "please"]));
    let Ok(reranker) = PseudoLikelihoodReranker::new(backend, MAX_LENGTH) else {
        eprintln!("Skipping rerank benchmark: invalid max length");
        return;
    };

    let mut group = c.benchmark_group("rerank_mock");
    for (label, text) in UTTERANCES {
        let candidates = generator.generate(text);
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &candidates,
            |b, candidates| b.iter(|| reranker.choose_best(black_box(candidates))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_rerank);
criterion_main!(benches);
