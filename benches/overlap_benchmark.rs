// ========================================================================================
//
//                 TDSCORE AGGREGATION AND OVERLAP SEARCH BENCHMARK
//
// ========================================================================================
//
// Measures the two parallel stages of a scoring run on synthetic evidence: grouping and
// reducing evidence into composites, and the pairwise target overlap search. The overlap
// search is swept over disease-universe sizes, which controls how dense the per-target
// disease sets are and therefore how many candidate pairs survive the threshold.
//
// ========================================================================================

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tdscore::aggregate::aggregate;
use tdscore::overlap::find_overlaps;
use tdscore::types::{Composite, Evidence};

// --- Benchmark Tuning Parameters ---

/// The number of distinct targets to simulate.
const NUM_TARGETS: usize = 1_500;
/// The number of evidence records generated per target.
const RECORDS_PER_TARGET: usize = 40;
/// Scores kept per composite, matching the default run.
const TOP_N: usize = 3;
/// Minimum shared diseases for a reported pair, matching the default run.
const MIN_SHARED: usize = 2;
/// Disease-universe sizes to sweep. Smaller universes give denser overlaps.
const DISEASE_UNIVERSES: [usize; 4] = [50, 200, 1_000, 5_000];

/// Generates `NUM_TARGETS * RECORDS_PER_TARGET` evidence records drawn uniformly
/// from a universe of `num_diseases` diseases.
fn generate_evidence(num_diseases: usize, seed: u64) -> Vec<Evidence> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut evidence = Vec::with_capacity(NUM_TARGETS * RECORDS_PER_TARGET);
    for t in 0..NUM_TARGETS {
        for _ in 0..RECORDS_PER_TARGET {
            let d = rng.gen_range(0..num_diseases);
            evidence.push(Evidence::new(
                format!("ENSG{t:011}"),
                format!("EFO_{d:07}"),
                rng.gen_range(0.0..1.0),
            ));
        }
    }
    evidence
}

fn composites_for(evidence: &[Evidence]) -> Vec<Composite> {
    aggregate(evidence, TOP_N)
        .expect("aggregation of synthetic evidence")
        .into_iter()
        .map(|(_, composite)| composite)
        .collect()
}

fn benchmark_aggregation(c: &mut Criterion) {
    let evidence = generate_evidence(1_000, 7);

    let mut group = c.benchmark_group("Evidence Aggregation");
    group.throughput(Throughput::Elements(evidence.len() as u64));
    group.bench_function("aggregate", |b| {
        b.iter(|| aggregate(black_box(&evidence), black_box(TOP_N)).unwrap());
    });
    group.finish();
}

fn benchmark_overlap_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Target Overlap Search");
    group.sample_size(10);
    group.throughput(Throughput::Elements(NUM_TARGETS as u64));

    for &num_diseases in DISEASE_UNIVERSES.iter() {
        let composites = composites_for(&generate_evidence(num_diseases, 11));
        group.bench_with_input(
            BenchmarkId::new("find_overlaps", num_diseases),
            &composites,
            |b, composites| {
                b.iter(|| find_overlaps(black_box(composites), black_box(MIN_SHARED)).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_aggregation, benchmark_overlap_search);
criterion_main!(benches);
