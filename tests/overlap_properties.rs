use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use tdscore::aggregate::aggregate;
use tdscore::overlap::{find_overlaps, target_disease_sets};
use tdscore::types::{Composite, Evidence};

fn random_composites(rng: &mut StdRng, targets: usize, diseases: usize) -> Vec<Composite> {
    let mut evidence = Vec::new();
    for t in 0..targets {
        let associations = rng.gen_range(0..=diseases);
        for _ in 0..associations {
            let d = rng.gen_range(0..diseases);
            for _ in 0..rng.gen_range(1..4) {
                evidence.push(Evidence::new(
                    format!("T{t}"),
                    format!("D{d}"),
                    rng.gen_range(0.0..1.0),
                ));
            }
        }
    }
    aggregate(&evidence, 3)
        .expect("aggregation")
        .into_iter()
        .map(|(_, composite)| composite)
        .collect()
}

/// Every qualifying unordered pair, keyed with the smaller id first.
fn brute_force(
    composites: &[Composite],
    min_shared: usize,
) -> AHashMap<(String, String), BTreeSet<String>> {
    let mut by_target: AHashMap<String, AHashSet<String>> = AHashMap::new();
    for composite in composites {
        by_target
            .entry(composite.target_id.clone())
            .or_default()
            .insert(composite.disease_id.clone());
    }
    let ids: Vec<&String> = by_target.keys().collect();

    let mut expected = AHashMap::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            let shared: BTreeSet<String> = by_target[*a]
                .intersection(&by_target[*b])
                .cloned()
                .collect();
            if shared.len() >= min_shared {
                expected.insert(ordered(a, b), shared);
            }
        }
    }
    expected
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[test]
fn search_is_complete_sound_and_duplicate_free() {
    let mut rng = StdRng::seed_from_u64(0x7d5c_0e11);

    for round in 0..40 {
        let composites = random_composites(&mut rng, 3 + round % 30, 4 + round % 9);
        for min_shared in 1..=4 {
            let expected = brute_force(&composites, min_shared);
            let found = find_overlaps(&composites, min_shared).expect("search");

            let mut seen = AHashSet::new();
            for pair in &found {
                assert_ne!(pair.target_a, pair.target_b);
                assert!(pair.shared_diseases.len() >= min_shared);
                let key = ordered(&pair.target_a, &pair.target_b);
                assert!(seen.insert(key.clone()), "pair {key:?} reported twice");
                assert_eq!(
                    expected.get(&key),
                    Some(&pair.shared_diseases),
                    "round {round}, min_shared {min_shared}"
                );
            }
            assert_eq!(
                found.len(),
                expected.len(),
                "round {round}, min_shared {min_shared}"
            );
        }
    }
}

#[test]
fn target_disease_sets_cover_every_composite() {
    let mut rng = StdRng::seed_from_u64(42);
    let composites = random_composites(&mut rng, 25, 12);
    let sets = target_disease_sets(&composites);

    let total: usize = sets.iter().map(|set| set.len()).sum();
    assert_eq!(total, composites.len());
    assert!(sets.iter().all(|set| !set.is_empty()));
}
