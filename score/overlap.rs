// ========================================================================================
//
//                     Target-target overlap search over shared diseases
//
// ========================================================================================
//
// Finds every unordered pair of targets whose disease sets share at least `min_shared`
// diseases. Two decisions keep this tractable and duplicate-free:
//
// 1.  Pruning: a target with fewer than `min_shared` diseases can never reach the
//     threshold against anyone, so it is dropped before pairing.
// 2.  Triangular partition: survivors are put in one fixed order (ascending set size).
//     Search cell `i` pairs target `i` only with targets `i+1..k`. Every unordered pair
//     therefore belongs to exactly one cell, with no seen-pairs registry, and the cells
//     are fully independent units of parallel work.

use crate::error::ScoreError;
use crate::types::{CancelToken, Composite, OverlapPair, natural_id_cmp};
use ahash::{AHashMap, AHashSet};
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// All diseases associated with one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDiseaseSet {
    pub target_id: String,
    pub diseases: AHashSet<String>,
}

impl TargetDiseaseSet {
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

/// One unit of the triangular partition: an anchor target and every target
/// ordered after it.
struct SearchCell<'a> {
    anchor: &'a TargetDiseaseSet,
    candidates: &'a [TargetDiseaseSet],
}

impl SearchCell<'_> {
    fn scan(&self, min_shared: usize) -> Vec<OverlapPair> {
        self.candidates
            .par_iter()
            .filter(|candidate| reaches_threshold(self.anchor, candidate, min_shared))
            .map(|candidate| OverlapPair {
                target_a: self.anchor.target_id.clone(),
                target_b: candidate.target_id.clone(),
                shared_diseases: intersection(self.anchor, candidate),
            })
            .collect()
    }
}

/// Groups composites by target and collects each target's distinct diseases.
pub fn target_disease_sets(composites: &[Composite]) -> Vec<TargetDiseaseSet> {
    let mut by_target: AHashMap<&str, AHashSet<String>> = AHashMap::new();
    for composite in composites {
        by_target
            .entry(composite.target_id.as_str())
            .or_default()
            .insert(composite.disease_id.clone());
    }

    by_target
        .into_iter()
        .map(|(target_id, diseases)| TargetDiseaseSet {
            target_id: target_id.to_string(),
            diseases,
        })
        .collect()
}

/// Finds every unordered pair of distinct targets sharing at least `min_shared`
/// diseases. Each pair is reported once, with the full set of shared diseases.
/// Output order is unspecified.
pub fn find_overlaps(
    composites: &[Composite],
    min_shared: usize,
) -> Result<Vec<OverlapPair>, ScoreError> {
    find_overlaps_cancellable(composites, min_shared, &CancelToken::new())
}

/// Same as [`find_overlaps`], but stops with [`ScoreError::Cancelled`] once
/// `cancel` is set. The token is polled between search cells.
pub fn find_overlaps_cancellable(
    composites: &[Composite],
    min_shared: usize,
    cancel: &CancelToken,
) -> Result<Vec<OverlapPair>, ScoreError> {
    if min_shared == 0 {
        return Err(ScoreError::InvalidInput(
            "the minimum number of shared diseases must be at least 1".to_string(),
        ));
    }

    let mut sets: Vec<TargetDiseaseSet> = target_disease_sets(composites)
        .into_iter()
        .filter(|set| set.len() >= min_shared)
        .collect();
    sets.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| natural_id_cmp(&a.target_id, &b.target_id))
    });

    debug!(
        "{} targets have at least {} diseases and enter the pair search",
        sets.len(),
        min_shared
    );

    let cells: Vec<SearchCell<'_>> = (0..sets.len().saturating_sub(1))
        .map(|i| SearchCell {
            anchor: &sets[i],
            candidates: &sets[i + 1..],
        })
        .collect();

    let per_cell = cells
        .par_iter()
        .map(|cell| {
            if cancel.is_cancelled() {
                return Err(ScoreError::Cancelled);
            }
            Ok(cell.scan(min_shared))
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;

    Ok(per_cell.into_iter().flatten().collect())
}

/// Whether `anchor` and `candidate` share at least `min_shared` diseases.
/// Stops as soon as the answer is settled either way.
fn reaches_threshold(
    anchor: &TargetDiseaseSet,
    candidate: &TargetDiseaseSet,
    min_shared: usize,
) -> bool {
    let mut shared = 0;
    let mut remaining = anchor.len();
    for disease in &anchor.diseases {
        remaining -= 1;
        if candidate.diseases.contains(disease) {
            shared += 1;
            if shared >= min_shared {
                return true;
            }
        } else if shared + remaining < min_shared {
            return false;
        }
    }
    false
}

fn intersection(anchor: &TargetDiseaseSet, candidate: &TargetDiseaseSet) -> BTreeSet<String> {
    anchor
        .diseases
        .iter()
        .filter(|disease| candidate.diseases.contains(*disease))
        .cloned()
        .collect()
}
