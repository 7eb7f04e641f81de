// ========================================================================================
//
//                       Evidence aggregation: partition, reduce, merge
//
// ========================================================================================
//
// Evidence is grouped by its (target, disease) key and each group is reduced to one
// `Composite`. The fan-out is explicit:
//
// 1.  Partition: the evidence slice is cut into one contiguous chunk per worker. Each
//     scoped worker thread groups its chunk into a private map. No state is shared.
// 2.  Merge: after the join barrier, the partial maps are folded together in chunk
//     order, so scores inside a group keep their original relative order.
// 3.  Reduce: groups are independent and are reduced on the rayon pool. Results land in
//     a concurrent map because reductions finish in arbitrary order.

use crate::error::ScoreError;
use crate::stats::median;
use crate::types::{CancelToken, Composite, Evidence, PairKey};
use ahash::AHashMap;
use dashmap::DashMap;
use log::debug;
use rayon::prelude::*;
use std::panic;
use std::thread;

/// The aggregation result: exactly one composite per distinct (target, disease) key.
pub type CompositeMap = DashMap<PairKey, Composite, ahash::RandomState>;

/// Below this many records per worker, extra threads cost more than they save.
const MIN_RECORDS_PER_WORKER: usize = 4096;

/// Groups `evidence` by (target, disease) and reduces each group to a [`Composite`].
///
/// `top_n` must be positive.
pub fn aggregate(evidence: &[Evidence], top_n: usize) -> Result<CompositeMap, ScoreError> {
    aggregate_cancellable(evidence, top_n, &CancelToken::new())
}

/// Same as [`aggregate`], but stops with [`ScoreError::Cancelled`] once `cancel`
/// is set. The token is polled between groups.
pub fn aggregate_cancellable(
    evidence: &[Evidence],
    top_n: usize,
    cancel: &CancelToken,
) -> Result<CompositeMap, ScoreError> {
    if top_n == 0 {
        return Err(ScoreError::InvalidInput(
            "the number of top scores to keep must be at least 1".to_string(),
        ));
    }

    let groups = partition_and_merge(evidence);
    debug!(
        "Grouped {} evidence records into {} target-disease pairs",
        evidence.len(),
        groups.len()
    );

    let composites = CompositeMap::with_capacity_and_hasher(groups.len(), Default::default());
    groups
        .into_par_iter()
        .try_for_each(|(key, scores)| -> Result<(), ScoreError> {
            if cancel.is_cancelled() {
                return Err(ScoreError::Cancelled);
            }
            let composite = reduce_group(&key, &scores, top_n)?;
            composites.insert(key, composite);
            Ok(())
        })?;

    Ok(composites)
}

/// Reduces the scores of one group to its median and top-N scores.
fn reduce_group(key: &PairKey, scores: &[f64], top_n: usize) -> Result<Composite, ScoreError> {
    Ok(Composite {
        target_id: key.target_id.clone(),
        disease_id: key.disease_id.clone(),
        median_score: median(scores)?,
        top_scores: top_scores(scores, top_n),
    })
}

/// The `top_n` highest scores in descending order. `sort_by` is stable, so equal
/// scores keep the order they were observed in.
fn top_scores(scores: &[f64], top_n: usize) -> Vec<f64> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.truncate(top_n);
    sorted
}

fn partition_and_merge(evidence: &[Evidence]) -> Vec<(PairKey, Vec<f64>)> {
    if evidence.is_empty() {
        return Vec::new();
    }

    let workers = num_cpus::get()
        .min(evidence.len().div_ceil(MIN_RECORDS_PER_WORKER))
        .max(1);
    let chunk_len = evidence.len().div_ceil(workers);

    let partials: Vec<AHashMap<PairKey, Vec<f64>>> = thread::scope(|s| {
        let handles: Vec<_> = evidence
            .chunks(chunk_len)
            .map(|chunk| s.spawn(move || group_chunk(chunk)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    let mut partials = partials.into_iter();
    let mut merged = partials.next().unwrap_or_default();
    for partial in partials {
        for (key, scores) in partial {
            merged.entry(key).or_default().extend(scores);
        }
    }

    merged.into_iter().collect()
}

fn group_chunk(chunk: &[Evidence]) -> AHashMap<PairKey, Vec<f64>> {
    let mut groups: AHashMap<PairKey, Vec<f64>> = AHashMap::new();
    for record in chunk {
        groups.entry(record.key()).or_default().push(record.score);
    }
    groups
}
