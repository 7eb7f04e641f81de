use crate::error::{ReferenceKind, ScoreError};
use crate::types::{Association, Composite, DiseaseRef, TargetRef};
use ahash::AHashMap;

/// Joins each composite with its target and disease reference records.
///
/// The output is ordered by ascending median score. The sort is stable, so
/// composites with equal medians keep the order in which they were supplied.
/// A composite whose target or disease id is absent from the reference tables
/// aborts the whole join with [`ScoreError::MissingReference`].
pub fn join(
    composites: &[Composite],
    targets: &AHashMap<String, TargetRef>,
    diseases: &AHashMap<String, DiseaseRef>,
) -> Result<Vec<Association>, ScoreError> {
    let mut associations = composites
        .iter()
        .map(|composite| {
            let target = targets.get(&composite.target_id).ok_or_else(|| {
                ScoreError::MissingReference {
                    kind: ReferenceKind::Target,
                    id: composite.target_id.clone(),
                    composite: composite.key(),
                }
            })?;
            let disease = diseases.get(&composite.disease_id).ok_or_else(|| {
                ScoreError::MissingReference {
                    kind: ReferenceKind::Disease,
                    id: composite.disease_id.clone(),
                    composite: composite.key(),
                }
            })?;

            Ok(Association {
                target_id: composite.target_id.clone(),
                disease_id: composite.disease_id.clone(),
                median_score: composite.median_score,
                top_scores: composite.top_scores.clone(),
                approved_symbol: target.approved_symbol.clone(),
                disease_name: disease.name.clone(),
            })
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;

    associations.sort_by(|a, b| a.median_score.total_cmp(&b.median_score));
    Ok(associations)
}
