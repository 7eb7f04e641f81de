// ========================================================================================
//
//                              The scoring run orchestrator
//
// ========================================================================================
//
// Owns the lifecycle of one batch run: load the three inputs, aggregate evidence, then
// run the reference join and the overlap search side by side, and write both outputs.
// Every stage is reported to a `StageObserver` with its item count and wall time.

use crate::aggregate::{CompositeMap, aggregate_cancellable};
use crate::config::{ConfigError, ScoreConfig};
use crate::error::ScoreError;
use crate::files::{self, FilesError};
use crate::join::join;
use crate::overlap::find_overlaps_cancellable;
use crate::progress::{ProgressStage, StageObserver};
use crate::types::{
    CancelToken, Composite, DiseaseRef, Evidence, OverlapPair, PairKey, TargetRef,
};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// File name of the joined association output.
pub const JOINT_DATASET_FILE: &str = "joint_dataset.json";
/// File name of the target-target overlap output.
pub const OVERLAP_PAIRS_FILE: &str = "target_overlap_pairs.json";

/// Number of overlap pairs echoed to the debug log after a search.
const PAIRS_TO_PREVIEW: usize = 5;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Files(#[from] FilesError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("Failed to create output directory '{}': {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Input directories and the output directory for a run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub evidence_dir: PathBuf,
    pub targets_dir: PathBuf,
    pub diseases_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Counts and output locations of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub evidence_records: usize,
    pub composites: usize,
    pub targets: usize,
    pub diseases: usize,
    pub associations: usize,
    pub overlap_pairs: usize,
    pub joint_dataset_path: Option<PathBuf>,
    pub overlap_pairs_path: PathBuf,
}

/// Runs the full scoring job: aggregation, reference join and overlap search.
///
/// The output directory is only created once every input has been read and
/// processed, so a failed run leaves nothing behind.
pub fn run(
    paths: &RunPaths,
    config: &ScoreConfig,
    progress: &mut dyn StageObserver,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let (evidence_records, composites) =
        load_composites(&paths.evidence_dir, config, progress, cancel)?;

    let targets = track(
        progress,
        ProgressStage::Targets,
        || Ok(files::read_keyed_records::<TargetRef>(&paths.targets_dir)?),
        |targets| targets.len(),
    )?;
    let diseases = track(
        progress,
        ProgressStage::Diseases,
        || Ok(files::read_keyed_records::<DiseaseRef>(&paths.diseases_dir)?),
        |diseases| diseases.len(),
    )?;

    progress.on_stage_start(ProgressStage::JointDataset);
    progress.on_stage_start(ProgressStage::OverlapSearch);
    let ((joined, join_elapsed), (searched, search_elapsed)) = rayon::join(
        || {
            let started = Instant::now();
            (join(&composites, &targets, &diseases), started.elapsed())
        },
        || {
            let started = Instant::now();
            (
                find_overlaps_cancellable(&composites, config.min_shared, cancel),
                started.elapsed(),
            )
        },
    );
    let (associations, overlaps) = match (joined, searched) {
        (Ok(associations), Ok(overlaps)) => (associations, overlaps),
        (Err(e), _) | (_, Err(e)) => {
            progress.on_stage_abort(ProgressStage::JointDataset);
            progress.on_stage_abort(ProgressStage::OverlapSearch);
            return Err(e.into());
        }
    };
    preview_pairs(&overlaps);

    let joint_dataset_path = write_output(&associations, &paths.output_dir, JOINT_DATASET_FILE)
        .inspect_err(|_| {
            progress.on_stage_abort(ProgressStage::JointDataset);
            progress.on_stage_abort(ProgressStage::OverlapSearch);
        })?;
    progress.on_stage_finish(ProgressStage::JointDataset, associations.len(), join_elapsed);

    let overlap_pairs_path = write_output(&overlaps, &paths.output_dir, OVERLAP_PAIRS_FILE)
        .inspect_err(|_| progress.on_stage_abort(ProgressStage::OverlapSearch))?;
    progress.on_stage_finish(ProgressStage::OverlapSearch, overlaps.len(), search_elapsed);

    Ok(RunSummary {
        evidence_records,
        composites: composites.len(),
        targets: targets.len(),
        diseases: diseases.len(),
        associations: associations.len(),
        overlap_pairs: overlaps.len(),
        joint_dataset_path: Some(joint_dataset_path),
        overlap_pairs_path,
    })
}

/// Runs aggregation and the overlap search only. No reference data is read
/// and no joint dataset is written.
pub fn run_overlaps(
    evidence_dir: &Path,
    output_dir: &Path,
    config: &ScoreConfig,
    progress: &mut dyn StageObserver,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let (evidence_records, composites) = load_composites(evidence_dir, config, progress, cancel)?;

    let (overlaps, overlap_pairs_path) = track(
        progress,
        ProgressStage::OverlapSearch,
        || {
            let overlaps = find_overlaps_cancellable(&composites, config.min_shared, cancel)?;
            preview_pairs(&overlaps);
            let path = write_output(&overlaps, output_dir, OVERLAP_PAIRS_FILE)?;
            Ok((overlaps, path))
        },
        |(overlaps, _)| overlaps.len(),
    )?;

    Ok(RunSummary {
        evidence_records,
        composites: composites.len(),
        targets: 0,
        diseases: 0,
        associations: 0,
        overlap_pairs: overlaps.len(),
        joint_dataset_path: None,
        overlap_pairs_path,
    })
}

/// Runs one stage between start and finish notifications. A failing stage is
/// reported through `on_stage_abort` instead.
fn track<T>(
    progress: &mut dyn StageObserver,
    stage: ProgressStage,
    work: impl FnOnce() -> Result<T, PipelineError>,
    count: impl FnOnce(&T) -> usize,
) -> Result<T, PipelineError> {
    progress.on_stage_start(stage);
    let started = Instant::now();
    match work() {
        Ok(value) => {
            progress.on_stage_finish(stage, count(&value), started.elapsed());
            Ok(value)
        }
        Err(e) => {
            progress.on_stage_abort(stage);
            Err(e)
        }
    }
}

/// Reads the evidence directory and aggregates it. Composites come back in
/// natural (target, disease) order so that downstream tie order is stable.
fn load_composites(
    evidence_dir: &Path,
    config: &ScoreConfig,
    progress: &mut dyn StageObserver,
    cancel: &CancelToken,
) -> Result<(usize, Vec<Composite>), PipelineError> {
    let (evidence_records, composites) = track(
        progress,
        ProgressStage::Evidence,
        || {
            let evidence = files::read_records::<Evidence>(evidence_dir)?;
            let composites =
                ordered_composites(aggregate_cancellable(&evidence, config.top_n, cancel)?);
            Ok((evidence.len(), composites))
        },
        |(_, composites)| composites.len(),
    )?;

    info!(
        "Aggregated {} evidence records into {} composites (top {} scores kept)",
        evidence_records,
        composites.len(),
        config.top_n
    );
    Ok((evidence_records, composites))
}

fn ordered_composites(map: CompositeMap) -> Vec<Composite> {
    let mut entries: Vec<(PairKey, Composite)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.natural_cmp(b));
    entries.into_iter().map(|(_, composite)| composite).collect()
}

fn preview_pairs(pairs: &[OverlapPair]) {
    for pair in pairs.iter().take(PAIRS_TO_PREVIEW) {
        debug!(
            "{} / {} share {}",
            pair.target_a,
            pair.target_b,
            pair.shared_diseases.iter().join(", ")
        );
    }
}

/// Writes `records` to `file_name` inside `output_dir`, creating the directory
/// on first use.
fn write_output<T: Serialize>(
    records: &[T],
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let path = output_dir.join(file_name);
    files::write_records(records, &path)?;
    Ok(path)
}
