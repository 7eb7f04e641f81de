use ahash::AHashMap;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{info, warn};
use std::fmt;
use std::io::IsTerminal;
use std::time::Duration;

/// Stages reported while a scoring run executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    Evidence,
    Targets,
    Diseases,
    JointDataset,
    OverlapSearch,
}

impl ProgressStage {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Evidence => "evidence data",
            Self::Targets => "target data",
            Self::Diseases => "disease data",
            Self::JointDataset => "joint association/target/disease data set",
            Self::OverlapSearch => "targets with shared disease connections",
        }
    }

    /// What the count reported at the end of the stage is a count of.
    pub fn counted(self) -> &'static str {
        match self {
            Self::Evidence => "target-disease overall association scores",
            Self::Targets => "targets",
            Self::Diseases => "diseases",
            Self::JointDataset => "overall association scores",
            Self::OverlapSearch => "target-target pairs with shared connections",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Observer for reporting the start and end of each stage of a run.
pub trait StageObserver {
    fn on_stage_start(&mut self, stage: ProgressStage) {
        let _ = stage;
    }
    fn on_stage_finish(&mut self, stage: ProgressStage, count: usize, elapsed: Duration) {
        let _ = (stage, count, elapsed);
    }
    /// Called instead of `on_stage_finish` when a started stage fails.
    fn on_stage_abort(&mut self, stage: ProgressStage) {
        let _ = stage;
    }
}

#[derive(Default)]
pub struct NoopProgress;

impl StageObserver for NoopProgress {}

/// Draws a spinner per running stage on stderr and logs a summary line when
/// each stage finishes. Spinners are hidden when stderr is not a terminal.
pub struct ConsoleProgress {
    bars: MultiProgress,
    running: AHashMap<ProgressStage, ProgressBar>,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let draw_target = if std::io::stderr().is_terminal() {
            ProgressDrawTarget::stderr_with_hz(20)
        } else {
            ProgressDrawTarget::hidden()
        };
        Self {
            bars: MultiProgress::with_draw_target(draw_target),
            running: AHashMap::new(),
        }
    }
}

impl StageObserver for ConsoleProgress {
    fn on_stage_start(&mut self, stage: ProgressStage) {
        let spinner = self.bars.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("> [{elapsed_precise}] {spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Processing {stage}..."));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.running.insert(stage, spinner);
    }

    fn on_stage_finish(&mut self, stage: ProgressStage, count: usize, elapsed: Duration) {
        if let Some(spinner) = self.running.remove(&stage) {
            spinner.finish_and_clear();
        }
        info!(
            "Finished {stage} in {} ms. Number of {}: {count}",
            elapsed.as_millis(),
            stage.counted()
        );
    }

    fn on_stage_abort(&mut self, stage: ProgressStage) {
        if let Some(spinner) = self.running.remove(&stage) {
            spinner.finish_and_clear();
        }
        warn!("Stopped processing {stage} before it completed");
    }
}
