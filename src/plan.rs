//! Generation run ledger
//!
//! Opens a run, records per-step outcomes, seals the run, and answers
//! summary/history/status queries. The run handle is explicit: every
//! mutation takes the `RunId` returned by [`GenerationPlan::begin`],
//! so concurrent or test-isolated runs cannot interfere through
//! ambient state.

use crate::error::{SpecforgeError, SpecforgeResult};
use crate::step::StepKey;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// Identifier of one generation run
pub type RunId = Uuid;

/// Terminal status of a step within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Generator executed and its files were routed/emitted
    Done,
    /// Skipped via build-cache hit
    Cached,
    /// Generator returned an error
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Done => "done",
            Self::Cached => "cached",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one step; at most one record per step key per run
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step_key: StepKey,
    pub status: StepStatus,
    pub files_produced: u64,
    pub duration_ms: u64,
}

/// One generation run
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub steps: BTreeMap<StepKey, StepRecord>,
}

impl GenerationRun {
    /// A run is open until `complete()` seals it
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Aggregated counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: u64,
    pub executed: u64,
    pub cached: u64,
    pub failed: u64,
    pub files_produced: u64,
    pub total_duration_ms: u64,
}

#[derive(Debug, Default)]
struct PlanState {
    /// Runs in start order, newest last
    runs: Vec<GenerationRun>,
    open_run: Option<RunId>,
}

/// Run ledger store
#[derive(Debug, Default)]
pub struct GenerationPlan {
    state: Mutex<PlanState>,
}

impl GenerationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new run. Opening a second run before the first is
    /// completed is a usage error.
    pub fn begin(&self) -> SpecforgeResult<RunId> {
        let mut state = self.state.lock().expect("plan store poisoned");

        if let Some(open) = state.open_run {
            return Err(SpecforgeError::RunAlreadyOpen(open.to_string()));
        }

        let run_id = Uuid::new_v4();
        state.runs.push(GenerationRun {
            run_id,
            started_at: Utc::now(),
            completed_at: None,
            steps: BTreeMap::new(),
        });
        state.open_run = Some(run_id);
        Ok(run_id)
    }

    /// Upsert a step record in the given open run. Re-recording a step
    /// within the same run overwrites its record (final write wins).
    pub fn record_step(
        &self,
        run_id: RunId,
        step_key: &StepKey,
        status: StepStatus,
        files_produced: u64,
        duration_ms: u64,
    ) -> SpecforgeResult<()> {
        let mut state = self.state.lock().expect("plan store poisoned");
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| SpecforgeError::RunNotFound(run_id.to_string()))?;

        if !run.is_open() {
            return Err(SpecforgeError::Internal(format!(
                "run {} is already completed",
                run_id
            )));
        }

        run.steps.insert(
            step_key.clone(),
            StepRecord {
                step_key: step_key.clone(),
                status,
                files_produced,
                duration_ms,
            },
        );
        Ok(())
    }

    /// Seal the run
    pub fn complete(&self, run_id: RunId) -> SpecforgeResult<()> {
        let mut state = self.state.lock().expect("plan store poisoned");
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| SpecforgeError::RunNotFound(run_id.to_string()))?;

        run.completed_at = Some(Utc::now());
        if state.open_run == Some(run_id) {
            state.open_run = None;
        }
        Ok(())
    }

    /// Aggregate the run's step records
    pub fn summary(&self, run_id: RunId) -> SpecforgeResult<RunSummary> {
        let state = self.state.lock().expect("plan store poisoned");
        let run = state
            .runs
            .iter()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| SpecforgeError::RunNotFound(run_id.to_string()))?;

        let mut summary = RunSummary::default();
        for record in run.steps.values() {
            summary.total += 1;
            match record.status {
                StepStatus::Done => summary.executed += 1,
                StepStatus::Cached => summary.cached += 1,
                StepStatus::Failed => summary.failed += 1,
            }
            summary.files_produced += record.files_produced;
            summary.total_duration_ms += record.duration_ms;
        }
        Ok(summary)
    }

    /// Most recent runs (including an open one), newest first
    pub fn history(&self, limit: usize) -> Vec<GenerationRun> {
        let state = self.state.lock().expect("plan store poisoned");
        state.runs.iter().rev().take(limit).cloned().collect()
    }

    /// Current per-step state for one run, for progress display
    pub fn status(&self, run_id: RunId) -> SpecforgeResult<Vec<StepRecord>> {
        let state = self.state.lock().expect("plan store poisoned");
        let run = state
            .runs
            .iter()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| SpecforgeError::RunNotFound(run_id.to_string()))?;

        Ok(run.steps.values().cloned().collect())
    }
}
