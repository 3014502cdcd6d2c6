//! Run controller
//!
//! Drives a [`DayProcessor`] over a planned date sequence while enforcing
//! the run budgets and owning the only mutable copies of the checkpoint and
//! the counters. The controller persists the checkpoint after every fully
//! completed date, so a crash loses at most the in-flight date.

use crate::harvest::day::{DayOutcome, DayProcessor, DayReport};
use crate::plan::DatePlan;
use crate::store::CheckpointStore;
use crate::BackfileError;
use chrono::NaiveDate;
use std::time::{Duration, Instant};

/// Per-run caps, read-only after construction
#[derive(Debug, Clone, Copy)]
pub struct RunBudget {
    /// Maximum number of dates processed
    pub max_days: u32,

    /// Wall-clock ceiling; checked between dates, never mid-date
    pub max_runtime: Duration,
}

impl RunBudget {
    pub fn new(max_days: u32, max_runtime: Duration) -> Self {
        Self {
            max_days,
            max_runtime,
        }
    }
}

/// Item- and day-granular counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub days_processed: u32,
    pub uploaded: u32,
    pub skipped_existing: u32,
    pub skipped_no_content: u32,
    pub failed: u32,
}

impl RunStats {
    fn absorb(&mut self, report: &DayReport) {
        self.days_processed += 1;
        self.uploaded += report.uploaded;
        self.skipped_existing += report.skipped_existing;
        self.failed += report.failed;
        if report.outcome == DayOutcome::SkippedNoContent {
            self.skipped_no_content += 1;
        }
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// The planned sequence was exhausted
    Completed,
    /// A budget cap stopped the run; a successful stopping point
    BudgetExceeded,
    /// Durable progress could not be guaranteed
    Aborted,
}

/// Final report for one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub state: RunState,
    pub stats: RunStats,
    pub elapsed: Duration,
    /// Last fully-completed date, as persisted
    pub checkpoint: Option<NaiveDate>,
}

/// Drives one stream's run to a terminal state
pub struct RunController<D: DayProcessor> {
    processor: D,
    checkpoint_store: CheckpointStore,
    budget: RunBudget,
    advance_on_partial_failure: bool,
    state: RunState,
    stats: RunStats,
    checkpoint: Option<NaiveDate>,
}

impl<D: DayProcessor> RunController<D> {
    /// Creates a controller seeded with the checkpoint loaded at run start
    pub fn new(
        processor: D,
        checkpoint_store: CheckpointStore,
        budget: RunBudget,
        advance_on_partial_failure: bool,
        checkpoint: Option<NaiveDate>,
    ) -> Self {
        Self {
            processor,
            checkpoint_store,
            budget,
            advance_on_partial_failure,
            state: RunState::Idle,
            stats: RunStats::default(),
            checkpoint,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Processes the planned dates until exhaustion, budget breach, or a
    /// fatal persistence failure.
    ///
    /// Returns the run summary on every successful stopping point
    /// (`Completed` and `BudgetExceeded` both count); returns an error only
    /// when the run had to abort.
    pub async fn run(&mut self, plan: DatePlan) -> crate::Result<RunSummary> {
        self.state = RunState::Running;
        let started = Instant::now();

        tracing::info!(
            stream = self.processor.stream_name(),
            max_days = self.budget.max_days,
            max_runtime_minutes = self.budget.max_runtime.as_secs() / 60,
            checkpoint = ?self.checkpoint,
            "Run started"
        );

        for date in plan {
            // Budgets are polled between dates only; a date in flight always
            // runs to completion.
            if self.stats.days_processed >= self.budget.max_days {
                tracing::info!(max_days = self.budget.max_days, "Day budget reached");
                self.state = RunState::BudgetExceeded;
                break;
            }
            if started.elapsed() >= self.budget.max_runtime {
                tracing::info!(
                    elapsed_minutes = started.elapsed().as_secs() / 60,
                    "Runtime budget reached"
                );
                self.state = RunState::BudgetExceeded;
                break;
            }

            tracing::info!(stream = self.processor.stream_name(), %date, "Processing date");

            let report = match self.processor.process(date).await {
                Ok(report) => report,
                Err(e) => {
                    self.state = RunState::Aborted;
                    self.log_summary(started.elapsed());
                    return Err(e);
                }
            };

            self.stats.absorb(&report);

            match &report.outcome {
                DayOutcome::Failed(reason) => {
                    // The checkpoint must not advance past a failed date:
                    // the next run retries it rather than skipping a gap.
                    tracing::warn!(%date, %reason, "Date failed");
                }
                _ => {
                    if self.date_is_done(&report) {
                        self.checkpoint = Some(date);
                        if let Err(e) = self.checkpoint_store.save(date).await {
                            tracing::error!(
                                key = self.checkpoint_store.key(),
                                error = %e,
                                "Checkpoint persistence failed, aborting"
                            );
                            self.state = RunState::Aborted;
                            self.log_summary(started.elapsed());
                            return Err(BackfileError::Checkpoint {
                                key: self.checkpoint_store.key().to_string(),
                                source: e,
                            });
                        }
                        tracing::debug!(%date, "Checkpoint advanced");
                    } else {
                        tracing::warn!(
                            %date,
                            failed_items = report.failed,
                            "Date partially failed, checkpoint held back"
                        );
                    }
                }
            }
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }

        let elapsed = started.elapsed();
        self.log_summary(elapsed);

        Ok(RunSummary {
            state: self.state,
            stats: self.stats.clone(),
            elapsed,
            checkpoint: self.checkpoint,
        })
    }

    /// A date is done — and may advance the checkpoint — when every item
    /// resolved. Item failures hold the checkpoint back only when the
    /// partial-failure policy says so.
    fn date_is_done(&self, report: &DayReport) -> bool {
        match report.outcome {
            DayOutcome::Failed(_) => false,
            _ => report.failed == 0 || self.advance_on_partial_failure,
        }
    }

    fn log_summary(&self, elapsed: Duration) {
        tracing::info!(
            stream = self.processor.stream_name(),
            state = ?self.state,
            days = self.stats.days_processed,
            uploaded = self.stats.uploaded,
            skipped_existing = self.stats.skipped_existing,
            skipped_no_content = self.stats.skipped_no_content,
            failed = self.stats.failed,
            elapsed_seconds = elapsed.as_secs(),
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{plan_dates, RunMode};
    use crate::store::{checkpoint_key, BlobStore, MemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn budget(max_days: u32) -> RunBudget {
        RunBudget::new(max_days, Duration::from_secs(3600))
    }

    fn ten_day_plan() -> DatePlan {
        plan_dates(
            RunMode::ExplicitRange {
                start: d(2026, 1, 1),
                end: d(2026, 1, 10),
            },
            None,
            d(2026, 2, 1),
            d(2007, 6, 2),
        )
    }

    /// Scripted processor: pops the next report for each processed date
    struct ScriptedProcessor {
        reports: Vec<DayReport>,
        processed: Vec<NaiveDate>,
    }

    impl ScriptedProcessor {
        fn uploading() -> Self {
            Self {
                reports: vec![],
                processed: vec![],
            }
        }

        fn with_reports(reports: Vec<DayReport>) -> Self {
            Self {
                reports,
                processed: vec![],
            }
        }

        fn uploaded_report() -> DayReport {
            DayReport {
                outcome: DayOutcome::Uploaded,
                uploaded: 1,
                skipped_existing: 0,
                failed: 0,
            }
        }
    }

    #[async_trait]
    impl DayProcessor for ScriptedProcessor {
        fn stream_name(&self) -> &'static str {
            "test"
        }

        async fn process(&mut self, date: NaiveDate) -> crate::Result<DayReport> {
            self.processed.push(date);
            if self.reports.is_empty() {
                Ok(Self::uploaded_report())
            } else {
                Ok(self.reports.remove(0))
            }
        }
    }

    fn controller_with(
        store: Arc<MemoryStore>,
        processor: ScriptedProcessor,
        max_days: u32,
        advance_on_partial: bool,
    ) -> RunController<ScriptedProcessor> {
        let cp = CheckpointStore::new(store, checkpoint_key("aljarida", "test"));
        RunController::new(processor, cp, budget(max_days), advance_on_partial, None)
    }

    #[tokio::test]
    async fn test_day_budget_stops_after_exact_count() {
        let store = Arc::new(MemoryStore::new());
        let mut controller =
            controller_with(store.clone(), ScriptedProcessor::uploading(), 3, true);

        let summary = controller.run(ten_day_plan()).await.unwrap();

        assert_eq!(summary.state, RunState::BudgetExceeded);
        assert_eq!(summary.stats.days_processed, 3);
        assert_eq!(summary.checkpoint, Some(d(2026, 1, 3)));
        assert_eq!(
            store
                .object("aljarida/_state/test_last_success_date.txt")
                .unwrap(),
            b"2026-01-03"
        );
    }

    #[tokio::test]
    async fn test_exhausted_plan_completes() {
        let store = Arc::new(MemoryStore::new());
        let mut controller =
            controller_with(store.clone(), ScriptedProcessor::uploading(), 100, true);

        let summary = controller.run(ten_day_plan()).await.unwrap();

        assert_eq!(summary.state, RunState::Completed);
        assert_eq!(summary.stats.days_processed, 10);
        assert_eq!(summary.stats.uploaded, 10);
        assert_eq!(summary.checkpoint, Some(d(2026, 1, 10)));
    }

    #[tokio::test]
    async fn test_failed_date_does_not_advance_checkpoint() {
        let store = Arc::new(MemoryStore::new());
        let reports = vec![
            ScriptedProcessor::uploaded_report(),
            DayReport {
                outcome: DayOutcome::Failed("boom".to_string()),
                uploaded: 0,
                skipped_existing: 0,
                failed: 1,
            },
            ScriptedProcessor::uploaded_report(),
        ];
        let mut controller = controller_with(
            store.clone(),
            ScriptedProcessor::with_reports(reports),
            3,
            true,
        );

        let summary = controller.run(ten_day_plan()).await.unwrap();

        // The failed second date is skipped over in this run, but the third
        // date still advances the checkpoint past it.
        assert_eq!(summary.stats.days_processed, 3);
        assert_eq!(summary.stats.failed, 1);
        assert_eq!(summary.checkpoint, Some(d(2026, 1, 3)));
    }

    #[tokio::test]
    async fn test_all_failed_run_keeps_initial_checkpoint() {
        let store = Arc::new(MemoryStore::new());
        let reports = (0..10)
            .map(|_| DayReport {
                outcome: DayOutcome::Failed("boom".to_string()),
                uploaded: 0,
                skipped_existing: 0,
                failed: 1,
            })
            .collect();
        let mut controller = controller_with(
            store.clone(),
            ScriptedProcessor::with_reports(reports),
            100,
            true,
        );

        let summary = controller.run(ten_day_plan()).await.unwrap();

        assert_eq!(summary.state, RunState::Completed);
        assert_eq!(summary.checkpoint, None);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_policy_holds_checkpoint() {
        let store = Arc::new(MemoryStore::new());
        let reports = vec![DayReport {
            outcome: DayOutcome::Uploaded,
            uploaded: 2,
            skipped_existing: 0,
            failed: 1,
        }];
        let mut controller = controller_with(
            store.clone(),
            ScriptedProcessor::with_reports(reports),
            1,
            false,
        );

        let summary = controller.run(ten_day_plan()).await.unwrap();

        assert_eq!(summary.stats.uploaded, 2);
        assert_eq!(summary.checkpoint, None);
    }

    #[tokio::test]
    async fn test_partial_failure_advances_under_default_policy() {
        let store = Arc::new(MemoryStore::new());
        let reports = vec![DayReport {
            outcome: DayOutcome::Uploaded,
            uploaded: 2,
            skipped_existing: 0,
            failed: 1,
        }];
        let mut controller = controller_with(
            store.clone(),
            ScriptedProcessor::with_reports(reports),
            1,
            true,
        );

        let summary = controller.run(ten_day_plan()).await.unwrap();
        assert_eq!(summary.checkpoint, Some(d(2026, 1, 1)));
    }

    #[tokio::test]
    async fn test_skipped_no_content_advances_checkpoint() {
        let store = Arc::new(MemoryStore::new());
        let reports = vec![DayReport::outcome_only(DayOutcome::SkippedNoContent)];
        let mut controller = controller_with(
            store.clone(),
            ScriptedProcessor::with_reports(reports),
            1,
            true,
        );

        let summary = controller.run(ten_day_plan()).await.unwrap();
        assert_eq!(summary.stats.skipped_no_content, 1);
        assert_eq!(summary.checkpoint, Some(d(2026, 1, 1)));
    }

    /// Store whose writes always fail, for the abort path
    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    #[async_trait]
    impl BlobStore for ReadOnlyStore {
        async fn exists(&self, _key: &str) -> StoreResult<bool> {
            Ok(false)
        }

        async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn put(&self, _key: &str, _bytes: &[u8], _content_type: &str) -> StoreResult<()> {
            Err(StoreError::Backend("write refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_checkpoint_persistence_failure_aborts() {
        let cp = CheckpointStore::new(
            Arc::new(ReadOnlyStore),
            checkpoint_key("aljarida", "test"),
        );
        let mut controller = RunController::new(
            ScriptedProcessor::uploading(),
            cp,
            budget(10),
            true,
            None,
        );

        let err = controller.run(ten_day_plan()).await.unwrap_err();
        assert!(matches!(err, BackfileError::Checkpoint { .. }));
        assert_eq!(controller.state(), RunState::Aborted);
    }
}
