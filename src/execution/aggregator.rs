// Event aggregator - drives the report tree from lifecycle events
//
// Idle --run_started--> Running --run_finished--> Finalized
//
// Out-of-state events are logged and ignored: a reporting failure must never
// fail the run being reported on. The only hard error is starting a run
// while one is in progress.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::execution::context::ScenarioContext;
use crate::execution::events::EventRecord;
use crate::report::{ReportTree, Reporter, RunReport};
use crate::state::{ReportStatus, RunMetrics, StatusMapper};

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Finalized,
}

/// Report decoration and emission options
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub run_name: String,
    pub title: String,
    pub system_info: BTreeMap<String, String>,
    pub open_after_flush: bool,
    pub parallel_jobs: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            run_name: "Step Report".to_string(),
            title: "Step Report".to_string(),
            system_info: BTreeMap::new(),
            open_after_flush: false,
            parallel_jobs: 1,
        }
    }
}

struct Inner {
    state: RunState,
    tree: Option<Arc<ReportTree>>,
    started_at: Option<String>,
    metrics: RunMetrics,
}

/// Turns lifecycle events into a report tree and emits it once
pub struct EventAggregator {
    options: AggregatorOptions,
    reporters: Vec<Box<dyn Reporter>>,
    inner: Mutex<Inner>,
    emitted: AtomicBool,
    artifacts: Mutex<Vec<PathBuf>>,
}

impl EventAggregator {
    pub fn new(options: AggregatorOptions, reporters: Vec<Box<dyn Reporter>>) -> Self {
        let metrics = RunMetrics {
            parallel_jobs: options.parallel_jobs,
            ..RunMetrics::default()
        };

        Self {
            options,
            reporters,
            inner: Mutex::new(Inner {
                state: RunState::Idle,
                tree: None,
                started_at: None,
                metrics,
            }),
            emitted: AtomicBool::new(false),
            artifacts: Mutex::new(Vec::new()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RunState {
        self.inner().state
    }

    /// The report tree once a run has started
    pub fn tree(&self) -> Option<Arc<ReportTree>> {
        self.inner().tree.clone()
    }

    /// Artifacts written by the flush, if any
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn metrics(&self) -> RunMetrics {
        self.inner().metrics.clone()
    }

    fn protocol_violation(&self, event: &EventRecord, reason: &str) {
        self.inner().metrics.protocol_violations += 1;
        warn!("Ignoring {} event: {}", event.kind(), reason);
    }

    /// Tree of the running run; `None` (after logging) in any other state
    fn running_tree(&self, event: &EventRecord) -> Option<Arc<ReportTree>> {
        let outcome = {
            let mut inner = self.inner();
            match inner.state {
                RunState::Running => {
                    inner.metrics.events_handled += 1;
                    Ok(inner.tree.clone())
                }
                RunState::Idle => Err("no run has been started"),
                RunState::Finalized => Err("the run is already finalized"),
            }
        };

        match outcome {
            Ok(tree) => tree,
            Err(reason) => {
                self.protocol_violation(event, reason);
                None
            }
        }
    }

    fn start_run(&self) -> Result<(), ReportError> {
        let mut inner = self.inner();
        match inner.state {
            RunState::Idle => {
                inner.state = RunState::Running;
                inner.tree = Some(Arc::new(ReportTree::new(&self.options.run_name)));
                inner.started_at = Some(crate::time::now_rfc3339());
                inner.metrics.start_time = crate::time::now_unix_millis();
                inner.metrics.events_handled += 1;
                info!("Run '{}' started", self.options.run_name);
                Ok(())
            }
            RunState::Running => Err(ReportError::RunAlreadyStarted {
                started_at: inner.started_at.clone().unwrap_or_default(),
            }),
            RunState::Finalized => {
                drop(inner);
                self.protocol_violation(&EventRecord::RunStarted, "the run is already finalized");
                Ok(())
            }
        }
    }

    fn finish_run(&self) {
        {
            let mut inner = self.inner();
            if inner.state != RunState::Running {
                drop(inner);
                self.protocol_violation(&EventRecord::RunFinished, "no run in progress");
                return;
            }
            inner.state = RunState::Finalized;
            inner.metrics.events_handled += 1;
            inner.metrics.finish();
        }

        info!("Run '{}' finished", self.options.run_name);
        self.flush();
    }

    /// Handle one event on behalf of the unit that owns `ctx`
    pub fn handle(&self, ctx: &mut ScenarioContext, event: EventRecord) -> Result<(), ReportError> {
        match event {
            EventRecord::RunStarted => self.start_run(),
            EventRecord::RunFinished => {
                self.finish_run();
                Ok(())
            }
            scenario_event => {
                self.handle_scenario_event(ctx, scenario_event);
                Ok(())
            }
        }
    }

    fn handle_scenario_event(&self, ctx: &mut ScenarioContext, event: EventRecord) {
        let Some(tree) = self.running_tree(&event) else {
            return;
        };

        match event {
            EventRecord::CaseStarted {
                feature,
                scenario,
                tags,
            } => {
                if let Some(unfinished) = ctx.end_scenario() {
                    warn!(
                        "Scenario '{}' started before '{}' finished",
                        scenario,
                        unfinished.label()
                    );
                    unfinished.log(
                        ReportStatus::Warning,
                        format!("Interrupted by scenario '{}' before it finished", scenario),
                    );
                    unfinished.mark_finished();
                }
                let feature_node = tree.get_or_create_feature(&feature);
                let scenario_node = tree.create_scenario(&feature_node, &scenario, tags);
                debug!("Scenario '{}' started in feature '{}'", scenario, feature);
                ctx.begin_scenario(scenario_node);
            }
            EventRecord::StepStarted { ref text } => {
                if ctx.scenario().is_none() {
                    self.protocol_violation(&event, "no active scenario");
                } else {
                    debug!("Step started: {}", text);
                }
            }
            EventRecord::StepFinished {
                ref text,
                ref outcome,
                ref error,
            } => {
                let Some(scenario) = ctx.scenario().cloned() else {
                    self.protocol_violation(&event, "no active scenario");
                    return;
                };
                let status = StatusMapper::map(outcome);
                tree.append_step(&scenario, text, status, error.as_deref());
            }
            EventRecord::CaseFinished {
                ref outcome,
                ref error,
            } => {
                let Some(scenario) = ctx.scenario().cloned() else {
                    self.protocol_violation(&event, "no active scenario");
                    return;
                };
                let status = StatusMapper::map(outcome);

                // A step failure already explains the scenario; only log
                // case-level errors that no step accounted for.
                if !scenario.status().is_failure()
                    && let Some(detail) = error
                {
                    scenario.log(status, detail.clone());
                }
                scenario.worsen(status);
                scenario.mark_finished();
                ctx.end_scenario();
                debug!("Scenario '{}' finished: {}", scenario.label(), scenario.status());
            }
            // Run-level events never reach this point
            EventRecord::RunStarted | EventRecord::RunFinished => {}
        }
    }

    /// Handle an event with the calling task's attached context
    pub fn handle_current(&self, event: EventRecord) -> Result<(), ReportError> {
        if ScenarioContext::in_scope() {
            return ScenarioContext::with_current(|ctx| self.handle(ctx, event)).unwrap_or(Ok(()));
        }

        if event.is_run_level() {
            self.handle(&mut ScenarioContext::new(), event)
        } else {
            self.protocol_violation(&event, "no scenario context attached to this task");
            Ok(())
        }
    }

    /// Current report, decorated with run options. Available while running
    /// and after finalization.
    pub fn report(&self) -> Option<RunReport> {
        let (tree, metrics) = {
            let inner = self.inner();
            (inner.tree.clone()?, inner.metrics.clone())
        };

        let mut report = tree.snapshot();
        report.title = self.options.title.clone();
        report.name = self.options.run_name.clone();
        report.system_info = self.options.system_info.clone();
        report.metrics = Some(metrics);
        Some(report)
    }

    /// Emit the finalized report through every reporter. Only the first call
    /// after finalization does anything; returns whether it emitted.
    pub fn flush(&self) -> bool {
        if self.state() != RunState::Finalized {
            warn!("Flush requested before the run finished; nothing emitted");
            return false;
        }
        if self.emitted.swap(true, Ordering::SeqCst) {
            debug!("Report already emitted; ignoring flush");
            return false;
        }

        let Some(report) = self.report() else {
            return false;
        };

        let mut written = Vec::new();
        for reporter in &self.reporters {
            match reporter.emit(&report) {
                Ok(Some(path)) => {
                    info!("{} report written to {}", reporter.name(), path.display());
                    written.push(path);
                }
                Ok(None) => {}
                Err(e) => warn!("{} reporter failed: {:#}", reporter.name(), e),
            }
        }

        if self.options.open_after_flush
            && let Some(first) = written.first()
            && let Err(e) = crate::utils::open::open_artifact(first)
        {
            warn!("Could not open report automatically: {:#}", e);
            info!("Report location: {}", first.display());
        }

        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(written);
        true
    }
}
