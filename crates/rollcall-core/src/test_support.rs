//! Fakes shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Decider, Decision, Item, Outcome, RunReport, Task};
use crate::error::{DiscoveryError, GateError, ReportError};
use crate::ports::{Discovery, Executor, Reporter, StartGate};

pub(crate) fn items<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<Item> {
    keys.into_iter()
        .map(|k| Item::new(k, k.to_uppercase()))
        .collect()
}

/// Executor that replays per-key scripts and records how it was called.
pub(crate) struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    first: Option<Outcome>,
    fallback: Outcome,
    delay: Option<Duration>,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Mutex<HashMap<String, usize>>,
    running: Mutex<HashSet<String>>,
    total: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    overlaps: AtomicUsize,
}

impl ScriptedExecutor {
    pub(crate) fn new(fallback: Outcome) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            first: None,
            fallback,
            delay: None,
            cancel_after: None,
            calls: Mutex::new(HashMap::new()),
            running: Mutex::new(HashSet::new()),
            total: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        }
    }

    /// Outcomes returned for `key`, in order, before falling back.
    pub(crate) fn script(self, key: &str, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), outcomes.into_iter().collect());
        self
    }

    /// Every key's first call returns `outcome`.
    pub(crate) fn script_all_first(mut self, outcome: Outcome) -> Self {
        self.first = Some(outcome);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancel `token` once `n` calls have started.
    pub(crate) fn cancel_after_calls(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of times a key was executed while a previous call for it was
    /// still running.
    pub(crate) fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn next_outcome(&self, key: &str, call: usize) -> Outcome {
        if let Some(outcome) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        match &self.first {
            Some(first) if call == 1 => first.clone(),
            _ => self.fallback.clone(),
        }
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, item: &Item, _cancel: CancellationToken) -> Outcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let total = self.total.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.running.lock().unwrap().insert(item.key().to_string()) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(item.key().to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if let Some((n, token)) = &self.cancel_after
            && total >= *n
        {
            token.cancel();
        }

        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        let outcome = self.next_outcome(item.key(), call);
        self.running.lock().unwrap().remove(item.key());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Asks for another attempt whatever happened.
pub(crate) struct AlwaysRetry;

impl Decider for AlwaysRetry {
    fn decide(&self, _task: &Task, outcome: &Outcome) -> Decision {
        Decision::Retry {
            reason: outcome.as_label().to_string(),
        }
    }
}

pub(crate) struct PanickingExecutor;

#[async_trait]
impl Executor for PanickingExecutor {
    async fn execute(&self, item: &Item, _cancel: CancellationToken) -> Outcome {
        panic!("executor blew up on {}", item.key());
    }
}

pub(crate) struct FailingDiscovery;

#[async_trait]
impl Discovery for FailingDiscovery {
    async fn discover(&self) -> Result<Vec<Item>, DiscoveryError> {
        Err(DiscoveryError::Unavailable("listing returned 502".into()))
    }
}

pub(crate) struct FailingGate;

#[async_trait]
impl StartGate for FailingGate {
    async fn await_start(&self) -> Result<(), GateError> {
        Err(GateError::Unresolved("no clock".into()))
    }
}

/// Keeps every persisted report.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    reports: Mutex<Vec<RunReport>>,
}

impl RecordingReporter {
    pub(crate) fn reports(&self) -> Vec<RunReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn persist(&self, report: &RunReport) -> Result<(), ReportError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub(crate) struct FailingReporter;

#[async_trait]
impl Reporter for FailingReporter {
    async fn persist(&self, _report: &RunReport) -> Result<(), ReportError> {
        Err(ReportError::Encode(
            serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
        ))
    }
}
