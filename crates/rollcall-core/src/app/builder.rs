//! RunnerBuilder - Runner の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）：設定ミスのある Runner は gate まで到達しない
//! - 省略可能な port のデフォルト実装

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::domain::Decider;
use crate::error::ConfigError;
use crate::impls::{ImmediateGate, NoopReporter};
use crate::ports::{Clock, Discovery, Executor, Reporter, StartGate, SystemClock};
use crate::scheduler::Scheduler;

use super::Runner;

/// RunnerBuilder は Runner を構築
///
/// # 使用例
/// ```ignore
/// let runner = RunnerBuilder::new()
///     .config(settings.scheduler_config()?)
///     .executor(Arc::new(MyExecutor))
///     .discovery(Arc::new(StaticDiscovery::new(items)))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - executor と discovery は必須、無ければ BuildError
/// - build() 時に SchedulerConfig を検証
/// - gate / reporter / clock は省略時 [`ImmediateGate`] / [`NoopReporter`] / [`SystemClock`]
pub struct RunnerBuilder {
    config: SchedulerConfig,
    executor: Option<Arc<dyn Executor>>,
    discovery: Option<Arc<dyn Discovery>>,
    gate: Arc<dyn StartGate>,
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
    decider: Option<Arc<dyn Decider>>,
}

/// BuildError は Runner 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no executor configured")]
    MissingExecutor,

    #[error("no discovery configured")]
    MissingDiscovery,

    #[error("invalid scheduler config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            executor: None,
            discovery: None,
            gate: Arc::new(ImmediateGate),
            reporter: Arc::new(NoopReporter),
            clock: Arc::new(SystemClock),
            decider: None,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn Discovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn gate(mut self, gate: Arc<dyn StartGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Clock used to stamp the run. Independent of the gate's clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the default retry policy. A retry requested once
    /// `max_attempts` is used up is still turned into a failure.
    pub fn decider(mut self, decider: Arc<dyn Decider>) -> Self {
        self.decider = Some(decider);
        self
    }

    pub fn build(self) -> Result<Runner, BuildError> {
        self.config.validate()?;
        let executor = self.executor.ok_or(BuildError::MissingExecutor)?;
        let discovery = self.discovery.ok_or(BuildError::MissingDiscovery)?;

        let scheduler = match self.decider {
            Some(decider) => Scheduler::with_decider(self.config, executor, decider),
            None => Scheduler::new(self.config, executor),
        };

        Ok(Runner {
            gate: self.gate,
            discovery,
            reporter: self.reporter,
            clock: self.clock,
            scheduler,
        })
    }
}

impl Default for RunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
