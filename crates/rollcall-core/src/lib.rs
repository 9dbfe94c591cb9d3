//! rollcall-core
//!
//! Bounded-concurrency, retry-driven batch runner for daily forum sign-ins.
//!
//! # Modules
//! - **domain**: items, tasks, outcomes, the retry decision, run reports
//! - **ports**: seams to the outside world (Executor, Discovery, StartGate, Reporter, Clock)
//! - **scheduler**: dispatcher / collector pipeline with a concurrency limiter
//! - **app**: RunnerBuilder and the run orchestrator
//! - **impls**: concrete ports (midnight gate, HTTP Date clock, JSON files)
//! - **config**: scheduler limits and the on-disk settings file
//! - **error**: error types for every fallible port

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use app::{BuildError, Runner, RunnerBuilder};
pub use config::{SchedulerConfig, Settings};
pub use domain::{Item, Outcome, RunReport, Task};
pub use error::RunError;
