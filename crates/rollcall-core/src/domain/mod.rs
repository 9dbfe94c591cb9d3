//! Domain model: items, tasks, outcomes, the retry decision and the run report.

pub mod decision;
pub mod ids;
pub mod item;
pub mod outcome;
pub mod report;
pub mod task;

pub use decision::{Decider, Decision, DefaultDecider};
pub use ids::RunId;
pub use item::Item;
pub use outcome::Outcome;
pub use report::RunReport;
pub use task::Task;
