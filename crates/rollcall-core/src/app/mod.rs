//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてサインイン 1 回分の実行を組み立てます。
//! - builder: RunnerBuilder（起動時検証）
//! - runner: Runner（gate → discovery → scheduling → reporting）

mod builder;
mod runner;

pub use builder::{BuildError, RunnerBuilder};
pub use runner::Runner;
