//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はテストで fake に差し替えるための継ぎ目です。
//! 実装は [`crate::impls`] にあります。

pub mod clock;
pub mod discovery;
pub mod executor;
pub mod gate;
pub mod reporter;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::discovery::Discovery;
pub use self::executor::Executor;
pub use self::gate::StartGate;
pub use self::reporter::Reporter;
