//! Impls - ports の実装
//!
//! フォーラム固有のクライアントはここには置かない。
//! scheduler が必要とするのは [`Executor`](crate::ports::Executor) だけで、呼び出し側が用意する。

pub mod clock;
pub mod discovery;
pub mod gate;
pub mod reporter;

pub use self::clock::{HttpDateClock, parse_http_date};
pub use self::discovery::{JsonFileDiscovery, StaticDiscovery};
pub use self::gate::{ImmediateGate, MidnightGate};
pub use self::reporter::{JsonFileReporter, NoopReporter};
