//! Domain types for TickLab

pub mod account;
pub mod ids;
pub mod order;
pub mod position;
pub mod signal;
pub mod tick;

pub use account::Account;
pub use ids::{ConfigHash, DatasetHash, StrategyKey};
pub use order::{Order, OrderError, OrderStatus};
pub use position::{Position, PositionError};
pub use signal::{Side, Signal};
pub use tick::{canonical_timestamp, sort_ticks, Tick};

/// Symbol type alias
pub type Symbol = String;
