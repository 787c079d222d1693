//! Signal → Order translation.

use crate::domain::{Order, Signal, Tick};

/// Price the signal at its triggering tick. Shape only: affordability and
/// inventory are checked by the simulator.
pub fn signal_to_order(signal: &Signal, tick: &Tick) -> Order {
    Order::new(signal.symbol.clone(), signal.side, signal.quantity, tick.price)
}
