//! The `publisher` module produces price updates: `PriceWalk` is the random
//! walk state machine and `Publisher` drives it onto the bus, once on demand
//! or on a repeating cycle.

pub mod price_walk;
pub mod publisher;

pub use price_walk::{PriceWalk, Quote};
pub use publisher::Publisher;
