//! Random walk over a price.
//!
//! Each step moves the price by a percentage drawn uniformly from
//! `[-MAX_STEP_PERCENT, MAX_STEP_PERCENT]`. Prices and percentages are kept at
//! two decimal places and the price never drops below `PRICE_FLOOR`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PRICE_FLOOR: f64 = 0.01;
pub const MAX_STEP_PERCENT: f64 = 5.0;

/// Result of one step: the new price and the move that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change_percent: f64,
}

#[derive(Debug)]
pub struct PriceWalk {
    price: f64,
    rng: StdRng,
}

impl PriceWalk {
    pub fn new(starting_price: f64) -> Self {
        Self::with_rng(starting_price, StdRng::from_entropy())
    }

    /// Reproducible walk for tests and replays.
    pub fn seeded(starting_price: f64, seed: u64) -> Self {
        Self::with_rng(starting_price, StdRng::seed_from_u64(seed))
    }

    fn with_rng(starting_price: f64, rng: StdRng) -> Self {
        Self {
            price: clamp_price(starting_price),
            rng,
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Takes one random step.
    pub fn step(&mut self) -> Quote {
        let change_percent = self.rng.gen_range(-MAX_STEP_PERCENT..=MAX_STEP_PERCENT);
        self.apply(change_percent)
    }

    /// Moves the price by `change_percent` percent.
    pub fn apply(&mut self, change_percent: f64) -> Quote {
        self.price = clamp_price(self.price * (1.0 + change_percent / 100.0));
        Quote {
            price: self.price,
            change_percent: round2(change_percent),
        }
    }

    /// Jumps straight to `price`. The reported change is relative to the
    /// previous price.
    pub fn set(&mut self, price: f64) -> Quote {
        let previous = self.price;
        self.price = clamp_price(price);
        Quote {
            price: self.price,
            change_percent: round2((self.price - previous) / previous * 100.0),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to cents and enforces the floor. Non-finite input lands on the floor.
fn clamp_price(price: f64) -> f64 {
    if !price.is_finite() {
        return PRICE_FLOOR;
    }
    round2(price).max(PRICE_FLOOR)
}
