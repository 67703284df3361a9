//! # Market Model
//!
//! Owns the authoritative instrument list. Prices only change through
//! [`Market::evolve_prices`], which the session calls on a fixed cadence.

use crate::models::{default_catalog, Instrument, InstrumentId, DEFAULT_HISTORY_LEN};
use log::trace;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Market {
    instruments: Vec<Instrument>,
    history_len: usize,
}

impl Default for Market {
    fn default() -> Self {
        Self::new(default_catalog(), DEFAULT_HISTORY_LEN)
    }
}

impl Market {
    pub fn new(instruments: Vec<Instrument>, history_len: usize) -> Self {
        Self {
            instruments,
            history_len,
        }
    }

    pub fn lookup(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.iter().find(|inst| inst.id() == id)
    }

    /// Current price of an instrument, if it exists.
    pub fn price_of(&self, id: InstrumentId) -> Option<f64> {
        self.lookup(id).map(Instrument::price)
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Owned copy of every instrument, as sent in `init` and `prices` frames.
    pub fn snapshot(&self) -> Vec<Instrument> {
        self.instruments.clone()
    }

    /// Runs one tick: every price moves by a uniform draw in
    /// `[-max_move, max_move)` and is floored at `PRICE_FLOOR`.
    pub fn evolve_prices<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for inst in &mut self.instruments {
            let delta = rng.gen_range(-1.0..1.0) * inst.max_move();
            let price = inst.apply_move(delta, self.history_len);
            trace!("{} ({}) -> {:.4}", inst.name(), inst.id(), price);
        }
    }
}
