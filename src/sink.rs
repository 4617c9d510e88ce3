//! Result sinks
//!
//! Every boolean a measured operation computes is handed to a sink so the
//! optimizer cannot prove the value unused and delete the work.

use std::cell::Cell;
use std::hint::black_box;

/// Consumption point for measured results
pub trait ResultSink {
    fn consume(&self, value: bool);
}

/// Discards results through an opaque, never-inlined call
#[derive(Debug, Clone, Copy, Default)]
pub struct Blackhole;

impl ResultSink for Blackhole {
    #[inline(never)]
    fn consume(&self, value: bool) {
        black_box(value);
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &S {
    #[inline]
    fn consume(&self, value: bool) {
        (**self).consume(value)
    }
}

/// Counts consumed results; thread-confined like the fixture
#[derive(Debug, Default)]
pub struct Tally {
    trues: Cell<u64>,
    falses: Cell<u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trues(&self) -> u64 {
        self.trues.get()
    }

    pub fn falses(&self) -> u64 {
        self.falses.get()
    }

    pub fn total(&self) -> u64 {
        self.trues() + self.falses()
    }

    pub fn reset(&self) {
        self.trues.set(0);
        self.falses.set(0);
    }
}

impl ResultSink for Tally {
    #[inline(never)]
    fn consume(&self, value: bool) {
        let slot = if black_box(value) { &self.trues } else { &self.falses };
        slot.set(slot.get() + 1);
    }
}
