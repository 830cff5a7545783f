//! Mandala Engine: metrics-state core for an ethical-choice narrative simulator.
//!
//! A linear walk through two-choice scenarios nudges ten bounded societal
//! metrics. The engine keeps the metric vector and a history ledger, and
//! derives the oracle text and chart/particle parameters that the view layer
//! renders.

pub mod core;
pub mod schema;
