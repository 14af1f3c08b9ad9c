//! Territory balance engine: greedy weighted account allocation, fairness
//! scoring, and a discrete search for the fairest blend of balance weights.

pub mod account;
pub mod allocator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fairness;
pub mod generator;
pub mod optimizer;
pub mod plan;
pub mod rng;
pub mod roster;
pub mod segment;
pub mod sweep;
pub mod types;
pub mod weights;
