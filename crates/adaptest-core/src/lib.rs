//! adaptest-core: Adaptive difficulty engine and question sourcing.
//!
//! This crate holds the psychometric core (3PL ability estimation and
//! difficulty selection), the domain/topic schedulers, the polymorphic
//! question sources with their fallback and retry policies, and the
//! session aggregation used for reporting.

pub mod catalog;
pub mod error;
pub mod estimator;
pub mod model;
pub mod parser;
pub mod policy;
pub mod report;
pub mod retry;
pub mod schedule;
pub mod session;
pub mod source;
pub mod statistics;
pub mod traits;
