//! Core data-flow library for the NYC crime-map visualizer.
//!
//! Builds the gap-free daily incident series, filters it by calendar-day
//! intervals, and provides the shared scales and map projection used by the
//! interactive front end and the headless inspector.

pub mod calendar;
pub mod geo;
pub mod ingest;
pub mod prelude;
pub mod scale;
pub mod series;

pub use prelude::{DataError, DataResult};
