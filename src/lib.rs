//! Exam pass/fail statistics from tabular exam records.
//!
//! A run is a linear pipeline: [`source`] loads raw rows, [`normalize`]
//! classifies them, [`analyzers`] aggregates, [`report`] shapes the final
//! table and [`output`] writes it. [`pipeline`] wires the stages together.

pub mod analyzers;
pub mod config;
pub mod error;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod source;
