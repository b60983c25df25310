//! Exam record aggregation.
//!
//! Groups normalized records by period and exam, and computes counts, pass
//! and fail rates and mean scores at full precision.

pub mod aggregate;
pub mod types;
pub mod utility;
