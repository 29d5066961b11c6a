//! Gridded radar fields for one sweep
//!
//! A sweep is stored as a 2D grid indexed by range gate (`x`) and beam (`y`).
//! Every grid carries its own "missing" sentinel; absent data is reported as
//! `None` rather than as a magic value leaking into the algorithms.

mod field;
mod point;

pub use field::Grid;
pub use point::{GridPoint, Region};
