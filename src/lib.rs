//! Emporium
//!
//! Pure bill calculation for the Emporium store backend: turns a set of purchased lines and the
//! benefits available to a user into a deterministic price breakdown.

pub mod benefits;
pub mod bill;
pub mod lines;
pub mod policies;

pub mod prelude;
