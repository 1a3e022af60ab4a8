//! Emporium store backend: PostgreSQL persistence and domain services.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod ids;
pub mod observability;

#[cfg(test)]
mod test;
