//! Multi-replica integration tests.

pub mod cluster;

#[cfg(test)]
mod flows;
