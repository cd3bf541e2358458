//! # Replica Execution Test Suite
//!
//! Cross-crate tests that run several replicas in one process.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── cluster.rs    # In-process cluster harness
//!     └── flows.rs      # Submit → commit → disseminate across replicas
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p replica-tests
//! ```

pub mod integration;
