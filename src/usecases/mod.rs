//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the scanner's workflows.
//!
//! Use cases:
//! - `ArbitrageScanner`: fetch, match, detect and rank, once or on an interval

pub mod scanner;

pub use scanner::{ArbitrageScanner, CycleStatus, ScanReport, VenueSummary};
