// SPDX-License-Identifier: PMPL-1.0-or-later

//! vracer — static race-hazard detection for Verilog / Verilog-AMS.
//!
//! Analyzes event-driven HDL source for three families of simulation race
//! hazards: **Write-Write** (two processes blocking-assign the same net),
//! **Read-Write** (a process reads a net another blocking-writes), and
//! **Trigger** (two processes share a sensitivity event and touch an
//! overlapping net).
//!
//! PIPELINE:
//! 1. [`extract`] — locates module boundaries and top-level process constructs.
//! 2. [`process`] — parses each process's sensitivity, assignments, and anchors.
//! 3. [`ir`] — assembles the per-file `Design`.
//! 4. [`detect`] — computes the three hazard relations over the `Design`.
//! 5. [`aggregate`] — deduplicates and sorts the result for stable output.

pub mod aggregate;
pub mod declare;
pub mod detect;
pub mod diagnostics;
pub mod extract;
pub mod ir;
pub mod process;
pub mod types;

pub use detect::detect as detect_races;
pub use ir::{build_design, build_design_from_path};
pub use types::{AnalysisResult, Design, DetectOptions, Diagnostic, RaceKind, RaceRecord, VracerError};
