// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for vracer's intermediate representation.
//!
//! A `Design` is the immutable result of parsing one source file: an ordered
//! list of `Module`s, each carrying its declared nets and an ordered list of
//! `Process`es. The detector in [`crate::detect`] reads a `Design` and never
//! mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A net/variable's declared kind inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetKind {
    Wire,
    Reg,
    Int,
    Real,
    /// Referenced but never declared in the parsed subset.
    Unresolved,
}

/// A declared net: width in bits (1 for scalars) and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDecl {
    pub width: u32,
    pub kind: NetKind,
}

/// One parsed Verilog/Verilog-AMS source module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Parameter name to default textual value, source order preserved via insertion.
    pub parameters: Vec<(String, String)>,
    pub nets: HashMap<String, NetDecl>,
    pub processes: Vec<Process>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            parameters: Vec::new(),
            nets: HashMap::new(),
            processes: Vec::new(),
        }
    }

    /// Look up a net's declared kind, defaulting to `Unresolved` for names
    /// never declared in this module.
    pub fn net_kind(&self, name: &str) -> NetKind {
        self.nets
            .get(name)
            .map(|decl| decl.kind)
            .unwrap_or(NetKind::Unresolved)
    }
}

/// One `module...endmodule` design unit plus everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Design {
    pub modules: Vec<Module>,
}

/// The kind of top-level process construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    AlwaysGeneral,
    AlwaysFF,
    AlwaysComb,
    AlwaysLatch,
    Initial,
    Final,
}

impl ProcessKind {
    /// Synthesized-label stem, e.g. `c_always_0`.
    pub fn label_stem(&self) -> &'static str {
        match self {
            ProcessKind::AlwaysGeneral => "always",
            ProcessKind::AlwaysFF => "always_ff",
            ProcessKind::AlwaysComb => "always_comb",
            ProcessKind::AlwaysLatch => "always_latch",
            ProcessKind::Initial => "initial",
            ProcessKind::Final => "final",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_stem())
    }
}

/// The event that schedules a process. Equality is structural: `EdgePos("clk")`
/// only matches another `EdgePos("clk")`, never `EdgeNeg("clk")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "signal")]
pub enum Trigger {
    EdgePos(String),
    EdgeNeg(String),
    Level(String),
    /// Synthesized for `always_comb`/bare `always @*`; expanded to the
    /// process's read set at detector time (see `crate::detect`).
    StarImplicit,
    /// For `initial`/`final`; excluded from trigger-race analysis.
    NoneInitial,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::EdgePos(s) => write!(f, "posedge {s}"),
            Trigger::EdgeNeg(s) => write!(f, "negedge {s}"),
            Trigger::Level(s) => write!(f, "{s}"),
            Trigger::StarImplicit => write!(f, "*"),
            Trigger::NoneInitial => write!(f, "none"),
        }
    }
}

/// A stable id for an execution point within a process: entry, or the Nth
/// embedded event control (`@(...)`/`wait(...)`).
pub type AnchorId = usize;

/// A designator for where within a process a reference occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: AnchorId,
    /// Human-readable form, e.g. `c_always_0@posedge clk`.
    pub display: String,
}

/// Read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefMode {
    Read,
    Write,
}

/// Blocking vs. non-blocking, or not applicable (reads have no assignment kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignKind {
    Blocking,
    Nonblocking,
    NotApplicable,
}

/// One read or write of a named signal, tagged with where it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalReference {
    pub signal: String,
    pub mode: RefMode,
    pub assign_kind: AssignKind,
    pub anchor: AnchorId,
}

impl SignalReference {
    pub fn read(signal: impl Into<String>, anchor: AnchorId) -> Self {
        SignalReference {
            signal: signal.into(),
            mode: RefMode::Read,
            assign_kind: AssignKind::NotApplicable,
            anchor,
        }
    }

    pub fn write(signal: impl Into<String>, assign_kind: AssignKind, anchor: AnchorId) -> Self {
        SignalReference {
            signal: signal.into(),
            mode: RefMode::Write,
            assign_kind,
            anchor,
        }
    }
}

/// One top-level concurrent construct (`always*`, `initial`, `final`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub kind: ProcessKind,
    /// Source label if present, else synthesized `c_<kind>_<index>`.
    pub label: String,
    pub trigger_set: Vec<Trigger>,
    pub anchor_points: Vec<Anchor>,
    pub references: Vec<SignalReference>,
}

impl Process {
    /// All write references with the given assignment kind.
    pub fn writes_with(&self, kind: AssignKind) -> impl Iterator<Item = &SignalReference> {
        self.references
            .iter()
            .filter(move |r| r.mode == RefMode::Write && r.assign_kind == kind)
    }

    pub fn writes(&self) -> impl Iterator<Item = &SignalReference> {
        self.references.iter().filter(|r| r.mode == RefMode::Write)
    }

    pub fn reads(&self) -> impl Iterator<Item = &SignalReference> {
        self.references.iter().filter(|r| r.mode == RefMode::Read)
    }

    pub fn is_initial_like(&self) -> bool {
        self.trigger_set.iter().any(|t| *t == Trigger::NoneInitial)
    }
}

/// The three hazard classes, in the priority order used to sort output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceKind {
    Ww,
    Rw,
    Tr,
}

impl fmt::Display for RaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceKind::Ww => write!(f, "WW"),
            RaceKind::Rw => write!(f, "RW"),
            RaceKind::Tr => write!(f, "TR"),
        }
    }
}

/// A detected hazard between two processes, tied back to the shared signal
/// and the anchors at which each side's offending reference occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub kind: RaceKind,
    pub target_signal: String,
    pub source_signal: String,
    pub anchor_a: String,
    pub anchor_b: String,
    pub process_a: String,
    pub process_b: String,
}

/// Ordering follows the sort key of §4.4 exactly: `(kind, target_signal,
/// anchor_a, anchor_b)`. `source_signal`/`process_a`/`process_b` are carried
/// for attribution but deliberately excluded from the key, so records that
/// tie on the spec's 4-tuple keep their original (already-deterministic)
/// relative order rather than being re-split by an incidental field.
impl PartialOrd for RaceRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RaceRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.kind, &self.target_signal, &self.anchor_a, &self.anchor_b).cmp(&(
            &other.kind,
            &other.target_signal,
            &other.anchor_a,
            &other.anchor_b,
        ))
    }
}

/// Recognized toggles for [`crate::detect::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectOptions {
    pub enable_ww: bool,
    pub enable_rw: bool,
    pub enable_tr: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        DetectOptions {
            enable_ww: true,
            enable_rw: true,
            enable_tr: true,
        }
    }
}

/// The kind of non-fatal diagnostic the parser may emit while skipping a
/// recognized-but-unhandled construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnsupportedConstruct,
    /// A signal was referenced but never declared as a net/parameter in the
    /// parsed subset; per §9, it is still analyzed by name only rather than
    /// silently dropped, and this diagnostic records that it happened.
    UnresolvedSignal,
}

/// A single non-fatal diagnostic accumulated alongside a parsed `Design`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub offset: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(off) => write!(f, "[WARN] {} (offset {off}): {}", tag(self.kind), self.message),
            None => write!(f, "[WARN] {}: {}", tag(self.kind), self.message),
        }
    }
}

fn tag(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::UnsupportedConstruct => "unsupported construct",
        DiagnosticKind::UnresolvedSignal => "unresolved signal",
    }
}

/// Fatal errors returned by the core. Never aborts the process; callers map
/// this to an exit code the way the driver in `main.rs` does.
#[derive(Debug, thiserror::Error)]
pub enum VracerError {
    #[error("input unreadable: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error at offset {offset}: {reason}")]
    ParseError { reason: String, offset: usize },
}

impl VracerError {
    pub fn parse(reason: impl Into<String>, offset: usize) -> Self {
        VracerError::ParseError {
            reason: reason.into(),
            offset,
        }
    }
}

/// The outcome of analyzing one source file: either a Design plus any
/// non-fatal diagnostics, or a fatal error. The core never panics or
/// aborts the process in response to malformed input.
pub type AnalysisResult = Result<(Design, Vec<Diagnostic>), VracerError>;
