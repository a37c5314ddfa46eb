// SPDX-License-Identifier: PMPL-1.0-or-later

//! Process parser: turns one [`crate::extract::RawProcess`] into a fully
//! populated [`Process`] — sensitivity/trigger computation, assignment
//! classification (blocking vs. non-blocking), and anchor tracking.

use crate::extract::RawProcess;
use crate::types::{
    Anchor, AssignKind, Diagnostic, DiagnosticKind, Process, ProcessKind, SignalReference, Trigger,
};
use regex::Regex;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_$]*").unwrap())
}

fn or_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bor\b").unwrap())
}

const KEYWORDS: &[&str] = &[
    "begin", "end", "fork", "join", "join_any", "join_none", "case", "casex", "casez", "endcase",
    "default", "if", "else", "while", "for", "repeat", "disable", "assert", "wait", "posedge",
    "negedge", "or", "integer", "real", "reg", "wire", "logic", "signed", "unsigned", "input",
    "output", "inout",
];

/// Parse one raw process construct into its IR form, along with any
/// non-fatal diagnostics raised along the way. `label` is computed by the
/// IR builder, which owns per-kind ordinal numbering within a module.
pub fn parse_process(raw: &RawProcess, kind: ProcessKind, label: String) -> (Process, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let trigger_set = compute_triggers(raw, kind, &mut diagnostics);
    let entry_display = format!("{label}@{}", trigger_desc(&trigger_set));
    let mut anchors = vec![Anchor { id: 0, display: entry_display }];
    let mut references = Vec::new();

    scan_body(&raw.body, &label, &mut anchors, &mut references);

    let process = Process {
        kind,
        label,
        trigger_set,
        anchor_points: anchors,
        references,
    };
    (process, diagnostics)
}

pub(crate) fn process_kind(keyword: &str) -> ProcessKind {
    match keyword {
        "always_ff" => ProcessKind::AlwaysFF,
        "always_comb" => ProcessKind::AlwaysComb,
        "always_latch" => ProcessKind::AlwaysLatch,
        "initial" => ProcessKind::Initial,
        "final" => ProcessKind::Final,
        _ => ProcessKind::AlwaysGeneral,
    }
}

fn trigger_desc(triggers: &[Trigger]) -> String {
    triggers
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn compute_triggers(raw: &RawProcess, kind: ProcessKind, diagnostics: &mut Vec<Diagnostic>) -> Vec<Trigger> {
    match kind {
        ProcessKind::AlwaysComb | ProcessKind::AlwaysLatch => vec![Trigger::StarImplicit],
        ProcessKind::Initial | ProcessKind::Final => vec![Trigger::NoneInitial],
        ProcessKind::AlwaysFF | ProcessKind::AlwaysGeneral => match raw.sensitivity.as_deref() {
            None => {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::UnsupportedConstruct,
                    message: format!("'{}' without a sensitivity list; treated as combinational", raw.keyword),
                    offset: Some(raw.keyword_offset),
                });
                vec![Trigger::StarImplicit]
            }
            Some("*") => vec![Trigger::StarImplicit],
            Some(text) => parse_sensitivity_list(text),
        },
    }
}

fn parse_sensitivity_list(text: &str) -> Vec<Trigger> {
    if text.trim() == "*" {
        return vec![Trigger::StarImplicit];
    }
    // Split on top-level commas and the `or` keyword, then classify each
    // item by its leading edge keyword (if any).
    let items: Vec<&str> = text
        .split(|c: char| c == ',')
        .flat_map(|s| or_keyword_re().split(s))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    items
        .into_iter()
        .filter_map(|item| {
            let words: Vec<&str> = identifier_re().find_iter(item).map(|m| m.as_str()).collect();
            match words.as_slice() {
                ["posedge", sig] => Some(Trigger::EdgePos((*sig).to_string())),
                ["negedge", sig] => Some(Trigger::EdgeNeg((*sig).to_string())),
                [sig] => Some(Trigger::Level((*sig).to_string())),
                _ => None,
            }
        })
        .collect()
}

const COMPOUND_OPS: &[&str] = &["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>="];

/// Flat left-to-right scan of a process body recording reads/writes and
/// advancing the anchor at every embedded event control.
fn scan_body(body: &str, label: &str, anchors: &mut Vec<Anchor>, references: &mut Vec<SignalReference>) {
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0usize;
    let mut anchor_id: usize = 0;
    let mut paren_depth: i32 = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // `'d3`, `'hFF`, `'b1010`-style sized numeric literal bases.
        if c == '\'' {
            i += 1;
            if i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
            }
            continue;
        }

        if c == '$' {
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            continue;
        }

        if c == '@' {
            let (text, reads, next) = parse_event_expr(&chars, i + 1);
            for r in reads {
                references.push(SignalReference::read(r, anchor_id));
            }
            anchor_id += 1;
            anchors.push(Anchor {
                id: anchor_id,
                display: format!("{label}@{text}#{anchor_id}"),
            });
            i = next;
            continue;
        }

        if c == '(' {
            paren_depth += 1;
            i += 1;
            continue;
        }
        if c == ')' {
            paren_depth -= 1;
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();

            if word == "wait" {
                let after = skip_ws(&chars, i);
                if after < chars.len() && chars[after] == '(' {
                    let (text, reads, next) = parse_event_expr(&chars, after);
                    for r in reads {
                        references.push(SignalReference::read(r, anchor_id));
                    }
                    anchor_id += 1;
                    anchors.push(Anchor {
                        id: anchor_id,
                        display: format!("{label}@wait{text}#{anchor_id}"),
                    });
                    i = next;
                    continue;
                }
            }

            if word == "disable" {
                let after = skip_ws(&chars, i);
                let (_, next) = scan_word(&chars, after);
                i = next;
                continue;
            }

            if KEYWORDS.contains(&word.as_str()) {
                continue;
            }

            let (bracket_end, bracket_reads) = skip_bit_selects(&chars, i);
            let after = skip_ws(&chars, bracket_end);
            if let Some((kind, op_len, compound)) = match_assign_op(&chars, after, paren_depth) {
                references.push(SignalReference::write(word.clone(), kind, anchor_id));
                for r in &bracket_reads {
                    references.push(SignalReference::read(r.clone(), anchor_id));
                }
                if compound {
                    references.push(SignalReference::read(word, anchor_id));
                }
                i = after + op_len;
                continue;
            }
            if paren_depth == 0 && after + 1 < chars.len() && ((chars[after] == '+' && chars[after + 1] == '+') || (chars[after] == '-' && chars[after + 1] == '-')) {
                references.push(SignalReference::write(word.clone(), AssignKind::Blocking, anchor_id));
                references.push(SignalReference::read(word, anchor_id));
                for r in bracket_reads {
                    references.push(SignalReference::read(r, anchor_id));
                }
                i = after + 2;
                continue;
            }

            references.push(SignalReference::read(word, anchor_id));
            for r in bracket_reads {
                references.push(SignalReference::read(r, anchor_id));
            }
            i = bracket_end;
            continue;
        }

        i += 1;
    }
}

/// At `after`, try to match an assignment operator valid only at statement
/// level (`paren_depth == 0`) so `if (x <= y)` is not mistaken for `x <= y;`.
/// Returns (assign_kind, operator length, is_compound).
fn match_assign_op(chars: &[char], after: usize, paren_depth: i32) -> Option<(AssignKind, usize, bool)> {
    if paren_depth != 0 || after >= chars.len() {
        return None;
    }
    if chars[after] == '<' && after + 1 < chars.len() && chars[after + 1] == '=' {
        return Some((AssignKind::Nonblocking, 2, false));
    }
    for op in COMPOUND_OPS {
        let op_chars: Vec<char> = op.chars().collect();
        if after + op_chars.len() <= chars.len() && chars[after..after + op_chars.len()] == op_chars[..] {
            return Some((AssignKind::Blocking, op_chars.len(), true));
        }
    }
    if chars[after] == '=' && (after + 1 >= chars.len() || chars[after + 1] != '=') {
        return Some((AssignKind::Blocking, 1, false));
    }
    None
}

/// Skip a chain of bit/part-select brackets immediately following an
/// identifier (`count1[3]`, `mem[i][3:0]`), collecting the identifiers
/// referenced inside as reads. The base name is what's used for the
/// write/read classification that follows — bit/part selects collide with
/// the base net, they never name a distinct signal. Returns `(start, [])`
/// unchanged when there is no bracket.
fn skip_bit_selects(chars: &[char], start: usize) -> (usize, Vec<String>) {
    let mut end = start;
    let mut reads = Vec::new();
    loop {
        let probe = skip_ws(chars, end);
        if probe >= chars.len() || chars[probe] != '[' {
            return (end, reads);
        }
        let close = skip_matching_bracket(chars, probe);
        if close > probe + 1 {
            let inner: String = chars[probe + 1..close - 1].iter().collect();
            reads.extend(extract_signal_words(&inner));
        }
        end = close;
    }
}

/// `chars[open] == '['`; returns the offset just past the matching `]`.
fn skip_matching_bracket(chars: &[char], open: usize) -> usize {
    let mut depth = 0i32;
    let mut j = open;
    while j < chars.len() {
        match chars[j] {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
        j += 1;
    }
    j
}

fn skip_ws(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn scan_word(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    let s0 = i;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    (chars[s0..i].iter().collect(), i)
}

/// Parse `(expr)` or `*` starting at `start` (which points at `(` or `*`).
/// Returns (display_text, read_signal_names, offset_after_expr).
fn parse_event_expr(chars: &[char], start: usize) -> (String, Vec<String>, usize) {
    let i = skip_ws(chars, start);
    if i < chars.len() && chars[i] == '*' {
        return ("*".to_string(), Vec::new(), i + 1);
    }
    if i < chars.len() && chars[i] == '(' {
        let mut depth = 0i32;
        let mut j = i;
        let open = i;
        loop {
            if j >= chars.len() {
                return (chars[open..j].iter().collect(), Vec::new(), j);
            }
            match chars[j] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            j += 1;
        }
        let inner: String = chars[open + 1..j].iter().collect();
        let reads = extract_signal_words(&inner);
        return (format!("({})", inner.trim()), reads, j + 1);
    }
    // bare `@identifier`
    let (word, next) = scan_word(chars, i);
    (word.clone(), vec![word], next)
}

fn extract_signal_words(text: &str) -> Vec<String> {
    identifier_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|w| w != "or" && w != "posedge" && w != "negedge")
        .collect()
}
