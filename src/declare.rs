// SPDX-License-Identifier: PMPL-1.0-or-later

//! Declaration scanner: finds `parameter`/`localparam` declarations and
//! net/port declarations, populating `Module.parameters`/`Module.nets`.
//! Lexical, like the rest of the extractor — literal parameter text is kept
//! as-is, never evaluated, and declarations nested inside process bodies are
//! not visible here (the caller blanks those spans out before scanning).

use crate::types::{NetDecl, NetKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:parameter|localparam)\b\s*(?:signed\s+|unsigned\s+)?(?:\[[^\]]*\]\s*)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([^,;)]+)").unwrap()
    })
}

fn net_body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(wire|reg|integer|int|real|logic)\b\s*(?:signed\s+|unsigned\s+)?(?:\[\s*(\d+)\s*:\s*(\d+)\s*\]\s*)?([A-Za-z_][A-Za-z0-9_,\s]*?)\s*;").unwrap()
    })
}

fn net_port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:input|output|inout)\b\s*(wire|reg|integer|int|real|logic)?\s*(?:signed\s+|unsigned\s+)?(?:\[\s*(\d+)\s*:\s*(\d+)\s*\]\s*)?([A-Za-z_][A-Za-z0-9_]*)\s*(?:,|\)|;)").unwrap()
    })
}

fn net_kind_of(word: Option<&str>) -> NetKind {
    match word {
        Some("wire") | Some("logic") | None => NetKind::Wire,
        Some("reg") => NetKind::Reg,
        Some("integer") | Some("int") => NetKind::Int,
        Some("real") => NetKind::Real,
        _ => NetKind::Unresolved,
    }
}

fn width_of<'t>(hi: Option<regex::Match<'t>>, lo: Option<regex::Match<'t>>) -> u32 {
    match (hi, lo) {
        (Some(hi), Some(lo)) => {
            let hi: i64 = hi.as_str().parse().unwrap_or(0);
            let lo: i64 = lo.as_str().parse().unwrap_or(0);
            ((hi - lo).unsigned_abs() + 1) as u32
        }
        _ => 1,
    }
}

/// `parameter`/`localparam NAME = value` pairs, in the order they appear in
/// `text` (the module's port-list header, plus any body `localparam`s).
pub fn parameters(text: &str) -> Vec<(String, String)> {
    param_re()
        .captures_iter(text)
        .map(|c| (c[1].to_string(), c[2].trim().to_string()))
        .collect()
}

/// Net/port declarations found in `text`. `wire`/`reg`/`integer`/`int`/`real`
/// comma-lists terminated by `;` and ANSI `input`/`output`/`inout` port
/// declarations (net type defaults to `wire` when omitted) are both
/// recognized.
pub fn nets(text: &str) -> HashMap<String, NetDecl> {
    let mut out = HashMap::new();

    for caps in net_body_re().captures_iter(text) {
        let kind = net_kind_of(Some(&caps[1]));
        let width = width_of(caps.get(2), caps.get(3));
        for name in caps[4].split(',') {
            let name = name.trim();
            if !name.is_empty() {
                out.insert(name.to_string(), NetDecl { width, kind });
            }
        }
    }

    for caps in net_port_re().captures_iter(text) {
        let kind = net_kind_of(caps.get(1).map(|m| m.as_str()));
        let width = width_of(caps.get(2), caps.get(3));
        let name = caps[4].trim();
        out.entry(name.to_string()).or_insert(NetDecl { width, kind });
    }

    out
}
