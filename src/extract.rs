// SPDX-License-Identifier: PMPL-1.0-or-later

//! Structural extractor: isolates `module...endmodule` spans and, within
//! each, the top-level process constructs (`always*`, `initial`, `final`).
//!
//! This is token-oriented, not a full Verilog parser: it strips comments and
//! string-literal-aware quoting, tracks `begin/end`, `fork/join*`, and
//! `case/endcase` nesting only well enough to find matching boundaries, and
//! recognizes back-tick directives as line-level no-ops.

use crate::types::VracerError;

const PROCESS_KEYWORDS: &[&str] = &["always_ff", "always_comb", "always_latch", "always", "initial", "final"];

/// A parsed `module...endmodule` span: header text plus the raw process
/// constructs found at the top level of its body.
pub struct RawModule {
    pub name: String,
    /// Text from `module` through the header-terminating `;` (name, optional
    /// `#(...)` parameter port list, optional `(...)` port list) — the only
    /// text `crate::declare` needs to recover parameters and ANSI ports.
    pub header: String,
    /// The module body with every top-level process's own span blanked out,
    /// so `crate::declare`'s net-declaration scan never mistakes a
    /// process-local reference for a module-level declaration.
    pub body_for_decls: String,
    pub processes: Vec<RawProcess>,
}

/// One process construct located inside a module body, not yet interpreted.
pub struct RawProcess {
    pub keyword: String,
    /// Raw text inside `@(...)`, the literal `"*"` for `@*`/`@(*)`, or `None`.
    pub sensitivity: Option<String>,
    pub body: String,
    pub keyword_offset: usize,
}

/// Split source text into module spans and, within each, process constructs.
pub fn extract_modules(source: &str) -> Result<Vec<RawModule>, VracerError> {
    let cleaned = clean_source(source);
    let chars: Vec<char> = cleaned.chars().collect();
    let toks = tokenize(&chars);

    let mut modules = Vec::new();
    let mut idx = 0;
    while idx < toks.len() {
        if toks[idx].text != "module" {
            idx += 1;
            continue;
        }
        let header_start = toks[idx].start;
        if idx + 1 >= toks.len() {
            return Err(VracerError::parse("module missing name", header_start));
        }
        let name = toks[idx + 1].text.clone();

        // Header runs from `module` to the first top-level `;` (covers an
        // optional `#( ... )` parameter port list and `( ... )` port list).
        let mut k = header_start;
        let mut paren_depth = 0i32;
        while k < chars.len() {
            match chars[k] {
                '(' => paren_depth += 1,
                ')' => paren_depth -= 1,
                ';' if paren_depth == 0 => break,
                _ => {}
            }
            k += 1;
        }
        if k >= chars.len() {
            return Err(VracerError::parse(
                format!("module '{name}' missing header terminator ';'"),
                header_start,
            ));
        }
        let header_end = k;

        let mut m = idx + 1;
        while m < toks.len() && toks[m].start <= header_end {
            m += 1;
        }

        let mut depth = 0i32;
        let mut endmodule_tok = None;
        let mut scan = m;
        while scan < toks.len() {
            match toks[scan].text.as_str() {
                "begin" | "fork" | "case" | "casex" | "casez" => depth += 1,
                "end" | "join" | "join_any" | "join_none" | "endcase" => {
                    if depth == 0 {
                        return Err(VracerError::parse(
                            format!("unbalanced '{}' in module '{}'", toks[scan].text, name),
                            toks[scan].start,
                        ));
                    }
                    depth -= 1;
                }
                "module" => {
                    return Err(VracerError::parse(
                        "nested module declarations are not supported",
                        toks[scan].start,
                    ));
                }
                "endmodule" => {
                    if depth != 0 {
                        return Err(VracerError::parse(
                            format!("unbalanced block nesting in module '{name}'"),
                            toks[scan].start,
                        ));
                    }
                    endmodule_tok = Some(scan);
                    break;
                }
                _ => {}
            }
            scan += 1;
        }
        let end_tok = endmodule_tok
            .ok_or_else(|| VracerError::parse(format!("module '{name}' missing endmodule"), header_start))?;
        let body_end = toks[end_tok].start;

        let header: String = chars[header_start..=header_end].iter().collect();
        let (processes, spans) = split_processes(&chars, &toks[m..end_tok], header_end + 1, body_end)?;
        let body_for_decls = blank_spans(&chars, header_end + 1, body_end, &spans);
        modules.push(RawModule { name, header, body_for_decls, processes });

        idx = end_tok + 1;
    }
    Ok(modules)
}

/// Render `chars[from..to]` as a string with every `(start, end)` span in
/// `spans` replaced by spaces, preserving newlines so line-oriented errors
/// elsewhere still land close to the right place.
fn blank_spans(chars: &[char], from: usize, to: usize, spans: &[(usize, usize)]) -> String {
    let mut out: Vec<char> = chars[from..to].to_vec();
    for &(start, end) in spans {
        let start = start.max(from) - from;
        let end = end.min(to) - from;
        for c in out.iter_mut().take(end).skip(start) {
            if *c != '\n' {
                *c = ' ';
            }
        }
    }
    out.into_iter().collect()
}

fn split_processes(
    chars: &[char],
    body_toks: &[Tok],
    _body_start: usize,
    body_end: usize,
) -> Result<(Vec<RawProcess>, Vec<(usize, usize)>), VracerError> {
    let mut out = Vec::new();
    let mut spans = Vec::new();
    let mut i = 0usize;
    while i < body_toks.len() {
        let tok = &body_toks[i];
        if !PROCESS_KEYWORDS.contains(&tok.text.as_str()) {
            i += 1;
            continue;
        }
        let keyword = tok.text.clone();
        let keyword_offset = tok.start;
        let mut cursor = skip_ws(chars, tok.start + keyword.chars().count());

        let sensitivity = if cursor < chars.len() && chars[cursor] == '@' {
            cursor += 1;
            cursor = skip_ws(chars, cursor);
            if cursor < chars.len() && chars[cursor] == '*' {
                cursor += 1;
                Some("*".to_string())
            } else if cursor < chars.len() && chars[cursor] == '(' {
                let open = cursor;
                let close = matching_paren(chars, open)?;
                let inner: String = chars[open + 1..close].iter().collect();
                cursor = close + 1;
                Some(inner.trim().to_string())
            } else {
                let (ident, next) = scan_identifier(chars, cursor);
                cursor = next;
                Some(ident)
            }
        } else {
            None
        };

        cursor = skip_ws(chars, cursor);
        let (body_text, next_pos) = if starts_with_word(chars, cursor, "begin") {
            let begin_word_end = cursor + 5;
            let (inner_start, inner_end, after) = matching_begin_end(chars, begin_word_end)?;
            (chars[inner_start..inner_end].iter().collect::<String>(), after)
        } else {
            let stmt_end = find_statement_end(chars, cursor)?;
            (chars[cursor..=stmt_end].iter().collect::<String>(), stmt_end + 1)
        };

        out.push(RawProcess {
            keyword,
            sensitivity,
            body: body_text,
            keyword_offset,
        });
        spans.push((keyword_offset, next_pos));

        // advance token index past next_pos
        while i < body_toks.len() && body_toks[i].start < next_pos {
            i += 1;
        }
        let _ = body_end;
    }
    Ok((out, spans))
}

fn matching_paren(chars: &[char], open: usize) -> Result<usize, VracerError> {
    let mut depth = 0i32;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(VracerError::parse("unbalanced parenthesis in sensitivity list", open))
}

/// Given the offset just after a `begin` keyword, find the matching `end`,
/// accounting for nested `begin/end`, `fork/join*`, and `case/endcase`.
/// Returns (inner_start, inner_end, offset_after_end_keyword).
fn matching_begin_end(chars: &[char], after_begin: usize) -> Result<(usize, usize, usize), VracerError> {
    let mut depth = 1i32;
    let inner_start = after_begin;
    let mut i = after_begin;
    while i < chars.len() {
        if let Some((word, next)) = peek_word(chars, i) {
            match word.as_str() {
                "begin" | "fork" | "case" | "casex" | "casez" => depth += 1,
                "end" | "join" | "join_any" | "join_none" | "endcase" => {
                    depth -= 1;
                    if depth == 0 && (word == "end" || word.starts_with("join")) {
                        return Ok((inner_start, i, next));
                    }
                }
                _ => {}
            }
            i = next;
        } else {
            i += 1;
        }
    }
    Err(VracerError::parse("unbalanced 'begin' with no matching 'end'", after_begin))
}

/// Find the offset of the `;` terminating a single (non-`begin`) statement,
/// respecting parenthesis depth.
fn find_statement_end(chars: &[char], start: usize) -> Result<usize, VracerError> {
    let mut depth = 0i32;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth == 0 => return Ok(i),
            _ => {}
        }
        i += 1;
    }
    Err(VracerError::parse("statement missing terminating ';'", start))
}

fn peek_word(chars: &[char], i: usize) -> Option<(String, usize)> {
    if !(chars[i].is_ascii_alphabetic() || chars[i] == '_') {
        return None;
    }
    let (ident, next) = scan_identifier(chars, i);
    Some((ident, next))
}

fn scan_identifier(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    let mut s = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
        s.push(chars[i]);
        i += 1;
    }
    (s, i)
}

fn starts_with_word(chars: &[char], i: usize, word: &str) -> bool {
    let w: Vec<char> = word.chars().collect();
    if i + w.len() > chars.len() {
        return false;
    }
    if chars[i..i + w.len()] != w[..] {
        return false;
    }
    let after = i + w.len();
    after >= chars.len() || !(chars[after].is_ascii_alphanumeric() || chars[after] == '_')
}

fn skip_ws(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

struct Tok {
    text: String,
    start: usize,
}

fn tokenize(chars: &[char]) -> Vec<Tok> {
    let mut toks = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() || chars[i] == '_' {
            let start = i;
            let (text, next) = scan_identifier(chars, start);
            toks.push(Tok { text, start });
            i = next;
        } else {
            i += 1;
        }
    }
    toks
}

/// Strip `//` / `/* */` comments (string-literal aware) and back-tick
/// compiler-directive lines, replacing removed content with spaces/newlines
/// so character offsets are preserved.
fn clean_source(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    let mut in_string = false;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '"' && (i == 0 || chars[i - 1] != '\\') {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }
        if c == '`' {
            while i < chars.len() && chars[i] != '\n' {
                out.push(' ');
                i += 1;
            }
            continue;
        }
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                out.push(' ');
                i += 1;
            }
            continue;
        }
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            out.push(' ');
            out.push(' ');
            i += 2;
            while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                out.push(if chars[i] == '\n' { '\n' } else { ' ' });
                i += 1;
            }
            if i + 1 < chars.len() {
                out.push(' ');
                out.push(' ');
                i += 2;
            } else {
                i = chars.len();
            }
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}
