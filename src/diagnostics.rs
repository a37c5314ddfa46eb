// SPDX-License-Identifier: PMPL-1.0-or-later

//! Diagnostic presentation: prints non-fatal [`crate::types::Diagnostic`]s
//! and fatal [`crate::types::VracerError`]s the way the teacher's own
//! self-check tool tags entries (`[TAG] message`), tinted with `colored`.

use crate::types::{Diagnostic, VracerError};
use colored::Colorize;

/// Print one file's diagnostics to stderr, prefixed with its path.
pub fn print_diagnostics(path: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{} {}: {}", "[WARN]".yellow(), path, diag);
    }
}

/// Print a fatal error to stderr, prefixed with the offending path.
pub fn print_fatal(path: &str, err: &VracerError) {
    eprintln!("{} {}: {}", "[ERR]".red(), path, err);
}
