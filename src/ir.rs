// SPDX-License-Identifier: PMPL-1.0-or-later

//! IR builder: attaches parsed processes to their enclosing module and
//! assigns stable, source-order labels.

use crate::declare;
use crate::extract::extract_modules;
use crate::process::{parse_process, process_kind};
use crate::types::{AnalysisResult, Design, Diagnostic, DiagnosticKind, Module, NetKind, VracerError};
use std::collections::{BTreeSet, HashMap};

/// Parse source text into a `Design`, collecting any non-fatal diagnostics
/// raised along the way. Returns a fatal `VracerError` only for structural
/// problems the extractor cannot route around (unbalanced nesting, missing
/// `endmodule`, unreadable input).
pub fn build_design(source: &str) -> AnalysisResult {
    let raw_modules = extract_modules(source)?;
    let mut diagnostics = Vec::new();
    let mut modules = Vec::with_capacity(raw_modules.len());

    for raw in raw_modules {
        let mut module = Module::new(raw.name);
        module.parameters = declare::parameters(&raw.header);
        module.nets = declare::nets(&raw.header);
        module.nets.extend(declare::nets(&raw.body_for_decls));

        let mut ordinal_by_stem: HashMap<&'static str, usize> = HashMap::new();

        for raw_process in &raw.processes {
            let kind = process_kind(&raw_process.keyword);
            let stem = kind.label_stem();
            let ordinal = ordinal_by_stem.entry(stem).or_insert(0);
            let label = format!("c_{stem}_{ordinal}");
            *ordinal += 1;

            let (process, diags) = parse_process(raw_process, kind, label);
            diagnostics.extend(diags);
            module.processes.push(process);
        }

        diagnostics.extend(unresolved_signal_diagnostics(&module));
        modules.push(module);
    }

    Ok((Design { modules }, diagnostics))
}

/// One diagnostic per distinct signal name referenced in `module` but never
/// declared as a net or parameter (§9: kept and analyzed by name only,
/// but never silently dropped).
fn unresolved_signal_diagnostics(module: &Module) -> Vec<Diagnostic> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for process in &module.processes {
        for reference in &process.references {
            let name = reference.signal.as_str();
            let declared = module.net_kind(name) != NetKind::Unresolved
                || module.parameters.iter().any(|(p, _)| p == name);
            if !declared && seen.insert(name.to_string()) {
                out.push(Diagnostic {
                    kind: DiagnosticKind::UnresolvedSignal,
                    message: format!("signal '{name}' in module '{}' was never declared", module.name),
                    offset: None,
                });
            }
        }
    }
    out
}

/// Read a file from disk and build its `Design`. Non-UTF-8 input falls back
/// to a best-effort Windows-1252 decode rather than failing outright.
pub fn build_design_from_path(path: &std::path::Path) -> AnalysisResult {
    let bytes = std::fs::read(path).map_err(VracerError::IoError)?;
    let source = match std::str::from_utf8(&bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    build_design(&source)
}
