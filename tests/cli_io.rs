// SPDX-License-Identifier: PMPL-1.0-or-later

//! Exercises the one layer `tests/benchmarks.rs` deliberately skips: real
//! file-path input, via `build_design_from_path` (UTF-8 read, the
//! Windows-1252 fallback decode, and the missing-file error path). This is
//! the test `tempfile` is a dev-dependency for.

use std::fs;
use vracer::{build_design_from_path, detect_races, DetectOptions, RaceKind, VracerError};

#[test]
fn reads_a_utf8_file_from_disk_and_detects_its_races() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.v");
    fs::write(
        &path,
        "module m;\n\
         reg count1;\n\
         wire clk;\n\
         initial count1 = count1 + 1;\n\
         always @(posedge clk) count1 = count1 + 1;\n\
         endmodule\n",
    )
    .unwrap();

    let (design, diags) = build_design_from_path(&path).unwrap();
    assert!(diags.is_empty(), "clk/count1 are both declared: {diags:?}");
    let records = detect_races(&design, DetectOptions::default());
    assert!(records.iter().any(|r| r.kind == RaceKind::Ww && r.target_signal == "count1"));
}

#[test]
fn non_utf8_bytes_fall_back_to_windows_1252_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.v");
    // A comment containing a byte (0x93, "left double quote" in cp1252) that
    // is not valid UTF-8 on its own; the module body itself stays ASCII so
    // parsing succeeds regardless of which way the comment text decodes.
    let mut bytes = b"// legacy note \x93quoted\x94\nmodule m;\ninitial count1++;\nendmodule\n".to_vec();
    assert!(std::str::from_utf8(&bytes).is_err(), "fixture must actually be non-UTF-8");
    fs::write(&path, &mut bytes).unwrap();

    let (design, _diags) = build_design_from_path(&path).expect("windows-1252 fallback should still parse");
    assert_eq!(design.modules.len(), 1);
    assert_eq!(design.modules[0].name, "m");
}

#[test]
fn a_missing_path_is_reported_as_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does_not_exist.v");
    let err = build_design_from_path(&missing).unwrap_err();
    assert!(matches!(err, VracerError::IoError(_)));
}
