//! Integration tests for rcforge-cli.
//!
//! Every test runs the built binary against files in a temporary directory,
//! with a settings file of its own.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Memory unit named "LOOP 1": one track, master, one delay slot.
fn memory(pan: &str, level: &str) -> String {
    let mut name = String::new();
    for (i, code) in [76, 79, 79, 80, 32, 49, 32, 32, 32, 32, 32, 32].iter().enumerate() {
        let tag = (b'A' + i as u8) as char;
        name.push_str(&format!("\t<{tag}>{code}</{tag}>\n"));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<database name=\"RC-505MK2\" revision=\"0\">\n<mem id=\"0\">\n<NAME>\n{name}</NAME>\n<TRACK1>\n\t<A>0</A>\n\t<B>0</B>\n\t<C>{pan}</C>\n\t<D>100</D>\n</TRACK1>\n<MASTER>\n\t<A>{level}</A>\n\t<B>0</B>\n</MASTER>\n</mem>\n<ifx id=\"0\">\n<SETUP>\n\t<A>0</A>\n</SETUP>\n<AA>\n\t<A>1</A>\n\t<B>0</B>\n\t<C>35</C>\n\t<D>0</D>\n</AA>\n<AA_DELAY>\n\t<A>400</A>\n\t<B>20</B>\n\t<C>50</C>\n</AA_DELAY>\n</ifx>\n</database>\n<count>0003</count>\n"
    )
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("read output")
    }

    /// Run `rcforge` with this workspace's settings file.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_rcforge"))
            .arg("--config")
            .arg(self.dir.path().join("settings.toml"))
            .args(args)
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .output()
            .expect("failed to run rcforge")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn s(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn cli_show_lists_fields() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["show", s(&file)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("\"LOOP 1\""), "{out}");
    assert!(out.contains("count 0003"), "{out}");
    assert!(out.contains("[TRACK1] TRACK"), "{out}");
    assert!(out.contains("[ifx.AA_DELAY] DELAY"), "{out}");
}

#[test]
fn cli_show_section_json() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["show", s(&file), "-s", "TRACK1", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(json["name"], "LOOP 1");
    assert_eq!(json["count"], 3);
    assert_eq!(json["sections"]["TRACK1"]["pan"], "50");
    assert!(json["sections"].get("MASTER").is_none());
}

#[test]
fn cli_set_writes_and_counts() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["set", s(&file), "TRACK1.pan", "75"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("TRACK1.pan: 50 -> 75"));
    assert_eq!(ws.read(&file), memory("75", "100").replace("0003", "0004"));
}

#[test]
fn cli_set_out_of_range_leaves_file() {
    let ws = Workspace::new();
    let original = memory("50", "100");
    let file = ws.file("m.rc0", &original);
    let output = ws.run(&["set", s(&file), "TRACK1.pan", "150"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("outside the allowed range"), "{}", stderr(&output));
    assert_eq!(ws.read(&file), original);
}

#[test]
fn cli_set_dry_run_writes_nothing() {
    let ws = Workspace::new();
    let original = memory("50", "100");
    let file = ws.file("m.rc0", &original);
    let output = ws.run(&["set", s(&file), "MASTER.level", "120", "-n"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("(dry-run)"), "{out}");
    assert!(out.contains("MASTER.level: 100 -> 120"), "{out}");
    assert_eq!(ws.read(&file), original);
}

#[test]
fn cli_set_to_output_file() {
    let ws = Workspace::new();
    let original = memory("50", "100");
    let file = ws.file("m.rc0", &original);
    let out_file = ws.dir.path().join("out.rc0");
    let output = ws.run(&["set", s(&file), "ifx.AA_DELAY.time", "500", "-o", s(&out_file)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(ws.read(&file), original);
    assert!(ws.read(&out_file).contains("<A>500</A>"));
}

#[test]
fn cli_name_renames() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["name", s(&file), "BASS"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let shown = stdout(&ws.run(&["show", s(&file), "-s", "NAME"]));
    assert!(shown.contains("\"BASS\""), "{shown}");
}

#[test]
fn cli_fx_shows_active_effect() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["fx", s(&file), "--group", "ifx", "--slot", "aa"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("ifx (bank A)"), "{out}");
    assert!(out.contains("DELAY"), "{out}");
    assert!(out.contains("[AA_DELAY]"), "{out}");
    assert!(out.contains("time"), "{out}");
}

#[test]
fn cli_diff_reports_changed_fields() {
    let ws = Workspace::new();
    let a = ws.file("a.rc0", &memory("50", "100"));
    let b = ws.file("b.rc0", &memory("75", "120"));
    let output = ws.run(&["diff", s(&a), s(&b)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("TRACK1.pan: 50 -> 75"), "{out}");
    assert!(out.contains("2 difference(s)"), "{out}");

    let output = ws.run(&["diff", s(&a), s(&b), "-s", "MASTER"]);
    assert!(stdout(&output).contains("1 difference(s)"));
}

#[test]
fn cli_copy_then_diff_is_empty() {
    let ws = Workspace::new();
    let a = ws.file("a.rc0", &memory("10", "150"));
    let b = ws.file("b.rc0", &memory("50", "100"));
    let output = ws.run(&["copy", s(&a), s(&b)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let output = ws.run(&["diff", s(&a), s(&b)]);
    assert!(stdout(&output).contains("0 difference(s)"));
}

#[test]
fn cli_clear_dry_run() {
    let ws = Workspace::new();
    let original = memory("10", "150");
    let file = ws.file("m.rc0", &original);
    let output = ws.run(&["clear", s(&file), "-n"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("TRACK1.pan: 10 -> 50"), "{out}");
    assert!(out.contains("MASTER.level: 150 -> 100"), "{out}");
    assert_eq!(ws.read(&file), original);
}

#[test]
fn cli_bulk_set_isolates_failures() {
    let ws = Workspace::new();
    let good = ws.file("good.rc0", &memory("50", "100"));
    let system = ws.file(
        "sys.rc0",
        "<database>\n<sys>\n<SETUP>\n\t<A>0</A>\n</SETUP>\n</sys>\n</database>\n<count>0001</count>\n",
    );
    let output = ws.run(&["bulk-set", "MASTER.level", "120", s(&good), s(&system)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("1 of 2 record(s) failed"), "{}", stderr(&output));
    assert!(ws.read(&good).contains("<A>120</A>"));
    assert!(ws.read(&system).ends_with("<count>0001</count>\n"));
}

#[test]
fn cli_bulk_set_skips_malformed_record() {
    let ws = Workspace::new();
    let first = ws.file("first.rc0", &memory("50", "100"));
    let bad = ws.file(
        "bad.rc0",
        "<database>\n<mem>\n<MASTER>\n\t<A>1</B>\n</MASTER>\n</mem>\n</database>\n",
    );
    let last = ws.file("last.rc0", &memory("50", "100"));
    let output = ws.run(&["bulk-set", "MASTER.level", "120", s(&first), s(&bad), s(&last)]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("1 of 3 record(s) failed"), "{err}");
    assert!(err.contains("decoding"), "{err}");
    assert!(ws.read(&first).contains("\t<A>120</A>\n\t<B>0</B>\n</MASTER>"));
    assert!(ws.read(&last).contains("\t<A>120</A>\n\t<B>0</B>\n</MASTER>"));
}

#[test]
fn cli_template_apply_skips_malformed_record() {
    let ws = Workspace::new();
    let source = ws.file("src.rc0", &memory("10", "150"));
    let template = ws.dir.path().join("mix.toml");
    let output = ws.run(&["template", "export", s(&source), s(&template), "-s", "TRACK"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let bad = ws.file("bad.rc0", "<database>\n<mem>\n<TRACK1>\n");
    let good = ws.file("good.rc0", &memory("50", "100"));
    let output = ws.run(&["template", "apply", s(&template), s(&bad), s(&good)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("1 of 2 record(s) failed"), "{}", stderr(&output));
    assert!(ws.read(&good).contains("<C>10</C>"));
}

#[test]
fn cli_template_export_apply() {
    let ws = Workspace::new();
    let source = ws.file("src.rc0", &memory("10", "150"));
    let target = ws.file("dst.rc0", &memory("50", "100"));
    let template = ws.dir.path().join("mix.toml");

    let output = ws.run(&["template", "export", s(&source), s(&template), "-s", "TRACK"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(ws.read(&template).contains("[sections.TRACK1]"));

    let output = ws.run(&["template", "apply", s(&template), s(&target)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let written = ws.read(&target);
    assert!(written.contains("<C>10</C>"), "{written}");
    // MASTER was not exported.
    assert!(written.contains("\t<A>100</A>\n\t<B>0</B>\n</MASTER>"), "{written}");
}

#[test]
fn cli_config_policy_clamps() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "--policy", "clamp"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let shown = stdout(&ws.run(&["config", "--show"]));
    assert!(shown.contains("out_of_range = \"clamp\""), "{shown}");

    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["set", s(&file), "TRACK1.pan", "150"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("TRACK1.pan: 50 -> 100"));
}

#[test]
fn cli_schema_lists_sections() {
    let ws = Workspace::new();
    let output = ws.run(&["schema"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("TRACK1..TRACK6"), "{out}");
    assert!(out.contains("DELAY"), "{out}");

    let output = ws.run(&["schema", "track"]);
    let out = stdout(&output);
    assert!(out.contains("pan"), "{out}");
    assert!(out.contains("read-only"), "{out}");
}

#[test]
fn cli_link_audio_updates_track() {
    let ws = Workspace::new();
    let file = ws.file("m.rc0", &memory("50", "100"));
    let output = ws.run(&["link-audio", s(&file), "1", "1000", "-n"]);
    // The four-field track has no audio fields to link.
    assert!(!output.status.success());
    assert!(stderr(&output).contains("TRACK1.has_audio"), "{}", stderr(&output));
}
