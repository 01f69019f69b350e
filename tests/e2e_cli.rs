//! CLI end-to-end tests
//!
//! Each test writes a small project snapshot plus real audio placeholder
//! files into a temporary directory and drives the reelname binary on it.

use assert_cmd::Command;
use predicates::prelude::*;
use rn_core::ClipId;
use rn_host::{MediaHost, ProjectFile, SnapshotBuilder};
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Get a command for the reelname binary
#[allow(deprecated)]
fn reelname_cmd() -> Command {
    Command::cargo_bin("reelname").unwrap()
}

struct Fixture {
    dir: TempDir,
    project: PathBuf,
    /// Clips showing take_a.wav (dialogue, then music).
    take_a_clips: Vec<ClipId>,
}

impl Fixture {
    /// Timeline "Cut 1" at 25 fps: take_a on both tracks, take_b once, and a
    /// generated tone with no file.
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("audio");
        fs::create_dir(&audio).unwrap();
        fs::write(audio.join("take_a.wav"), "a").unwrap();
        fs::write(audio.join("take_b.wav"), "b").unwrap();

        let mut b = SnapshotBuilder::new("Short film");
        b.timeline("Cut 1", 25.0);
        let dialogue = b.audio_track("Dialogue");
        let music = b.audio_track("Music");
        let take_a = b.media(audio.join("take_a.wav"));
        let take_b = b.media(audio.join("take_b.wav"));
        let tone = b.media_without_file("Tone");

        let first = b.clip(dialogue, take_a, 0, 200);
        b.clip(dialogue, take_b, 250, 100);
        b.clip_named(dialogue, Some(tone), "Title Tone", 400, 50);
        let second = b.clip(music, take_a, 500, 200);

        let project = dir.path().join("project.json");
        fs::write(&project, b.build().to_json_pretty().unwrap()).unwrap();

        Self {
            dir,
            project,
            take_a_clips: vec![first, second],
        }
    }

    fn audio(&self, name: &str) -> PathBuf {
        self.dir.path().join("audio").join(name)
    }

    fn write_names(&self, toml: &str) -> PathBuf {
        let path = self.dir.path().join("names.toml");
        fs::write(&path, toml).unwrap();
        path
    }

    fn audio_listing(&self) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(self.dir.path().join("audio"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// A command with the project and timeline arguments filled in.
    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = reelname_cmd();
        cmd.current_dir(self.dir.path())
            .arg(subcommand)
            .arg("--project")
            .arg(&self.project)
            .args(["--timeline", "Cut 1"]);
        cmd
    }
}

const NAMES: &str = "[names]\n1 = \"Intro\"\n2 = \"Outro\"\n";

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = reelname_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = reelname_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reelname"));
}

#[test]
fn test_cli_apply_help() {
    let mut cmd = reelname_cmd();
    cmd.args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--interactive"));
}

#[test]
fn test_tracks_lists_clip_counts() {
    let fx = Fixture::new();
    fx.cmd("tracks")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Dialogue  (3 clips)"))
        .stdout(predicate::str::contains("[2] Music  (1 clip)"));
}

#[test]
fn test_inspect_shows_timecodes_and_orphans() {
    let fx = Fixture::new();
    fx.cmd("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("00:00:10:00"))
        .stdout(predicate::str::contains("3 clips"))
        .stdout(predicate::str::contains("Skipped clips (1)"))
        .stdout(predicate::str::contains("has no file path"));
}

#[test]
fn test_inspect_unknown_track_fails() {
    let fx = Fixture::new();
    fx.cmd("inspect")
        .args(["--tracks", "1,5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("audio track 5 does not exist"));
}

#[test]
fn test_plan_is_a_dry_run() {
    let fx = Fixture::new();
    let names = fx.write_names(NAMES);
    fx.cmd("plan")
        .arg("--names")
        .arg(&names)
        .assert()
        .success()
        .stdout(predicate::str::contains("01  take_a.wav -> 01-Intro.wav  (2 clips)"))
        .stdout(predicate::str::contains("02  take_b.wav -> 02-Outro.wav  (1 clip)"));

    assert_eq!(fx.audio_listing(), vec!["take_a.wav", "take_b.wav"]);
}

#[test]
fn test_plan_json() {
    let fx = Fixture::new();
    let names = fx.write_names(NAMES);
    let output = fx
        .cmd("plan")
        .arg("--names")
        .arg(&names)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["width"], 2);
    assert_eq!(plan["entries"][0]["action"]["file_name"], "01-Intro.wav");
    assert_eq!(plan["entries"][1]["action"]["display_name"], "02-Outro");
}

#[test]
fn test_plan_rejects_collisions() {
    let fx = Fixture::new();
    fs::write(fx.audio("02-Outro.wav"), "in the way").unwrap();
    let names = fx.write_names(NAMES);

    fx.cmd("plan")
        .arg("--names")
        .arg(&names)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rename plan rejected"))
        .stderr(predicate::str::contains("02-Outro.wav already exists"));
}

#[test]
fn test_names_file_index_out_of_range() {
    let fx = Fixture::new();
    let names = fx.write_names("[names]\n7 = \"Nope\"\n");
    fx.cmd("plan")
        .arg("--names")
        .arg(&names)
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_apply_renames_relinks_and_reports() {
    let fx = Fixture::new();
    let names = fx.write_names(NAMES);
    let report = fx.dir.path().join("report.json");

    fx.cmd("apply")
        .arg("--names")
        .arg(&names)
        .arg("--yes")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("[01] Applied"))
        .stdout(predicate::str::contains("2 applied, 0 failed, 0 skipped"));

    assert_eq!(fx.audio_listing(), vec!["01-Intro.wav", "02-Outro.wav"]);

    let project = ProjectFile::open(&fx.project).unwrap();
    for clip in &fx.take_a_clips {
        assert_eq!(project.host().clip(*clip).unwrap().name, "01-Intro");
    }
    let relinked = project.host().snapshot().media_pool[0].id;
    assert_eq!(
        project.host().media_path(relinked).unwrap(),
        Some(fx.audio("01-Intro.wav"))
    );

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["cancelled"], false);
    assert_eq!(report["results"][0]["outcome"], "applied");
}

#[test]
fn test_apply_failed_entry_exits_one() {
    let fx = Fixture::new();
    let names = fx.write_names(NAMES);
    fs::remove_file(fx.audio("take_b.wav")).unwrap();

    fx.cmd("apply")
        .arg("--names")
        .arg(&names)
        .arg("--yes")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[02] Failed"))
        .stdout(predicate::str::contains("1 applied, 1 failed"));

    assert_eq!(fx.audio_listing(), vec!["01-Intro.wav"]);
}

#[test]
fn test_apply_interactive_stops_on_q() {
    let fx = Fixture::new();
    fx.cmd("apply")
        .args(["--interactive", "--yes"])
        .write_stdin("Intro\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("current: take_a"))
        .stdout(predicate::str::contains("1 applied, 0 failed, 1 skipped"));

    assert_eq!(fx.audio_listing(), vec!["01-Intro.wav", "take_b.wav"]);
}

#[test]
fn test_apply_declined_changes_nothing() {
    let fx = Fixture::new();
    let names = fx.write_names(NAMES);
    fx.cmd("apply")
        .arg("--names")
        .arg(&names)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));

    assert_eq!(fx.audio_listing(), vec!["take_a.wav", "take_b.wav"]);
}

#[test]
fn test_apply_requires_a_name_source() {
    let fx = Fixture::new();
    fx.cmd("apply").assert().failure();
}

#[test]
fn test_validate_reports_warnings() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("reelname.toml");
    fs::write(&config, "[naming]\nmin_index_width = 1\n").unwrap();

    let mut cmd = reelname_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("min_index_width is 1"));
}
