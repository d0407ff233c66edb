//! End-to-end tests against the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn i3ctl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("i3ctl").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("I3CTL_LOG_FILE");
    cmd
}

#[test]
fn help_lists_the_command_areas() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("volume"))
        .stdout(predicate::str::contains("workspace"))
        .stdout(predicate::str::contains("startup"));
}

#[test]
fn version_prints_and_succeeds() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("i3ctl"));
}

#[test]
fn no_arguments_shows_help_and_fails() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommand_is_a_parse_error() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn completions_emit_a_bash_script() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("i3ctl"));
}

#[test]
fn missing_i3_config_fails_with_a_message() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .args(["config", "path"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("i3ctl:"));
}

#[test]
fn keybind_list_reads_a_pointed_to_config() {
    let home = TempDir::new().unwrap();
    let i3_config = home.path().join("i3config");
    std::fs::write(
        &i3_config,
        "set $mod Mod4\nbindsym $mod+Return exec i3-sensible-terminal\n",
    )
    .unwrap();
    let store = home.path().join("i3ctl.json");
    std::fs::write(
        &store,
        format!(r#"{{"i3_config_path": "{}"}}"#, i3_config.display()),
    )
    .unwrap();

    i3ctl(&home)
        .args(["--config", &store.display().to_string(), "keybind", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$mod+Return"));
}

#[test]
fn startup_add_then_list_round_trips() {
    let home = TempDir::new().unwrap();
    let i3_config = home.path().join("i3config");
    std::fs::write(&i3_config, "set $mod Mod4\nexec firefox\n").unwrap();
    let store = home.path().join("i3ctl.json");
    std::fs::write(
        &store,
        format!(r#"{{"i3_config_path": "{}"}}"#, i3_config.display()),
    )
    .unwrap();
    let store_arg = store.display().to_string();

    i3ctl(&home)
        .args(["--config", &store_arg, "startup", "add", "--", "nm-applet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exec_always nm-applet"));

    i3ctl(&home)
        .args(["--config", &store_arg, "startup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nm-applet"))
        .stdout(predicate::str::contains("firefox"));
}

#[test]
fn invalid_percent_is_rejected_by_the_parser() {
    let home = TempDir::new().unwrap();
    i3ctl(&home)
        .args(["volume", "set", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
