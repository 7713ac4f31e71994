use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_umbra(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_umbra"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("umbra binary runs")
}

#[test]
fn successful_compile_exits_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("main.um"), "fn main() {}\n").expect("write source");

    let output = run_umbra(&["main.um"], dir.path());
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn failed_compile_exits_non_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("main.um"), "var x: int\n").expect("write source");

    let output = run_umbra(&["main.um"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn malformed_config_exits_non_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("main.um"), "fn main() {}\n").expect("write source");
    fs::write(dir.path().join("umbra.toml"), "entry_function = [").expect("write config");

    let output = run_umbra(&["main.um"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn wrong_extension_exits_non_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("main.txt"), "fn main() {}\n").expect("write source");

    let output = run_umbra(&["main.txt"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bad_arguments_exit_with_usage_status() {
    let dir = tempfile::tempdir().expect("temp dir");

    let output = run_umbra(&["main.um", "--config"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}
