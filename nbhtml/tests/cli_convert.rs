//! CLI tests for the `nbhtml` binary.
//!
//! Spawns the binary against scratch trees and verifies exit codes and what
//! the converter command received.

use std::fs;
use std::process::Command;

use nbhtml::exit_codes;
use nbhtml::test_support::TempTree;

fn nbhtml(tree: &TempTree) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nbhtml"));
    cmd.current_dir(tree.root()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_root_exits_with_invalid_code() {
    let tree = TempTree::new().expect("tree");

    let output = nbhtml(&tree)
        .args(["--root", "missing"])
        .output()
        .expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read root"), "stderr: {stderr}");
}

#[test]
fn default_root_is_learning_directory() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");

    let output = nbhtml(&tree).arg("--dry-run").output().expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "jupyter nbconvert learning/a.ipynb --to html --output-dir learning-html\n"
    );
}

#[test]
fn dry_run_prints_one_line_per_notebook() {
    let tree = TempTree::new().expect("tree");
    tree.touch("nb/a.ipynb").expect("a");
    tree.touch("nb/sub/b.ipynb").expect("b");
    tree.touch("nb/c.txt").expect("c");

    let output = nbhtml(&tree)
        .args(["--root", "nb", "--output-dir", "out", "--dry-run"])
        .output()
        .expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "jupyter nbconvert nb/a.ipynb --to html --output-dir out",
            "jupyter nbconvert nb/sub/b.ipynb --to html --output-dir out",
        ]
    );
    assert!(!tree.root().join("out").exists());
}

#[test]
fn config_file_is_loaded_from_working_directory() {
    let tree = TempTree::new().expect("tree");
    tree.touch("docs/readme.md").expect("md");
    fs::write(
        tree.root().join("nbhtml.toml"),
        "root = \"docs\"\nextension = \"md\"\ncommand = [\"pandoc\", \"{input}\"]\n",
    )
    .expect("write config");

    let output = nbhtml(&tree).arg("--dry-run").output().expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "pandoc docs/readme.md\n"
    );
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let tree = TempTree::new().expect("tree");
    fs::write(tree.root().join("nbhtml.toml"), "timeout_secs = 0\n").expect("write config");

    let status = nbhtml(&tree).status().expect("run nbhtml");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn missing_converter_is_ignored_by_default() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");

    let status = nbhtml(&tree)
        .args(["--", "nbhtml-test-no-such-converter", "{input}"])
        .status()
        .expect("run nbhtml");

    assert_eq!(status.code(), Some(exit_codes::OK));
}

#[test]
fn missing_converter_fails_in_strict_mode() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");
    tree.touch("learning/b.ipynb").expect("b");

    let output = nbhtml(&tree)
        .args(["--strict", "--", "nbhtml-test-no-such-converter", "{input}"])
        .output()
        .expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 2 conversions failed"), "stderr: {stderr}");
    assert!(stderr.contains("a.ipynb"), "stderr: {stderr}");
    assert!(stderr.contains("b.ipynb"), "stderr: {stderr}");
}

#[test]
fn strict_failures_are_printed_with_logging_disabled() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");

    let output = nbhtml(&tree)
        .env("RUST_LOG", "off")
        .args(["--strict", "--", "nbhtml-test-no-such-converter", "{input}"])
        .output()
        .expect("run nbhtml");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr
            .lines()
            .any(|line| line.starts_with("error: learning/a.ipynb: failed to start")),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("1 of 1 conversions failed"), "stderr: {stderr}");
}

#[test]
fn cli_value_fixes_invalid_config_value() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");
    fs::write(tree.root().join("nbhtml.toml"), "timeout_secs = 0\n").expect("write config");

    let status = nbhtml(&tree)
        .args(["--timeout-secs", "5", "--dry-run"])
        .status()
        .expect("run nbhtml");

    assert_eq!(status.code(), Some(exit_codes::OK));
}

#[cfg(unix)]
#[test]
fn paths_with_spaces_reach_converter_as_single_argument() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/my notes/week 1; $(true).ipynb")
        .expect("notebook");

    // The converter script records its argument count and input path.
    let status = nbhtml(&tree)
        .args([
            "--strict",
            "--output-dir",
            "html out",
            "--",
            "sh",
            "-c",
            "mkdir -p \"$2\" && printf '%s\\n%s\\n' \"$#\" \"$1\" > \"$2/args.txt\"",
            "sh",
            "{input}",
            "{output_dir}",
        ])
        .status()
        .expect("run nbhtml");

    assert_eq!(status.code(), Some(exit_codes::OK));
    let recorded = fs::read_to_string(tree.root().join("html out/args.txt")).expect("args");
    assert_eq!(recorded, "2\nlearning/my notes/week 1; $(true).ipynb\n");
}

#[cfg(unix)]
#[test]
fn failing_converter_exit_status_depends_on_strict() {
    let tree = TempTree::new().expect("tree");
    tree.touch("learning/a.ipynb").expect("a");
    let failing = ["--", "sh", "-c", "echo broken notebook >&2; exit 1", "sh", "{input}"];

    let permissive = nbhtml(&tree)
        .args(["--capture-output", "1024"])
        .args(failing)
        .output()
        .expect("run nbhtml");
    assert_eq!(permissive.status.code(), Some(exit_codes::OK));
    assert!(permissive.stderr.is_empty());

    let strict = nbhtml(&tree)
        .args(["--strict", "--capture-output", "1024"])
        .args(failing)
        .output()
        .expect("run nbhtml");
    assert_eq!(strict.status.code(), Some(exit_codes::FAILED));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("exited with code 1"), "stderr: {stderr}");
    assert!(stderr.contains("broken notebook"), "stderr: {stderr}");
}
