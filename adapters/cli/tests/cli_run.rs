use std::process::Command;

#[test]
fn small_batch_prints_a_report() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-search"))
        .args(["--trials", "4", "--side", "10", "--seed", "7", "--threads", "2"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run maze-search");

    assert!(output.status.success(), "maze-search exited with {}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf8 report");
    assert!(stdout.contains("trials                    4"), "{stdout}");
    assert!(stdout.contains("avg total steps"), "{stdout}");
}

#[test]
fn render_flag_prints_the_first_trial() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-search"))
        .args(["--trials", "1", "--side", "8", "--render"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run maze-search");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 report");
    assert!(stdout.contains("== trial 0: agent placed, scan signatures =="), "{stdout}");
}

#[test]
fn invalid_flags_fail_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-search"))
        .args(["--side", "2"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run maze-search");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8 error");
    assert!(stderr.contains("invalid experiment configuration"), "{stderr}");
}
