use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const GREETER_ASSEMBLY: &str = r#"
[[listeners]]
name = "events"
implementation = "demo.LogListener"

[[components]]
name = "greeter"
implementation = "demo.Greeter"

[[components.dependencies]]
key = "clock"
provider = "clock"

[[components]]
name = "clock"
implementation = "demo.SystemClock"
"#;

const GREETER_CONFIG: &str = r#"
[greeter]
greeting = "hello from ${unit.name}"
"#;

/// Greeter without the clock it needs.
const BROKEN_ASSEMBLY: &str = r#"
[[components]]
name = "greeter"
implementation = "demo.Greeter"
"#;

fn write_unit(dir: &Path, assembly: &str, configuration: &str) -> PathBuf {
    let unit_inf = dir.join("UNIT-INF");
    fs::create_dir_all(&unit_inf).unwrap();
    fs::write(unit_inf.join("assembly.toml"), assembly).unwrap();
    fs::write(unit_inf.join("config.toml"), configuration).unwrap();
    fs::write(unit_inf.join("environment.toml"), "[logging]\nlevel = \"info\"\n").unwrap();
    dir.to_path_buf()
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("--ping");

    cmd.assert().success().stdout(predicate::str::contains("pong"));

    Ok(())
}

#[test]
fn test_no_args_prints_hint() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tessera")?;

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No command specified"))
        .stdout(predicate::str::contains("pong").not());

    Ok(())
}

#[test]
fn test_types_lists_builtin_types() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("types");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("demo.Greeter"))
        .stdout(predicate::str::contains("demo.SystemClock (provides demo.Clock)"))
        .stdout(predicate::str::contains("demo.LogListener"));

    Ok(())
}

#[test]
fn test_verify_prints_startup_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = write_unit(&dir.path().join("hello"), GREETER_ASSEMBLY, GREETER_CONFIG);
    let root = dir.path().join("runtime");

    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("verify").arg(&source).arg("--root").arg(&root);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Unit 'hello' verified."))
        .stdout(predicate::str::contains("greeter [demo.Greeter] uses clock"))
        .stdout(predicate::str::contains("Startup order: clock -> greeter"));

    assert!(!root.join("apps").join("hello").exists());
    Ok(())
}

#[test]
fn test_verify_rejects_missing_provider() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = write_unit(&dir.path().join("broken"), BROKEN_ASSEMBLY, "");

    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("verify").arg(&source).arg("--root").arg(dir.path().join("runtime"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Verification of 'broken' failed"));

    Ok(())
}

#[test]
fn test_run_once_deploys_and_shuts_down() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = write_unit(&dir.path().join("hello"), GREETER_ASSEMBLY, GREETER_CONFIG);
    let root = dir.path().join("runtime");

    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("run").arg(&source).arg("--once").arg("--root").arg(&root);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Deployed unit 'hello'"))
        .stdout(predicate::str::contains("hello (running): clock, greeter"))
        .stdout(predicate::str::contains("Shutting down..."));

    assert!(!root.join("apps").join("hello").exists());
    Ok(())
}

#[test]
fn test_run_reports_failed_deploy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = write_unit(&dir.path().join("broken"), BROKEN_ASSEMBLY, "");

    let mut cmd = Command::cargo_bin("tessera")?;
    cmd.arg("run").arg(&source).arg("--once").arg("--root").arg(dir.path().join("runtime"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to deploy 'broken'"))
        .stdout(predicate::str::contains("No units deployed."));

    Ok(())
}
