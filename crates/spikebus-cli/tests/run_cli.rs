use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use tempfile::tempdir;

const SCENARIO: &str = r#"
name = "charge-then-idle"

[[segments]]
kind = "hold"
value = 64
cycles = 25

[[segments]]
kind = "hold"
value = 0
cycles = 60
"#;

#[test]
fn run_scenario_writes_trace() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let scenario = tmp.path().join("scenario.toml");
    let out = tmp.path().join("out").join("trace.json");
    std::fs::write(&scenario, SCENARIO)?;

    let mut cmd = Command::cargo_bin("spikebus")?;
    cmd.args(["--config", tmp.path().join("none.toml").to_str().expect("utf8"), "run"])
        .arg(&scenario)
        .arg("--output")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("charge-then-idle"))
        .stdout(predicate::str::contains("cycles:        85"))
        .stdout(predicate::str::contains("final v_mem:   0"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    assert_eq!(json["scenario"], "charge-then-idle");
    assert_eq!(json["summary"]["cycles"], 85);
    assert_eq!(json["trace"]["samples"].as_array().expect("samples").len(), 85);
    assert_eq!(json["params"]["threshold"], 1024);
    Ok(())
}

#[test]
fn run_missing_scenario_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let mut cmd = Command::cargo_bin("spikebus")?;
    cmd.args(["--config", tmp.path().join("none.toml").to_str().expect("utf8"), "run"])
        .arg(tmp.path().join("missing.toml"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
    Ok(())
}

#[test]
fn params_init_then_show() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let config = tmp.path().join("spikebus.toml");
    let config_str = config.to_str().expect("utf8");

    Command::cargo_bin("spikebus")?
        .args(["--config", config_str, "params", "init"])
        .assert()
        .success();
    assert!(config.exists());

    // second init refuses to clobber
    Command::cargo_bin("spikebus")?
        .args(["--config", config_str, "params", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    Command::cargo_bin("spikebus")?
        .args(["--config", config_str, "params", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("threshold = 1024"))
        .stdout(predicate::str::contains("law = \"linear\""));
    Ok(())
}
