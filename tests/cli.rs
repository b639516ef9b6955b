//! End-to-end runs of the `offloader-daq` binary against the mock backend.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn offloader_daq(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_offloader-daq"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn mock_config(dir: &TempDir, position_mm: f64) -> String {
    let path = dir.path().join("mock.toml");
    fs::write(
        &path,
        format!(
            "[application]\nlog_level = \"warn\"\n\n[device]\nbackend = \"mock\"\n\n[mock]\nposition_mm = {position_mm}\n"
        ),
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_measure_text_report() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, 4.0);

    let output = offloader_daq(&["measure", "--config", &config, "--samples", "25"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Backend:  mock"));
    assert!(stdout.contains("n:        25"));
    assert!(stdout.contains("POS:      4.000 mm"), "{stdout}");
}

#[test]
fn test_measure_json_report() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, -2.0);

    let output = offloader_daq(&["measure", "--config", &config, "--format", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["backend"], "mock");
    assert_eq!(report["samples"], 100);
    let pos = report["pos"].as_f64().unwrap();
    assert!((pos + 2.0).abs() < 1e-9, "pos = {pos}");
    assert!(report["pos_os"].is_number());
}

#[test]
fn test_config_subcommand_prints_effective_toml() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, 1.25);

    let output = offloader_daq(&["config", "--config", &config]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("backend = \"mock\""));
    assert!(stdout.contains("position_mm = 1.25"));
    assert!(stdout.contains("samples = 100"));
}

#[test]
fn test_missing_config_fails() {
    let output = offloader_daq(&["measure", "--config", "/nonexistent/offloader.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration file not found"), "{stderr}");
}

#[test]
fn test_invalid_sample_count_fails() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, 0.0);

    let output = offloader_daq(&["measure", "--config", &config, "--samples", "0"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[cfg(not(feature = "comedi_hardware"))]
#[test]
fn test_comedi_backend_without_hardware_fails() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, 0.0);

    let output = offloader_daq(&["measure", "--config", &config, "--backend", "comedi"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
