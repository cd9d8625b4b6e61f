use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn network_available() -> bool {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(std::time::Duration::from_secs(2)))
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build();
    let agent = ureq::Agent::new_with_config(config);
    agent
        .get("https://dblp.org/")
        .call()
        .map(|res| !res.status().is_server_error())
        .unwrap_or(false)
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("backdoor-papers").expect("binary");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_mode_prints_usage() {
    bin()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_mode_prints_usage() {
    bin()
        .arg("scrape")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn download_without_paper_list_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    bin()
        .arg("download")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("papers.json"));
    Ok(())
}

#[test]
fn download_resets_missing_logs_even_with_nothing_missing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("papers.json"), "[]")?;
    fs::write(dir.path().join("missing_CCS.txt"), "Stale Title\n")?;

    let output = bin()
        .arg("download")
        .arg("--out-dir")
        .arg(dir.path())
        .output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(
        stderr.contains("✓ 0") && stderr.contains("✗ 0"),
        "stderr summary mismatch. stderr=\n{}",
        stderr
    );

    let log = fs::read_to_string(dir.path().join("missing_CCS.txt")).unwrap_or_default();
    assert!(!log.contains("Stale Title"), "stale missing log survived: {log}");
    Ok(())
}

#[test]
fn fetch_with_unreachable_listing_writes_empty_list() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        r#"
start_year = 2021
end_year = 2021
listing_url = "http://127.0.0.1:9/{venue}/{year}.html"

[[venues]]
key = "x"

[http]
connect_timeout_secs = 2
timeout_secs = 2
"#,
    )?;

    bin()
        .arg("fetch")
        .arg("--csv")
        .arg("--config")
        .arg(&config)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("papers.json"))?)?;
    assert_eq!(json, serde_json::json!([]));
    assert!(dir.path().join("papers.csv").exists());
    Ok(())
}

#[test]
fn malformed_config_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.toml");
    fs::write(&config, "start_year = \"soon\"\n")?;
    bin()
        .arg("fetch")
        .arg("--config")
        .arg(&config)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
    assert!(!dir.path().join("papers.json").exists());
    Ok(())
}

#[test]
fn fetch_single_listing_from_dblp() -> Result<(), Box<dyn std::error::Error>> {
    if !network_available() {
        eprintln!("skipping fetch_single_listing_from_dblp: network unavailable");
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        r#"
start_year = 2020
end_year = 2020

[[venues]]
key = "ccs"
"#,
    )?;

    bin()
        .arg("fetch")
        .arg("--config")
        .arg(&config)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("papers.json"))?)?;
    let papers = json.as_array().expect("array of papers");
    for p in papers {
        assert_eq!(p["year"], 2020);
        assert_eq!(p["proceedings"], "CCS");
        assert!(matches!(p["type"].as_str(), Some("attack" | "defense" | "both")));
    }
    Ok(())
}
