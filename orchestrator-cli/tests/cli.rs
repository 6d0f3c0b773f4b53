//! Command-line behaviour of the `orchestrator` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;

fn write_zip(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (entry, body) in files {
        writer.start_file(*entry, FileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn orchestrator() -> Command {
    let mut cmd = Command::cargo_bin("orchestrator").unwrap();
    cmd.env_remove("GEMINI_API_KEY").env_remove("RUST_LOG");
    cmd
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
    }))
}

fn ten_results() -> String {
    let items: Vec<serde_json::Value> = (1..=10)
        .map(|i| {
            json!({
                "id": format!("check-{i:02}"),
                "testName": format!("Check {i}"),
                "success": i <= 7,
                "logs": ["done"],
                "suggestedFix": if i > 7 { json!("tighten it") } else { json!(null) }
            })
        })
        .collect();
    serde_json::to_string(&items).unwrap()
}

#[test]
fn test_non_zip_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();

    orchestrator()
        .args(["audit", notes.to_str().unwrap(), "--api-key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only .zip archives"));
}

#[test]
fn test_audit_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_zip(dir.path(), "app.zip", &[("a.js", "1")]);

    orchestrator()
        .args(["audit", archive.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_prompt_prints_file_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_zip(
        dir.path(),
        "app.zip",
        &[("src/app.js", "render()"), ("logo.svg", "<svg/>")],
    );

    orchestrator()
        .args(["prompt", archive.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE: src/app.js\nCONTENT:\nrender()\n---"))
        .stdout(predicate::str::contains("exactly 10 core audit tests"))
        .stdout(predicate::str::contains("logo.svg").not());
}

#[test]
fn test_prompt_honours_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_zip(dir.path(), "app.zip", &[("a.md", "abcdefghij")]);
    let config = dir.path().join("orchestrator.toml");
    std::fs::write(&config, "[core]\nmax_file_chars = 4\n").unwrap();

    orchestrator()
        .args([
            "prompt",
            archive.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("abcd... [truncated]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_audit_writes_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-pro-preview:generateContent"))
        .respond_with(gemini_reply(&ten_results()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let archive = write_zip(dir.path(), "My Shop.zip", &[("index.html", "<h1>shop</h1>")]);
    let out = dir.path().join("reports");

    orchestrator()
        .args([
            "audit",
            archive.to_str().unwrap(),
            "--api-key",
            "test-key",
            "--base-url",
            &format!("{}/v1beta", server.uri()),
            "-o",
            out.to_str().unwrap(),
            "--format",
            "both",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Health Score: 70%"))
        .stdout(predicate::str::contains("❌ FAIL Check 8 (check-08)"));

    let report_path = out.join("ai-agent-v7-report-my-shop.zip.json");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["metadata"]["project_name"], "My Shop.zip");
    assert_eq!(report["metadata"]["orchestrator_version"], "7.0.0");
    assert_eq!(report["navigation"].as_array().unwrap().len(), 10);
    assert_eq!(report["results"]["10"]["id"], "check-10");
    assert!(out.join("ai-agent-v7-report-my-shop.zip.md").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unparseable_reply_fails_with_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("not json"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let archive = write_zip(dir.path(), "app.zip", &[("a.ts", "let a = 1")]);

    orchestrator()
        .args([
            "audit",
            archive.to_str().unwrap(),
            "--api-key",
            "test-key",
            "--base-url",
            &format!("{}/v1beta", server.uri()),
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to analyze project. Context might be too large or the model is overloaded.",
        ));

    assert!(!dir.path().join("ai-agent-v7-report-app.zip.json").exists());
}
