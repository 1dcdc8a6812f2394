//! CLI integration tests for the pragmatics-eval binary.
//!
//! The `run` tests point the OpenAI provider at a local mock server through a
//! config file, so the whole binary is exercised without network access.

use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS: &str = "\
Context,Option_A,Option_B,Gold_Label,Phenomenon,Domain,Role_Direction
c1,x,y,A,politeness,family,junior-senior
c2,x,y,B,implicature,work,peer
";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pragmatics-eval"))
}

async fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env("OPENAI_API_KEY", "test-key")
        .output()
        .await
        .expect("Failed to execute pragmatics-eval binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Expected exit code 0, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("eval.toml");
    let content = format!(
        "[provider]\nname = \"openai\"\nmodel = \"gpt-test\"\nbase_url = \"{}\"\ntimeout_ms = 5000\n\n\
         [run]\nrate_limit_cooldown_secs = 0\n",
        base_url
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "gpt-test",
        "choices": [{"message": {"role": "assistant", "content": text}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 1}
    }))
}

#[tokio::test]
async fn test_run_writes_results_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Context: c1"))
        .respond_with(completion("A"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Context: c2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("items_all.csv");
    std::fs::write(&input, ITEMS).unwrap();
    let config = write_config(dir.path(), &server.uri());
    let output_path = dir.path().join("out").join("results.csv");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "run",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--summary-json",
    ])
    .await;
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Prompt 1/2 | Gold: A | Prediction: A | Correct: True"));
    assert!(out.contains("Prompt 2/2 | Gold: B | Prediction: None | Correct: False"));
    assert!(out.contains("Total Accuracy: 50.00% (1/2 correct)"));
    assert!(out.contains("Macro-Recall: 50.00%"));

    let written = std::fs::read_to_string(&output_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("Context,Option_A,Option_B,Gold_Label,Phenomenon,Domain,Role_Direction,Model_Prediction,Correct")
    );
    assert_eq!(lines.next(), Some("c1,x,y,A,politeness,family,junior-senior,A,True"));
    assert_eq!(lines.next(), Some("c2,x,y,B,implicature,work,peer,,False"));

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out").join("results_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["model"], "gpt-test");
    assert_eq!(summary["total_items"], 2);

    let report = run(&["report", "--input", output_path.to_str().unwrap()]).await;
    assert_success(&report);
    assert!(stdout(&report).contains("Total Accuracy: 50.00% (1/2 correct)"));
}

#[tokio::test]
async fn test_run_missing_input_aborts_without_output() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());
    let output_path = dir.path().join("results.csv");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "run",
        "--input",
        dir.path().join("missing.csv").to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read input file"));
    assert!(!output_path.exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_empty_input_aborts() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    std::fs::write(&input, ITEMS.lines().next().unwrap()).unwrap();
    let config = write_config(dir.path(), &server.uri());
    let output_path = dir.path().join("results.csv");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "run",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no rows"));
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_merge_command() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("items_politeness.csv");
    let b = dir.path().join("items_implicature.csv");
    std::fs::write(&a, ITEMS).unwrap();
    std::fs::write(&b, "Context,Option_A,Option_B,Gold_Label,Phenomenon,Domain,Role_Direction\nc3,x,y,A,implicature,shop,peer\n").unwrap();
    let merged = dir.path().join("data").join("items_all.csv");

    let output = run(&[
        "merge",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--output",
        merged.to_str().unwrap(),
    ])
    .await;
    assert_success(&output);

    let content = std::fs::read_to_string(&merged).unwrap();
    let contexts: Vec<_> = content.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(contexts, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_init_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("eval.toml");

    let output = run(&["init-config", "--output", path.to_str().unwrap()]).await;
    assert_success(&output);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("rate_limit_cooldown_secs = 60"));
    assert!(content.contains("max_rate_limit_retries = 1"));
}
