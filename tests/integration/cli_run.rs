//! Binary tests: stdout report lines, exit status, single-line errors

use super::test_utils::{sha256_hex, small_repo, FakeServer, Route};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary from an empty directory with an empty config file and logging off.
async fn run_binary(args: Vec<String>) -> (Output, TempDir) {
    let workdir = TempDir::new().unwrap();
    let config = workdir.path().join("empty.toml");
    std::fs::write(&config, "").unwrap();

    let cwd = workdir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_repomirror"))
            .current_dir(&cwd)
            .arg("--config")
            .arg(cwd.join("empty.toml"))
            .arg("--staging-dir")
            .arg(cwd.join("staging"))
            .arg("--quiet")
            .args(&args)
            .env_remove("REPOMIRROR_TOKEN")
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    (output, workdir)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_prints_one_line_per_file() {
    let server = FakeServer::start(small_repo).await;

    let (output, workdir) = run_binary(vec![server.url("/contents")]).await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(&format!("c.txt: {}", sha256_hex(b"C"))));
    assert!(lines[1].ends_with(&format!("b.txt: {}", sha256_hex(b"B"))));

    let staged_path = lines[1].rsplit_once(": ").unwrap().0;
    assert!(Path::new(staged_path).is_file());
    assert!(workdir.path().join("staging").is_dir());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_failure_exits_nonzero_with_one_error_line() {
    let server = FakeServer::start(|base| {
        let mut routes = small_repo(base);
        routes.retain(|(path, _)| path != "/raw/b.txt");
        routes.push(("/raw/b.txt".to_string(), Route::Status(500)));
        routes
    })
    .await;

    let (output, _workdir) = run_binary(vec![server.url("/contents")]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "no report on failure");
    let stderr = String::from_utf8(output.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("error: "));
    assert!(lines[0].contains("HTTP 500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_json_format() {
    let server = FakeServer::start(small_repo).await;

    let (output, _workdir) = run_binary(vec![
        server.url("/contents"),
        "--format".to_string(),
        "json".to_string(),
    ])
    .await;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files"][0]["relative_path"], "a/c.txt");
    assert_eq!(json["files"][1]["relative_path"], "b.txt");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_without_url_fails() {
    let (output, _workdir) = run_binary(Vec::new()).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No repository URL"));
}
