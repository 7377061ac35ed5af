//! CLI flag contract tests
//!
//! Runs the binary against temp directories. None of these tests reach a
//! real scoring endpoint: they cover --dry-run, configuration and discovery
//! errors, the config subcommand, and a refused connection.

use std::path::Path;
use std::process::{Command, Output};

fn doceval_bin() -> String {
    env!("CARGO_BIN_EXE_doceval").to_string()
}

/// Command isolated from the caller's credentials and user config
fn doceval(dir: &Path, args: &[&str]) -> Output {
    Command::new(doceval_bin())
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("AZURE_OPENAI_API_KEY")
        .env_remove("AZURE_OPENAI_ENDPOINT")
        .env_remove("AZURE_OPENAI_DEPLOYMENT")
        .env_remove("AZURE_OPENAI_API_VERSION")
        .env_remove("RUST_LOG")
        .env_remove("DOCEVAL_LOG_LEVEL")
        .output()
        .expect("Failed to run doceval")
}

fn setup_docs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(
        docs.join("short.txt"),
        "A short note about release timing.\n\nIt has two paragraphs.",
    )
    .unwrap();

    let paragraph = "The onboarding guide explains how new staff request laptops, \
                     where the shared drives live and who approves access. \
                     Each step links to the owning team.";
    std::fs::write(docs.join("long.md"), vec![paragraph; 20].join("\n\n")).unwrap();
    std::fs::write(docs.join("ignored.docx"), "not scanned").unwrap();
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_dry_run_needs_no_credentials() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["docs", "--dry-run", "--max-tokens-per-chunk", "100"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Token budget per chunk: 100"), "{out}");
    assert!(out.contains("short.txt: 1 chunk(s)"), "{out}");
    assert!(!out.contains("ignored.docx"));

    let long_line = out
        .lines()
        .find(|l| l.starts_with("long.md:"))
        .expect("long.md listed");
    assert!(!long_line.starts_with("long.md: 1 chunk(s)"), "{long_line}");
    assert!(!long_line.contains("oversized"), "{long_line}");
}

#[test]
fn test_dry_run_writes_output_file() {
    let dir = setup_docs();
    let output = doceval(
        dir.path(),
        &["docs/short.txt", "--dry-run", "-o", "stats.txt"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(dir.path().join("stats.txt")).unwrap();
    assert!(written.contains("short.txt: 1 chunk(s)"));
}

#[test]
fn test_missing_credentials_fail_fast() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["docs"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("AZURE_OPENAI_API_KEY"), "{err}");
    assert!(err.contains("AZURE_OPENAI_ENDPOINT"), "{err}");
    assert!(err.contains("AZURE_OPENAI_DEPLOYMENT"), "{err}");
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_unsupported_extension() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["docs/ignored.docx", "--dry-run"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must have one of these extensions"));
}

#[test]
fn test_missing_path() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["nowhere", "--dry-run"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Path not found"));
}

#[test]
fn test_zero_budget_rejected() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["docs", "--dry-run", "--max-tokens-per-chunk", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Token budget must be a positive integer"));
}

#[test]
fn test_invalid_workers_rejected() {
    let dir = setup_docs();
    let output = doceval(dir.path(), &["docs", "--dry-run", "--workers", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("workers must be at least 1"));
}

#[test]
fn test_empty_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("empty")).unwrap();
    let output = doceval(dir.path(), &["empty"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("No documents found"));
}

#[test]
fn test_refused_connection_reports_error_rows() {
    let dir = setup_docs();
    let output = doceval(
        dir.path(),
        &[
            "docs/short.txt",
            "--api-key",
            "test-key",
            "--endpoint",
            "http://127.0.0.1:9",
            "--deployment",
            "gpt-4o",
            "--max-retries",
            "1",
        ],
    );
    // Per-document failures never change the exit code
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("filename,relevance,factual_accuracy,clarity,hallucination,style_match,rag_usability,citation_quality,status,error_message")
    );
    let row = lines.next().expect("one result row");
    assert!(row.starts_with("short.txt,,,,,,,,error,"), "{row}");
    assert!(stderr(&output).contains("1 failed"));
}

#[test]
fn test_config_show_masks_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(doceval_bin())
        .args(["config", "show"])
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("AZURE_OPENAI_API_KEY", "secret-key-1234")
        .env_remove("AZURE_OPENAI_ENDPOINT")
        .env_remove("AZURE_OPENAI_DEPLOYMENT")
        .env_remove("AZURE_OPENAI_API_VERSION")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("****1234"), "{out}");
    assert!(!out.contains("secret-key"));
    assert!(out.contains("2024-02-15-preview"));
}

// dirs resolves the config dir from XDG_CONFIG_HOME on Linux only
#[cfg(target_os = "linux")]
#[test]
fn test_config_init_then_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let output = doceval(dir.path(), &["config", "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let config_path = dir.path().join("config").join("doceval").join("config.toml");
    assert!(config_path.exists());

    std::fs::write(
        &config_path,
        "[evaluation]\nmax_tokens_per_chunk = 1234\n",
    )
    .unwrap();
    let output = doceval(dir.path(), &["config", "show"]);
    assert!(stdout(&output).contains("1234"));
}

#[test]
fn test_extra_config_file_layered() {
    let dir = setup_docs();
    std::fs::write(
        dir.path().join("team.toml"),
        "[evaluation]\nmax_tokens_per_chunk = 77\n",
    )
    .unwrap();
    let output = doceval(
        dir.path(),
        &["docs/short.txt", "--dry-run", "--config", "team.toml"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Token budget per chunk: 77"));
}

#[test]
fn test_help_lists_core_flags() {
    let output = Command::new(doceval_bin()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    for flag in [
        "--recursive",
        "--format",
        "--output",
        "--max-tokens-per-chunk",
        "--max-retries",
        "--dry-run",
        "--workers",
    ] {
        assert!(out.contains(flag), "missing {flag}");
    }
}
