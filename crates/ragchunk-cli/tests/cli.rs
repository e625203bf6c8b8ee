use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

fn ragchunk() -> Command {
    let mut cmd = Command::cargo_bin("ragchunk").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_process_quiet_prints_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ten.txt", TEN_WORDS);

    let output = ragchunk()
        .args(["process", input.to_str().unwrap(), "-m", "3", "-l", "1", "--model", "words", "-q"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source"], "ten.txt");
    assert_eq!(json["total_chunks"], 5);
    assert_eq!(json["total_tokens"], 14);
    assert_eq!(json["config"]["max_tokens"], 3);
    assert_eq!(json["config"]["overlap_tokens"], 1);
    assert_eq!(json["chunks"][1]["text"], "three four five");
    assert_eq!(json["chunks"][4]["text"], "nine ten");
}

#[test]
fn test_process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "notes.md", "# Notes\n\nalpha beta gamma delta");
    let out = dir.path().join("notes.json");

    ragchunk()
        .args(["process", input.to_str().unwrap(), "--model", "words", "-m", "10", "-l", "2", "-p", "1"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunking Results"))
        .stdout(predicate::str::contains("Preview (first 1 chunks)"))
        .stdout(predicate::str::contains("Saved to:"));

    let json: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["total_chunks"], 1);
    assert_eq!(json["chunks"][0]["text"], "# Notes alpha beta gamma delta");
}

#[test]
fn test_process_reads_stdin() {
    let output = ragchunk()
        .args(["process", "-", "--model", "words", "-m", "4", "-l", "0", "-q"])
        .write_stdin("alpha beta\n\ngamma delta epsilon")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source"], "stdin");
    assert_eq!(json["total_chunks"], 2);
    assert_eq!(json["chunks"][1]["text"], "epsilon");
}

#[test]
fn test_process_missing_file() {
    ragchunk()
        .args(["process", "/no/such/file.pdf", "--model", "words"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_process_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "image.bmp", "BM");

    ragchunk()
        .args(["process", input.to_str().unwrap(), "--model", "words"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn test_process_rejects_overlap_at_budget() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ten.txt", TEN_WORDS);

    ragchunk()
        .args(["process", input.to_str().unwrap(), "-m", "5", "-l", "5", "--model", "words"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap_tokens"));
}

#[test]
fn test_process_unknown_model() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ten.txt", TEN_WORDS);

    ragchunk()
        .args(["process", input.to_str().unwrap(), "--model", "not-a-real-model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-real-model"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ten.txt", TEN_WORDS);
    let config = write(
        &dir,
        "ragchunk.toml",
        "[chunking]\nmax_tokens = 3\noverlap_tokens = 1\nmodel = \"words\"\n",
    );

    let output = ragchunk()
        .arg("--config")
        .arg(&config)
        .args(["process", input.to_str().unwrap(), "-q"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_chunks"], 5);
    assert_eq!(json["config"]["model"], "words");
}

#[test]
fn test_batch_writes_results() {
    let docs = TempDir::new().unwrap();
    write(&docs, "first.txt", TEN_WORDS);
    write(&docs, "second.md", "short markdown note");
    write(&docs, "skip.png", "not a document");
    let out = TempDir::new().unwrap();

    ragchunk()
        .args(["batch", docs.path().to_str().unwrap(), "-m", "3", "-l", "1", "--model", "words", "-j", "2"])
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files to process"))
        .stdout(predicate::str::contains("first.txt"))
        .stdout(predicate::str::contains("success"));

    let first: Value = serde_json::from_str(&fs::read_to_string(out.path().join("first.json")).unwrap()).unwrap();
    assert_eq!(first["total_chunks"], 5);
    assert!(out.path().join("second.json").exists());
    assert!(!out.path().join("skip.json").exists());
}

#[test]
fn test_batch_keeps_outputs_with_shared_stem() {
    let docs = TempDir::new().unwrap();
    write(&docs, "report.md", "markdown report text");
    write(&docs, "report.txt", "plain report text here");
    let out = TempDir::new().unwrap();

    ragchunk()
        .args(["batch", docs.path().to_str().unwrap(), "--model", "words", "-m", "10", "-l", "1"])
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    let md: Value = serde_json::from_str(&fs::read_to_string(out.path().join("report.json")).unwrap()).unwrap();
    let txt: Value = serde_json::from_str(&fs::read_to_string(out.path().join("report.txt.json")).unwrap()).unwrap();
    assert_eq!(md["source"], "report.md");
    assert_eq!(txt["source"], "report.txt");
}

#[test]
fn test_batch_write_failure_is_reported_per_file() {
    let docs = TempDir::new().unwrap();
    write(&docs, "first.txt", TEN_WORDS);
    write(&docs, "second.txt", "alpha beta");
    let out = TempDir::new().unwrap();
    // A directory where the JSON file should go makes that write fail
    fs::create_dir(out.path().join("first.json")).unwrap();

    ragchunk()
        .args(["batch", docs.path().to_str().unwrap(), "--model", "words", "-m", "3", "-l", "1"])
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch Processing Results"))
        .stdout(predicate::str::contains("error: IO error: failed to write"))
        .stdout(predicate::str::contains("1 succeeded, 1 failed"));

    assert!(out.path().join("second.json").is_file());
}

#[test]
fn test_batch_glob_filters_files() {
    let docs = TempDir::new().unwrap();
    write(&docs, "keep.txt", "alpha beta");
    write(&docs, "other.md", "gamma delta");

    ragchunk()
        .args(["batch", docs.path().to_str().unwrap(), "--model", "words", "-m", "5", "-l", "1", "-g", "*.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 files to process"))
        .stdout(predicate::str::contains("keep.txt"))
        .stdout(predicate::str::contains("other.md").not());
}

#[test]
fn test_batch_empty_directory() {
    let docs = TempDir::new().unwrap();

    ragchunk()
        .args(["batch", docs.path().to_str().unwrap(), "--model", "words"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No supported files found"));
}

#[test]
fn test_batch_requires_directory() {
    ragchunk()
        .args(["batch", "/no/such/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_info_lists_formats() {
    ragchunk()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(".pdf"))
        .stdout(predicate::str::contains(".pptx"))
        .stdout(predicate::str::contains("1,000"))
        .stdout(predicate::str::contains("gpt-4"));
}
