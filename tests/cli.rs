use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dprf_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dprf");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let corpus = root.join("reports");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(
        corpus.join("a.txt"),
        "Executive Summary A river bridge for the district. Budget Estimation \
         The budget covers steel and labour costs. Risk Assessment Flood delays.",
    )
    .unwrap();
    fs::write(
        corpus.join("b.txt"),
        "Executive Summary A road bridge near the river. Technical Specifications \
         Steel deck design with a concrete pier. Risk Assessment Budget overrun.",
    )
    .unwrap();
    fs::write(
        corpus.join("c.txt"),
        "Project Description A river crossing with a steel bridge. Implementation Plan \
         Labour and staff in two phases. Environmental Impact Flood plain habitat.",
    )
    .unwrap();
    fs::write(corpus.join("readme.md"), "not a report").unwrap();

    let config_path = root.join("dprf.toml");
    fs::write(
        &config_path,
        r#"[vectorizer]
n_components = 6

[scoring]
steepness = 300.0
midpoint = 0.01
"#,
    )
    .unwrap();

    (tmp, config_path)
}

fn run_dprf(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = dprf_binary();
    let mut cmd = Command::new(&binary);
    if let Some(config) = config_path {
        cmd.arg("--config").arg(config);
    }
    let output = cmd
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dprf binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_columns_use_config_width() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, ok) = run_dprf(Some(&config), &["columns"]);
    assert!(ok, "columns failed: {}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 6 + 4 + 5 + 5 * 7);
    assert_eq!(lines[0], "text_feat_0");
    assert_eq!(lines[6], "file_size_mb");
    assert_eq!(lines[10], "risk_financial");
}

#[test]
fn test_columns_without_config_use_defaults() {
    let (stdout, stderr, ok) = run_dprf(None, &["columns"]);
    assert!(ok, "columns failed: {}", stderr);
    assert_eq!(stdout.lines().count(), 100 + 4 + 5 + 5 * 7);
}

#[test]
fn test_process_prints_document_json() {
    let (tmp, config) = setup_test_env();
    let file = tmp.path().join("reports/a.txt");
    let (stdout, stderr, ok) = run_dprf(Some(&config), &["process", file.to_str().unwrap()]);
    assert!(ok, "process failed: {}", stderr);

    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["file_name"], "a.txt");
    assert_eq!(
        doc["sections"]["executive_summary"],
        "a river bridge for the district"
    );
    assert!(doc["risk_indicators"]["financial"].as_f64().unwrap() > 0.0);
    assert!(stderr.contains("weighted risk"), "stderr: {}", stderr);
}

#[test]
fn test_process_rejects_unsupported_format() {
    let (tmp, config) = setup_test_env();
    let file = tmp.path().join("reports/readme.md");
    let (_, stderr, ok) = run_dprf(Some(&config), &["process", file.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("unsupported file format"), "stderr: {}", stderr);
}

#[test]
fn test_fit_then_features() {
    let (tmp, config) = setup_test_env();
    let corpus = tmp.path().join("reports");
    let models = tmp.path().join("models");
    let output = tmp.path().join("out/features.json");

    let (_, stderr, ok) = run_dprf(
        Some(&config),
        &[
            "fit",
            corpus.to_str().unwrap(),
            "--models",
            models.to_str().unwrap(),
        ],
    );
    assert!(ok, "fit failed: {}", stderr);
    assert!(models.join("tfidf_vectorizer.json").is_file());
    assert!(models.join("svd_transformer.json").is_file());
    assert!(stderr.contains("Fitted on 3 documents (1 skipped)"));

    let (_, stderr, ok) = run_dprf(
        Some(&config),
        &[
            "features",
            corpus.to_str().unwrap(),
            "--models",
            models.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(ok, "features failed: {}", stderr);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let columns = json["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 1 + 6 + 4 + 5 + 5 * 7);
    assert_eq!(columns[0], "file_name");
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "a.txt");
    assert_eq!(rows[2][0], "c.txt");

    let (stdout, _, ok) = run_dprf(
        Some(&config),
        &["columns", "--models", models.to_str().unwrap()],
    );
    assert!(ok);
    assert_eq!(stdout.lines().count(), columns.len() - 1);
}

#[test]
fn test_features_without_models_fails() {
    let (tmp, config) = setup_test_env();
    let corpus = tmp.path().join("reports");
    let models = tmp.path().join("missing");
    let (_, stderr, ok) = run_dprf(
        Some(&config),
        &[
            "features",
            corpus.to_str().unwrap(),
            "--models",
            models.to_str().unwrap(),
        ],
    );
    assert!(!ok);
    assert!(stderr.contains("artifact not found"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_is_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[vectorizer]\nn_components = 0\n").unwrap();
    let (_, stderr, ok) = run_dprf(Some(&bad), &["columns"]);
    assert!(!ok);
    assert!(stderr.contains("n_components"), "stderr: {}", stderr);
}
