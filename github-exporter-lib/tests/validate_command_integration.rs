//! Integration tests for the `init` and `validate` commands, driven through `run` the way the
//! binary drives them.

use github_exporter_lib::Host;
use std::io::Write;

/// Test host that captures output to in-memory buffers.
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
            exit_code: None,
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_init_then_validate() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("github-exporter.toml");
    let config = config_path.to_str().unwrap();

    let mut host = TestHost::new();
    github_exporter_lib::run(&mut host, ["github-exporter", "init", config]).await.unwrap();
    assert!(host.output_str().contains("Generated default configuration file"));

    let mut host = TestHost::new();
    github_exporter_lib::run(&mut host, ["github-exporter", "validate", "--config", config])
        .await
        .unwrap();

    let output = host.output_str();
    assert!(output.contains("Configuration file is valid"), "got: {output}");
    assert!(output.contains("Repository: giantswarm/giantswarm"), "got: {output}");
    assert!(output.contains("github_exporter_issue_labels_count (gauge)"), "got: {output}");
    assert_eq!(host.exit_code, None);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_init_does_not_clobber_existing_config() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("github-exporter.toml");
    std::fs::write(&config_path, "[github]\norganization = \"acme\"\nrepository = \"widgets\"\n").unwrap();
    let config = config_path.to_str().unwrap();

    let mut host = TestHost::new();
    let result = github_exporter_lib::run(&mut host, ["github-exporter", "init", config]).await;
    assert!(result.is_err());
    assert!(std::fs::read_to_string(&config_path).unwrap().contains("acme"));

    let mut host = TestHost::new();
    github_exporter_lib::run(&mut host, ["github-exporter", "init", config, "--force"])
        .await
        .unwrap();
    assert!(std::fs::read_to_string(&config_path).unwrap().contains("giantswarm"));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_validate_reports_bad_selector() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("github-exporter.toml");
    std::fs::write(
        &config_path,
        "[github]\norganization = \"acme\"\nrepository = \"widgets\"\n\n[collector]\ncustom_labels = [\"bug\", \"bug\"]\n",
    )
    .unwrap();

    let mut host = TestHost::new();
    let result = github_exporter_lib::run(&mut host, ["github-exporter", "validate", "--config", config_path.to_str().unwrap()]).await;

    assert!(result.is_err());
    assert!(host.error_str().contains("Configuration validation failed"));
    assert_eq!(host.exit_code, Some(1));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_validate_with_timestamps_lists_timestamp_gauges() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("github-exporter.toml");
    std::fs::write(
        &config_path,
        "[github]\norganization = \"acme\"\nrepository = \"widgets\"\n\n[collector.dimensions]\nissue_timestamps = true\nclose_duration_histograms = false\n",
    )
    .unwrap();

    let mut host = TestHost::new();
    github_exporter_lib::run(&mut host, ["github-exporter", "validate", "--config", config_path.to_str().unwrap()])
        .await
        .unwrap();

    let output = host.output_str();
    assert!(output.contains("github_exporter_issue_open_label_seconds (gauge)"), "got: {output}");
    assert!(!output.contains("close_duration_seconds"), "got: {output}");
}
