//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NERVES_IN_ORDER: [&str; 12] = [
    "olfactory",
    "optic",
    "oculomotor",
    "trochlear",
    "trigeminal",
    "abducens",
    "facial",
    "vestibulocochlear",
    "glossopharyngeal",
    "vagus",
    "accessory",
    "hypoglossal",
];

fn neuromaster() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("neuromaster").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("NEUROMASTER_GEMINI_KEY");
    cmd
}

/// Command running inside `dir` with its stats kept in `dir/stats`.
fn in_sandbox(dir: &TempDir) -> Command {
    let mut cmd = neuromaster();
    cmd.current_dir(dir.path())
        .arg("--stats-dir")
        .arg(dir.path().join("stats"));
    cmd
}

#[test]
fn help_output() {
    neuromaster()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cranial nerve quiz trainer"));
}

#[test]
fn version_output() {
    neuromaster()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("neuromaster"));
}

#[test]
fn reference_lists_all_nerves() {
    neuromaster()
        .arg("reference")
        .assert()
        .success()
        .stdout(predicate::str::contains("Olfactory"))
        .stdout(predicate::str::contains("Vestibulocochlear"))
        .stdout(predicate::str::contains("XII"));
}

#[test]
fn reference_single_nerve() {
    neuromaster()
        .args(["reference", "--id", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Facial"))
        .stdout(predicate::str::contains("Key function"));
}

#[test]
fn reference_unknown_id_fails() {
    neuromaster()
        .args(["reference", "--id", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("13"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    neuromaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created neuromaster.toml"));

    let content = std::fs::read_to_string(dir.path().join("neuromaster.toml")).unwrap();
    assert!(content.contains("[providers.gemini]"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    neuromaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    neuromaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    in_sandbox(&dir)
        .args(["--config", "no_such_config.toml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn empty_stats() {
    let dir = TempDir::new().unwrap();
    in_sandbox(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nerve ordering"))
        .stdout(predicate::str::contains("Clinical cases"))
        .stdout(predicate::str::contains("Visual identification"));
}

#[test]
fn ordering_run_is_recorded() {
    let dir = TempDir::new().unwrap();
    let mut input = NERVES_IN_ORDER.join("\n");
    input.push('\n');

    in_sandbox(&dir)
        .arg("order")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("All twelve in"))
        .stdout(predicate::str::contains("New personal best"));

    let saved = std::fs::read_to_string(dir.path().join("stats/nm_stats_ordering.json")).unwrap();
    assert!(saved.contains("\"history\""));

    in_sandbox(&dir)
        .args(["stats", "--mode", "ordering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nerve ordering"))
        .stdout(predicate::str::contains("Clinical cases").not());
}

#[test]
fn ordering_mistake_then_quit_records_nothing() {
    let dir = TempDir::new().unwrap();

    in_sandbox(&dir)
        .arg("order")
        .write_stdin("olfactory\nvagus\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vagus is nerve X, not II"))
        .stdout(predicate::str::contains("nothing recorded"));

    assert!(!dir.path().join("stats/nm_stats_ordering.json").exists());
}

#[test]
fn offline_clinical_case_is_playable() {
    let dir = TempDir::new().unwrap();

    in_sandbox(&dir)
        .args(["clinical", "--provider", "offline"])
        .write_stdin("accessory\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline mode"))
        .stdout(predicate::str::contains("Correct"))
        .stdout(predicate::str::contains("Score 1 saved"));

    let saved = std::fs::read_to_string(dir.path().join("stats/nm_stats_clinical.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value["history"], serde_json::json!([1.0]));
    assert_eq!(value["best"], serde_json::json!(1.0));
}

#[test]
fn offline_visual_round_is_unavailable() {
    let dir = TempDir::new().unwrap();

    in_sandbox(&dir)
        .args(["visual", "--provider", "offline"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Content unavailable"))
        .stdout(predicate::str::contains("Nothing to save"));

    assert!(!dir.path().join("stats/nm_stats_visual.json").exists());
}

#[test]
fn unknown_provider_fails() {
    let dir = TempDir::new().unwrap();
    in_sandbox(&dir)
        .args(["clinical", "--provider", "nonexistent"])
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in config"));
}

#[test]
fn stats_html_report() {
    let dir = TempDir::new().unwrap();

    in_sandbox(&dir)
        .args(["clinical", "--provider", "offline"])
        .write_stdin("accessory\nq\n")
        .assert()
        .success();

    let report = dir.path().join("report.html");
    in_sandbox(&dir)
        .arg("stats")
        .arg("--html")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("HTML report written"));

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("<html"));
    assert!(content.contains("1 pts"));
}

#[test]
fn ordering_replay_and_in_game_stats() {
    let dir = TempDir::new().unwrap();
    let mut input = NERVES_IN_ORDER.join("\n");
    input.push_str("\ns\nr\nstats\nq\n");

    let assert = in_sandbox(&dir)
        .arg("order")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Record: -"))
        .stdout(predicate::str::contains("r to play again"))
        .stdout(predicate::str::contains("Personal best:"))
        .stdout(predicate::str::contains("History:"))
        .stdout(predicate::str::contains("Run abandoned, nothing recorded."));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("Record: ").count(), 2);

    let saved = std::fs::read_to_string(dir.path().join("stats/nm_stats_ordering.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value["history"].as_array().unwrap().len(), 1);
}

#[test]
fn clinical_shows_record_and_stats() {
    let dir = TempDir::new().unwrap();

    in_sandbox(&dir)
        .args(["clinical", "--provider", "offline"])
        .write_stdin("accessory\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Record: -"));

    in_sandbox(&dir)
        .args(["clinical", "--provider", "offline"])
        .write_stdin("s\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Record: 1 pts"))
        .stdout(predicate::str::contains("record 1 pts"))
        .stdout(predicate::str::contains("Personal best: 1 pts"))
        .stdout(predicate::str::contains("History: 1"))
        .stdout(predicate::str::contains("Nothing to save"));
}

mod gemini_backed {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IMAGE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    async fn image_server(data: &str) -> MockServer {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": data}}
            ]}}]
        });
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;
        server
    }

    fn write_config(dir: &TempDir, server: &MockServer, image_dir: &std::path::Path) {
        let config = format!(
            "default_provider = \"gemini\"\nimage_dir = \"{}\"\n\n[providers.gemini]\ntype = \"gemini\"\napi_key = \"test-key\"\nbase_url = \"{}\"\n",
            image_dir.display(),
            server.uri()
        );
        std::fs::write(dir.path().join("neuromaster.toml"), config).unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn undecodable_illustration_is_retryable() {
        let dir = TempDir::new().unwrap();
        let server = image_server("not base64 at all!").await;
        write_config(&dir, &server, &dir.path().join("images"));

        in_sandbox(&dir)
            .arg("visual")
            .write_stdin("\nq\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content unavailable"))
            .stdout(predicate::str::contains("not valid base64"))
            .stdout(predicate::str::contains("Nothing to save"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unwritable_image_dir_still_ends_session() {
        let dir = TempDir::new().unwrap();
        let server = image_server(PIXEL_PNG).await;
        // A regular file where the image directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();
        write_config(&dir, &server, &blocked);

        in_sandbox(&dir)
            .arg("visual")
            .write_stdin("q\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Could not show this round"))
            .stdout(predicate::str::contains("Session over"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn illustration_is_written_once_per_round() {
        let dir = TempDir::new().unwrap();
        let server = image_server(PIXEL_PNG).await;
        let images = dir.path().join("images");
        write_config(&dir, &server, &images);

        let assert = in_sandbox(&dir)
            .arg("visual")
            .write_stdin("nonsense\nalso nonsense\nq\n")
            .assert()
            .success();

        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        assert_eq!(stdout.matches("Which nerve does this illustration show?").count(), 1);
        assert_eq!(stdout.matches("Pick one of the listed options.").count(), 2);
        assert!(images.join("round-1.png").exists());
    }
}
