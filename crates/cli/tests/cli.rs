// ABOUTME: Integration tests for the scrape-relay-cli binary.
// ABOUTME: Runs the binary against mocked pages with a temporary secrets file and output path.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SECRETS: &str = "[REDDIT]\nclient_id = id\nclient_secret = secret\nuser_agent = relay-cli-tests/0.1\n";

fn cli_cmd() -> Command {
    Command::cargo_bin("scrape-relay-cli").unwrap()
}

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let secrets = dir.path().join("secrets.ini");
    fs::write(&secrets, SECRETS).unwrap();
    let output = dir.path().join("output.txt");
    (dir, secrets, output)
}

#[test]
fn writes_article_to_output_file() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/article");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><head><title>Hello</title></head><body><article><p>World</p></article></body></html>");
    });
    let (_dir, secrets, output) = workspace();

    cli_cmd()
        .arg("--url")
        .arg(server.url("/article"))
        .arg("--config")
        .arg(&secrets)
        .arg("--output")
        .arg(&output)
        .arg("--allow-private-networks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Content saved to"));

    page.assert_hits(2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        format!("Title: Hello\nURL: {}\nContent:\nWorld", server.url("/article"))
    );
}

#[test]
fn json_flag_writes_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body><p>Text</p></body></html>");
    });
    let (_dir, secrets, output) = workspace();

    cli_cmd()
        .args(["--json", "--allow-private-networks", "--url"])
        .arg(server.url("/a"))
        .arg("-c")
        .arg(&secrets)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["title"], "Scraped Content");
    assert_eq!(value["content"], "Text");
}

#[test]
fn failed_extraction_still_writes_file_and_exits_non_zero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });
    let (_dir, secrets, output) = workspace();

    cli_cmd()
        .arg("--url")
        .arg(server.url("/missing"))
        .arg("--config")
        .arg(&secrets)
        .arg("--output")
        .arg(&output)
        .arg("--allow-private-networks")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Content saved to"))
        .stderr(predicate::str::contains("Error scraping article: HTTP status 404"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Error scraping article: HTTP status 404"
    );
}

#[test]
fn missing_config_exits_before_scraping() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.txt");

    cli_cmd()
        .arg("--url")
        .arg("https://example.com")
        .arg("--config")
        .arg(dir.path().join("absent.ini"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));

    assert!(!output.exists());
}

#[test]
fn incomplete_credentials_are_rejected() {
    let (_dir, secrets, output) = workspace();
    fs::write(&secrets, "[REDDIT]\nclient_id = id\n").unwrap();

    cli_cmd()
        .arg("--url")
        .arg("https://example.com")
        .arg("--config")
        .arg(&secrets)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing REDDIT.client_secret"));
}
