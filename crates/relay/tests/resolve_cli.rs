// ABOUTME: Integration tests for the relay-resolve binary.
// ABOUTME: Checks argument and stdin input plus the fail-open behavior on network errors.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;

fn resolve_cmd() -> Command {
    Command::cargo_bin("relay-resolve").unwrap()
}

#[test]
fn prints_final_url_after_redirects() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/start");
        then.status(302).header("location", server.url("/finish"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/finish");
        then.status(200).body("done");
    });

    resolve_cmd()
        .arg("--allow-private-networks")
        .arg(server.url("/start"))
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "Redirected URL: {}\n",
            server.url("/finish")
        )));
}

#[test]
fn reads_url_from_stdin() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/here");
        then.status(200).body("ok");
    });

    resolve_cmd()
        .arg("--allow-private-networks")
        .write_stdin(format!("{}\n", server.url("/here")))
        .assert()
        .success()
        .stdout(predicate::str::contains(server.url("/here")));
}

#[test]
fn network_failure_echoes_the_input() {
    let url = "http://127.0.0.1:9/unreachable";
    resolve_cmd()
        .arg("--allow-private-networks")
        .arg("--timeout")
        .arg("2")
        .arg(url)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("Redirected URL: {}\n", url)));
}

#[test]
fn empty_input_fails() {
    resolve_cmd()
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL is required"));
}
