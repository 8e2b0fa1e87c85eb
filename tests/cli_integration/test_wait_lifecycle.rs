//! Integration tests for `add --wait`
//!
//! Tests:
//! - a termination signal removes the frontend once and exits 0
//! - repeated signals still remove only once
//! - a failed add never waits
//! - a hung remove is cut off by the grace period
//! - a signal during a hung add is cut off by the grace period

#![cfg(unix)]

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{
    requests_with_method, send_signal, spawn_cli, wait_for_exit, wait_for_request, TempHome,
};

async fn mount_frontend(server: &MockServer, delete_response: ResponseTemplate) {
    Mock::given(method("PUT"))
        .and(path("/v1/frontend/web"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/frontend/web"))
        .respond_with(delete_response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sigterm_removes_frontend_and_exits_zero() {
    let server = MockServer::start().await;
    let home = TempHome::new();
    mount_frontend(&server, ResponseTemplate::new(200)).await;

    let child = spawn_cli(&["add", "web", "--domain", "a.com", "--wait", "--api-url", &server.uri()], &home);
    let pid = child.id();

    wait_for_request(&server, "PUT").await;
    assert!(requests_with_method(&server, "DELETE").await.is_empty());

    send_signal(pid, "TERM");
    let output = wait_for_exit(child, Duration::from_secs(10)).await;

    assert!(output.success, "expected exit 0: {}", output.stdout);
    assert_eq!(requests_with_method(&server, "DELETE").await.len(), 1);
    assert!(output.stdout.contains("Removing frontend 'web'"));
}

#[tokio::test]
async fn test_repeated_signals_remove_once() {
    let server = MockServer::start().await;
    let home = TempHome::new();
    // Slow remove so the second signal lands while the first is being handled
    mount_frontend(&server, ResponseTemplate::new(200).set_delay(Duration::from_millis(500))).await;

    let child = spawn_cli(&["add", "web", "--wait", "--api-url", &server.uri()], &home);
    let pid = child.id();

    wait_for_request(&server, "PUT").await;
    send_signal(pid, "INT");
    wait_for_request(&server, "DELETE").await;
    send_signal(pid, "TERM");
    send_signal(pid, "INT");

    let output = wait_for_exit(child, Duration::from_secs(10)).await;

    assert!(output.success, "expected exit 0: {}", output.stdout);
    assert_eq!(requests_with_method(&server, "DELETE").await.len(), 1);
}

#[tokio::test]
async fn test_failed_add_never_waits() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    Mock::given(method("PUT"))
        .and(path("/v1/frontend/web"))
        .respond_with(ResponseTemplate::new(500).set_body_string("registry unavailable"))
        .mount(&server)
        .await;

    let child = spawn_cli(&["add", "web", "--wait", "--api-url", &server.uri()], &home);
    let output = wait_for_exit(child, Duration::from_secs(10)).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Failed to add frontend 'web'"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("registry unavailable"));
    assert!(requests_with_method(&server, "DELETE").await.is_empty());
}

#[tokio::test]
async fn test_failed_remove_exits_nonzero() {
    let server = MockServer::start().await;
    let home = TempHome::new();
    mount_frontend(&server, ResponseTemplate::new(500)).await;

    let child = spawn_cli(&["add", "web", "--wait", "--api-url", &server.uri()], &home);
    let pid = child.id();

    wait_for_request(&server, "PUT").await;
    send_signal(pid, "TERM");
    let output = wait_for_exit(child, Duration::from_secs(10)).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Failed to remove frontend 'web'"), "stdout: {}", output.stdout);
    assert_eq!(requests_with_method(&server, "DELETE").await.len(), 1);
}

#[tokio::test]
async fn test_hung_remove_bounded_by_grace_period() {
    let server = MockServer::start().await;
    let home = TempHome::new();
    mount_frontend(&server, ResponseTemplate::new(200).set_delay(Duration::from_secs(60))).await;

    let child = spawn_cli(
        &["add", "web", "--wait", "--grace-period", "1", "--api-url", &server.uri()],
        &home,
    );
    let pid = child.id();

    wait_for_request(&server, "PUT").await;
    send_signal(pid, "TERM");
    let output = wait_for_exit(child, Duration::from_secs(15)).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Gave up removing frontend 'web'"), "stdout: {}", output.stdout);
}

#[tokio::test]
async fn test_signal_during_hung_add_bounded_by_grace_period() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    Mock::given(method("PUT"))
        .and(path("/v1/frontend/web"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(60)))
        .mount(&server)
        .await;

    let child = spawn_cli(
        &["add", "web", "--wait", "--grace-period", "1", "--api-url", &server.uri()],
        &home,
    );
    let pid = child.id();

    wait_for_request(&server, "PUT").await;
    send_signal(pid, "TERM");
    let output = wait_for_exit(child, Duration::from_secs(10)).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Gave up adding frontend 'web'"), "stdout: {}", output.stdout);
    assert!(requests_with_method(&server, "DELETE").await.is_empty());
}
