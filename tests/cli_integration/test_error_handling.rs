//! Integration tests for CLI error handling
//!
//! Tests:
//! - Network errors (server unreachable)
//! - Unknown table fields
//! - Malformed input
//! - Registry errors carry the failing id
//! - Invalid flag values and missing or broken configuration

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{requests_with_method, run_cli, run_cli_without_home, TempHome};

#[tokio::test]
async fn test_network_error_unreachable_server() {
    let home = TempHome::new();

    let output = run_cli(&["rm", "web", "--api-url", "http://127.0.0.1:9", "--timeout", "2"], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Failed to remove frontend 'web'"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("transport failure"));
}

#[tokio::test]
async fn test_unknown_field_fails_before_listing() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    Mock::given(method("GET"))
        .and(path("/v1/frontend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_cli(&["ls", "--fields=id,colour", "--api-url", &server.uri()], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Unknown field 'colour'"));
    assert!(!output.stdout.contains("ID"), "no table output expected: {}", output.stdout);
}

#[tokio::test]
async fn test_malformed_json_makes_no_request() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    let output = run_cli(&["add", "web", "--json", "{\"selectors\":", "--api-url", &server.uri()], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Failed to parse JSON"));
    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

#[tokio::test]
async fn test_missing_id_is_rejected() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    let output = run_cli(&["add", "--domain", "a.com", "--api-url", &server.uri()], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("No frontend ID given"));
    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

#[tokio::test]
async fn test_invalid_api_url() {
    let home = TempHome::new();

    let output = run_cli(&["ls", "--api-url", "localhost:8056"], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("api-url"), "stdout: {}", output.stdout);
}

#[tokio::test]
async fn test_get_not_found_names_id() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    Mock::given(method("GET"))
        .and(path("/v1/frontend/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run_cli(&["get", "ghost", "--api-url", &server.uri()], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Failed to get frontend 'ghost': frontend not found"));
}

#[tokio::test]
async fn test_errors_shown_when_quiet() {
    let home = TempHome::new();

    let output =
        run_cli(&["rm", "web", "-q", "--api-url", "http://127.0.0.1:9", "--timeout", "2"], &home).await;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("ERROR"));
}

#[tokio::test]
async fn test_invalid_flag_values_exit_one() {
    let server = MockServer::start().await;
    let home = TempHome::new();

    let output = run_cli(&["add", "web", "--weight", "101", "--api-url", &server.uri()], &home).await;
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("--weight"), "stdout: {}", output.stdout);

    let output = run_cli(&["add", "web", "--mode", "udp", "--api-url", &server.uri()], &home).await;
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("udp"), "stdout: {}", output.stdout);

    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

#[tokio::test]
async fn test_help_exits_zero() {
    let home = TempHome::new();

    let output = run_cli(&["ls", "--help"], &home).await;
    assert!(output.success);
    assert!(output
        .stdout
        .contains("--fields=domain,frontend-port,id,mode,path-prefix,port,private,service,ssl-cert,weight"));
}

#[tokio::test]
async fn test_works_without_home_directory() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/frontend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli_without_home(&["ls", "--api-url", &server.uri()]).await;

    assert!(output.success, "ls should not need a home directory: {}", output.stdout);
    assert!(output.stdout.contains("No frontends found."));
}

#[tokio::test]
async fn test_broken_config_file_is_skipped() {
    let server = MockServer::start().await;
    let home = TempHome::new();
    home.write_config("api_url = [");

    Mock::given(method("DELETE"))
        .and(path("/v1/frontend/web"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli(&["rm", "web", "--api-url", &server.uri()], &home).await;

    assert!(output.success, "rm should ignore the broken file: {}", output.stdout);
    assert!(output.stdout.contains("Ignoring configuration file"));
}
