// Tests for the HTTP coverage agent client against a mock agent
//
// Plain tests with a local runtime driving the mock server; the agent also
// gets called from inside that runtime, as async runners do.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use testwise_bridge::agent::{AgentError, CoverageAgent, HttpAgent, TestExecution};
use testwise_bridge::config::AgentConfig;
use testwise_bridge::listener::{
    NodeKind, TestExecutionResult, TestIdentifier, TestSource, TreeListener,
};
use testwise_bridge::{ExecutionOutcome, TestPath, TestwiseReporter};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_agent(rt: &Runtime, status: u16) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("^/test-.*"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    })
}

fn requests(rt: &Runtime, server: &MockServer) -> Vec<wiremock::Request> {
    rt.block_on(server.received_requests())
        .expect("request recording is enabled")
}

#[test]
fn test_started_posts_encoded_path() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 200);
    let agent = HttpAgent::new(&server.uri()).unwrap();

    // Act
    agent.test_started("pkg%2FMyTest%2FtestA").unwrap();

    // Assert
    let requests = requests(&rt, &server);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method.as_str(), "POST");
    assert_eq!(requests[0].url.path(), "/test-started/pkg%2FMyTest%2FtestA");
    assert!(requests[0].body.is_empty());
}

#[test]
fn test_ended_posts_outcome_and_message() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 204);
    let agent = HttpAgent::new(&server.uri()).unwrap();
    let execution = TestExecution::new(
        ExecutionOutcome::Failed,
        Some("assertion failed".to_string()),
    );

    // Act
    agent.test_ended("pkg%2FMyTest%2FtestB", &execution).unwrap();

    // Assert
    let requests = requests(&rt, &server);
    assert_eq!(requests[0].url.path(), "/test-ended/pkg%2FMyTest%2FtestB");
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(
        body,
        serde_json::json!({"result": "FAILED", "message": "assertion failed"})
    );
}

#[test]
fn test_run_finished_carries_partial_flag() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 200);
    let agent = HttpAgent::new(&server.uri()).unwrap();

    // Act
    agent.test_run_finished(false).unwrap();
    agent.test_run_finished(true).unwrap();

    // Assert
    let requests = requests(&rt, &server);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), "/test-run-finished");
    assert_eq!(requests[0].url.query(), Some("partial=false"));
    assert_eq!(requests[1].url.query(), Some("partial=true"));
}

#[test]
fn test_error_status_is_reported() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 500);
    let agent = HttpAgent::new(&server.uri()).unwrap();

    // Act
    let err = agent.test_started("a").unwrap_err();

    // Assert
    match err {
        AgentError::Status { status, endpoint } => {
            assert_eq!(status.as_u16(), 500);
            assert!(endpoint.ends_with("/test-started/a"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unreachable_agent_is_a_request_error() {
    // Arrange
    let agent = HttpAgent::new("http://127.0.0.1:1").unwrap();

    // Act
    let err = agent.test_run_finished(false).unwrap_err();

    // Assert
    assert!(matches!(err, AgentError::Request(_)));
}

#[test]
fn test_reporter_survives_failing_agent() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 503);
    let reporter = TestwiseReporter::from_config(&AgentConfig {
        url: Some(server.uri()),
        accept_partial: false,
    })
    .unwrap();

    // Act
    let path = TestPath::from("pkg.MyTest.testA");
    reporter.start_test(&path);
    reporter.end_test(&path, ExecutionOutcome::Passed, None);
    reporter.end_run();

    // Assert
    assert_eq!(requests(&rt, &server).len(), 3);
    assert_eq!(reporter.tally().transport_failures, 3);
}

#[test]
fn test_tree_listener_over_http() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 200);
    let reporter = Arc::new(
        TestwiseReporter::from_config(&AgentConfig {
            url: Some(format!("{}/", server.uri())),
            accept_partial: true,
        })
        .unwrap(),
    );
    let listener = TreeListener::new(reporter);
    let test = TestIdentifier {
        unique_id: "a".to_string(),
        parent_id: Some("c".to_string()),
        kind: NodeKind::Test,
        source: Some(TestSource::Method {
            class_name: "com.example.FooTest".to_string(),
            method_name: "bar".to_string(),
        }),
        legacy_reporting_name: "bar".to_string(),
    };

    // Act
    listener.execution_started(Some(&test));
    listener.execution_finished(Some(&test), Some(&TestExecutionResult::successful()));
    listener.execution_finished(
        Some(&TestIdentifier {
            unique_id: "c".to_string(),
            parent_id: Some("root".to_string()),
            kind: NodeKind::Container,
            source: Some(TestSource::Class {
                class_name: "com.example.FooTest".to_string(),
            }),
            legacy_reporting_name: "FooTest".to_string(),
        }),
        None,
    );

    // Assert
    let requests = requests(&rt, &server);
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/test-started/com%2Fexample%2FFooTest%2Fbar",
            "/test-ended/com%2Fexample%2FFooTest%2Fbar",
            "/test-run-finished",
        ]
    );
    assert_eq!(requests[2].url.query(), Some("partial=true"));
    let body: serde_json::Value = requests[1].body_json().unwrap();
    assert_eq!(body["result"], "PASSED");
}

#[test]
fn test_reporting_from_async_runner_thread_does_not_panic() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let reporter = TestwiseReporter::from_config(&AgentConfig {
        url: Some("http://127.0.0.1:1".to_string()),
        accept_partial: false,
    })
    .unwrap();

    // Act
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        rt.block_on(async {
            reporter.start_test(&TestPath::from("pkg.MyTest.testA"));
        })
    }));

    // Assert
    assert!(outcome.is_ok(), "start_test panicked on an async thread");
    assert_eq!(reporter.tally().started, 1);
    assert_eq!(reporter.tally().transport_failures, 1);
}

#[test]
fn test_agent_reached_from_async_runner_thread() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let server = mock_agent(&rt, 200);
    let agent = HttpAgent::new(&server.uri()).unwrap();

    // Act
    let result = rt.block_on(async { agent.test_started("pkg%2FMyTest%2FtestA") });

    // Assert
    assert!(result.is_ok());
    let requests = requests(&rt, &server);
    assert_eq!(requests[0].url.path(), "/test-started/pkg%2FMyTest%2FtestA");
}

#[test]
fn test_agent_dropped_on_async_runner_thread() {
    // Arrange
    let rt = Runtime::new().unwrap();
    let reporter = TestwiseReporter::from_config(&AgentConfig {
        url: Some("http://127.0.0.1:1".to_string()),
        accept_partial: false,
    })
    .unwrap();

    // Act
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        rt.block_on(async move {
            reporter.end_run();
            drop(reporter);
        })
    }));

    // Assert
    assert!(outcome.is_ok(), "dropping the agent panicked on an async thread");
}
