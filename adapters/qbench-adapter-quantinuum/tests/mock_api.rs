//! Backend behaviour against an in-process mock of the Quantinuum API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use qbench_adapter_quantinuum::QuantinuumBackend;
use qbench_hal::{Backend, BackendConfig, BackendFactory, HalError, JobStatus, RawOutcome};
use qbench_ir::Circuit;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct MockState {
    logins: u32,
    /// Token accepted by authorized endpoints.
    valid_token: String,
    /// Status polls answered with "queued" before the job completes.
    queued_polls: u32,
    submitted_programs: Vec<String>,
}

struct Request {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(Request {
        method,
        path,
        authorization,
        body,
    })
}

fn route(state: &Mutex<MockState>, req: &Request) -> (u16, serde_json::Value) {
    let mut state = state.lock().unwrap();

    if req.method == "POST" && req.path.ends_with("/login") {
        state.logins += 1;
        let token = format!("tok-{}", state.logins);
        return (200, json!({ "id-token": token }));
    }
    if req.authorization.as_deref() != Some(state.valid_token.as_str()) {
        return (401, json!({ "error": "expired" }));
    }

    match (req.method.as_str(), req.path.as_str()) {
        ("POST", p) if p.ends_with("/job") => {
            let body: serde_json::Value = serde_json::from_str(&req.body).unwrap_or_default();
            state
                .submitted_programs
                .push(body["program"].as_str().unwrap_or_default().to_string());
            (200, json!({ "job": "job-1" }))
        }
        ("GET", p) if p.ends_with("/job/job-1") => {
            if state.queued_polls > 0 {
                state.queued_polls -= 1;
                (200, json!({ "job": "job-1", "status": "queued" }))
            } else {
                (
                    200,
                    json!({
                        "job": "job-1",
                        "status": "completed",
                        "results": { "c": ["00", "11", "11", "00", "11"] }
                    }),
                )
            }
        }
        ("GET", p) if p.ends_with("/job/missing") => (404, json!({ "error": "no such job" })),
        ("GET", p) if p.contains("/machine/") => (
            200,
            json!({ "name": "H1-1E", "status": "online", "queue-length": 3 }),
        ),
        _ => (500, json!({ "error": "unexpected request" })),
    }
}

async fn serve(listener: TcpListener, state: Arc<Mutex<MockState>>) {
    while let Ok((mut stream, _)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let Some(req) = read_request(&mut stream).await else {
                return;
            };
            let (status, body) = route(&state, &req);
            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
    }
}

async fn start(valid_token: &str, queued_polls: u32) -> (QuantinuumBackend, Arc<Mutex<MockState>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(MockState {
        valid_token: valid_token.to_string(),
        queued_polls,
        ..MockState::default()
    }));
    tokio::spawn(serve(listener, Arc::clone(&state)));

    let config = BackendConfig::new("quantinuum")
        .with_endpoint(format!("http://{addr}/v1"))
        .with_token("password")
        .with_extra("email", json!("user@example.com"))
        .with_extra("machine", json!("H1-1E"));
    (QuantinuumBackend::from_config(config).unwrap(), state)
}

#[tokio::test]
async fn test_submit_and_collect_counts() {
    let (backend, state) = start("tok-1", 0).await;

    let compiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
    let job_id = backend.submit(&compiled.circuit, 5).await.unwrap();
    assert_eq!(job_id.0, "job-1");

    let result = backend
        .wait_for(&job_id, Duration::from_secs(5), Duration::from_millis(10))
        .await
        .unwrap();
    let RawOutcome::Counts(counts) = result.outcome else {
        panic!("expected counts");
    };
    assert_eq!(counts.get("11"), 3);
    assert_eq!(counts.get("00"), 2);
    assert_eq!(result.shots, 5);

    let state = state.lock().unwrap();
    assert_eq!(state.logins, 1);
    assert!(state.submitted_programs[0].starts_with("OPENQASM 2.0;"));
}

#[tokio::test]
async fn test_reauthenticates_once_on_401() {
    // The first token is rejected; the second login's token is accepted.
    let (backend, state) = start("tok-2", 0).await;

    let compiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
    backend.submit(&compiled.circuit, 5).await.unwrap();
    assert_eq!(state.lock().unwrap().logins, 2);
}

#[tokio::test]
async fn test_persistent_401_is_auth_failure() {
    let (backend, _state) = start("never", 0).await;

    let compiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
    let err = backend.submit(&compiled.circuit, 5).await.unwrap_err();
    assert!(matches!(err, HalError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_bounded_wait_times_out_while_queued() {
    let (backend, _state) = start("tok-1", u32::MAX).await;

    let compiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
    let job_id = backend.submit(&compiled.circuit, 5).await.unwrap();
    assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Queued);

    let err = backend
        .wait_for(&job_id, Duration::from_millis(100), Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::Timeout(id) if id == "job-1"));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (backend, _state) = start("tok-1", 0).await;
    let err = backend.status(&"missing".into()).await.unwrap_err();
    assert!(matches!(err, HalError::JobNotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_availability_reports_queue() {
    let (backend, _state) = start("tok-1", 0).await;
    let availability = backend.availability().await.unwrap();
    assert!(availability.is_available);
    assert_eq!(availability.queue_depth, Some(3));
}
