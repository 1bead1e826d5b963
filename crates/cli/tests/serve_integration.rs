//! Integration tests for the `frontdesk serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port with
//! the demo data set loaded, makes HTTP requests, and verifies the
//! responses.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so parallel `cargo test --workspace`
/// runs (which spawn separate test binaries) don't collide on the same port
/// range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Helper: start `frontdesk serve --seed` on the given port.
fn start_server(port: u16, extra_args: &[&str]) -> Child {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_frontdesk"));
    cmd.arg("serve")
        .arg("--port")
        .arg(port.to_string())
        .arg("--seed");
    for arg in extra_args {
        cmd.arg(arg);
    }
    // Redirect stdout/stderr to avoid blocking
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let child = cmd.spawn().expect("failed to start frontdesk serve");
    // Wait for server to be ready by polling the port
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            return child;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    child
}

/// Helper: make a simple HTTP GET request and return (status, body).
fn http_get(port: u16, path: &str) -> (u16, String) {
    let (status, _, body) = http_get_full(port, path);
    (status, body)
}

/// Helper: make an HTTP GET request and return (status, headers, body).
fn http_get_full(port: u16, path: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
        path, port
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response_full(&response)
}

/// Helper: make a simple HTTP POST request and return (status, body).
fn http_post(port: u16, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost:{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path, port, body.len(), body
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    let (status, _, body) = parse_http_response_full(&response);
    (status, body)
}

/// Extract a header value from raw headers string.
fn extract_header<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    let name_lower = name.to_lowercase();
    for line in headers.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().to_lowercase() == name_lower {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Parse an HTTP response into (status_code, headers_string, body).
fn parse_http_response_full(response: &str) -> (u16, String, String) {
    let parts: Vec<&str> = response.splitn(2, "\r\n\r\n").collect();
    let headers = parts.first().unwrap_or(&"").to_string();
    let body = parts.get(1).unwrap_or(&"").to_string();

    let status_line = headers.lines().next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    // Handle chunked transfer encoding
    let body = if headers.contains("Transfer-Encoding: chunked") {
        decode_chunked(&body)
    } else {
        body
    };

    (status, headers, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(data: &str) -> String {
    let mut result = String::new();
    let mut remaining = data;

    while let Some(line_end) = remaining.find("\r\n") {
        let size_str = &remaining[..line_end];
        let size = match usize::from_str_radix(size_str.trim(), 16) {
            Ok(s) => s,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + size;
        if chunk_end > remaining.len() {
            // Partial chunk, take what we have
            result.push_str(&remaining[chunk_start..]);
            break;
        }
        result.push_str(&remaining[chunk_start..chunk_end]);
        // Skip past chunk data + \r\n
        remaining = if chunk_end + 2 <= remaining.len() {
            &remaining[chunk_end + 2..]
        } else {
            ""
        };
    }

    result
}

#[test]
fn health_returns_200_with_version() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_get(port, "/health");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some(), "version field must be present");
}

#[test]
fn bookings_list_newest_first() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_get(port, "/bookings");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], true);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["booking_id"], "BK1003");
    assert_eq!(data[2]["booking_id"], "BK1001");
}

#[test]
fn transition_paid_updates_booking_and_logs() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_post(
        port,
        "/bookings/BK1001/transition",
        r#"{"action": "paid"}"#,
    );
    assert_eq!(status, 200, "body: {}", body);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Booking status updated successfully.");
    assert_eq!(json["status"], "Confirmed");
    assert_eq!(json["payment_status"], "Partial Payment");

    let (status, body) = http_get(port, "/bookings/BK1001");
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["data"]["payment_status"], "Partial Payment");

    let (status, body) = http_get(port, "/logs");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["total"], 1);
    let row = &json["data"][0];
    assert_eq!(row["booking_id"], "BK1001");
    assert_eq!(row["last_action"], "Paid");
    assert_eq!(row["payment_status"], "Partial Payment");
    assert_eq!(row["performed_by"], "Admin");
}

#[test]
fn checkin_with_datetime_records_event_timestamp() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, _) = http_post(
        port,
        "/bookings/BK1002/transition",
        r#"{"action": "checkin", "datetime": "2025-09-02T14:30:00"}"#,
    );
    assert_eq!(status, 200);

    let (status, body) = http_get(port, "/bookings/BK1002");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["data"]["status"], "Checked-in");
    assert_eq!(json["data"]["check_in_time"], "2025-09-02T14:30:00");
}

#[test]
fn invalid_action_returns_400() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_post(
        port,
        "/bookings/BK1001/transition",
        r#"{"action": "refund"}"#,
    );
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("invalid action"));
}

#[test]
fn unknown_booking_returns_400() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_post(port, "/bookings/ghost/transition", r#"{"action": "paid"}"#);
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("not found"));
}

#[test]
fn malformed_datetime_returns_400() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_post(
        port,
        "/bookings/BK1001/transition",
        r#"{"action": "checkin", "datetime": "next tuesday"}"#,
    );
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("invalid datetime"));
}

#[test]
fn logs_filter_by_status_and_paginate() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, _) = http_post(port, "/bookings/BK1001/transition", r#"{"action": "paid"}"#);
    assert_eq!(status, 200);
    let (status, _) = http_post(
        port,
        "/bookings/BK1002/transition",
        r#"{"action": "cancel"}"#,
    );
    assert_eq!(status, 200);

    let (status, body) = http_get(port, "/logs?status=Cancelled");
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["booking_id"], "BK1002");

    // "All" placeholders act like no filter at all.
    let (status, body) = http_get(port, "/logs?status=All&payment_status=All&page=1");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["total"], 2);
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_size"], 10);
    assert_eq!(json["total_pages"], 1);
}

#[test]
fn csv_export_has_fixed_header_and_attachment_disposition() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, _) = http_post(port, "/bookings/BK1001/transition", r#"{"action": "paid"}"#);
    assert_eq!(status, 200);

    let (status, headers, body) = http_get_full(port, "/logs/export.csv");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    assert!(extract_header(&headers, "content-type")
        .unwrap_or("")
        .starts_with("text/csv"));
    assert!(extract_header(&headers, "content-disposition")
        .unwrap_or("")
        .contains("booking_logs_"));
    let first_line = body.lines().next().unwrap_or("");
    assert_eq!(
        first_line,
        "Log ID,Booking ID,Guest Name,Payment Status,Status,Room,Check-In,Check-Out,Last Action,Timestamp,Performed By"
    );
    assert!(body.contains("Alice Moore"));
}

#[test]
fn legacy_schema_stores_legacy_label_but_reports_canonical() {
    let port = next_port();
    let mut child = start_server(port, &["--legacy-schema"]);

    let (status, body) = http_post(
        port,
        "/bookings/BK1001/transition",
        r#"{"action": "checkout"}"#,
    );
    assert_eq!(status, 200, "body: {}", body);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["payment_status"], "Payment Complete");

    let (status, body) = http_get(port, "/bookings/BK1001");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["data"]["payment_status"], "Completed");
}

#[test]
fn unknown_route_returns_404_json() {
    let port = next_port();
    let mut child = start_server(port, &[]);

    let (status, body) = http_get(port, "/nope");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 404);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], false);
}
