// crates/webhook-notifier/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for webhook-notifier integration tests.
// Purpose: Provide stub webhook servers, TLS assets, and recording observers.
// Dependencies: webhook-notifier, rcgen, tiny_http
// ============================================================================

//! ## Overview
//! Provides stub HTTP(S) servers that capture requests, servers that never
//! answer, ephemeral TLS assets, and observers that collect delivery records.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Read;
use std::io::Write;
use std::net::Shutdown;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use rcgen::BasicConstraints;
use rcgen::CertificateParams;
use rcgen::DistinguishedName;
use rcgen::DnType;
use rcgen::IsCa;
use rcgen::Issuer;
use rcgen::KeyPair;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use tiny_http::SslConfig;
use webhook_notifier::DeliveryObserver;
use webhook_notifier::DeliveryRecord;
use webhook_notifier::Event;

// ============================================================================
// SECTION: Event Helpers
// ============================================================================

/// Creates the event used across delivery tests.
pub fn sample_event() -> Event {
    Event::new("message", "info")
        .with_involved_object("GitRepository", "webapp", "gitops-system")
        .with_metadata("test", "metadata")
}

/// Creates the sample event tagged as a commit status update.
pub fn sample_update_event() -> Event {
    sample_event().with_metadata("commit_status", "update")
}

// ============================================================================
// SECTION: Stub Webhook Server
// ============================================================================

/// Request captured by [`StubServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Header name/value pairs as received.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Returns the first header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response returned for every request.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    /// Status code.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl CannedResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// tiny_http server that records every request and answers with a canned response.
pub struct StubServer {
    /// Base URL, without trailing slash.
    url: String,
    /// Captured requests in arrival order.
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    /// Server handle used to unblock the worker on drop.
    server: Arc<Server>,
    /// Worker thread.
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Starts a plain HTTP server on an ephemeral port.
    pub fn start(response: CannedResponse) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        Self::spawn(server, format!("http://{addr}"), response)
    }

    /// Starts an HTTPS server on an ephemeral port using PEM assets.
    pub fn start_https(tls: &TlsAssets, response: CannedResponse) -> Self {
        let server = Server::https("127.0.0.1:0", SslConfig {
            certificate: tls.server_cert_pem.clone().into_bytes(),
            private_key: tls.server_key_pem.clone().into_bytes(),
        })
        .unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        Self::spawn(server, format!("https://localhost:{port}"), response)
    }

    /// Spawns the accept loop; each request is answered on its own thread.
    fn spawn(server: Server, url: String, response: CannedResponse) -> Self {
        let server = Arc::new(server);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for request in worker_server.incoming_requests() {
                let requests = Arc::clone(&worker_requests);
                let response = response.clone();
                thread::spawn(move || answer(request, &requests, &response));
            }
        });
        Self {
            url,
            requests,
            server,
            handle: Some(handle),
        }
    }

    /// Base URL of the server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Snapshot of captured requests.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Captures one request and replies with the canned response.
fn answer(
    mut request: tiny_http::Request,
    requests: &Mutex<Vec<CapturedRequest>>,
    response: &CannedResponse,
) {
    let mut body = Vec::new();
    let _ = request.as_reader().read_to_end(&mut body);
    let captured = CapturedRequest {
        method: request.method().to_string(),
        url: request.url().to_string(),
        headers: request
            .headers()
            .iter()
            .map(|header| (header.field.to_string(), header.value.to_string()))
            .collect(),
        body,
    };
    requests.lock().unwrap().push(captured);
    let mut reply = Response::from_data(response.body.clone()).with_status_code(response.status);
    for (name, value) in &response.headers {
        reply.add_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap());
    }
    let _ = request.respond(reply);
}

// ============================================================================
// SECTION: Unresponsive Endpoints
// ============================================================================

/// Starts a TCP listener that accepts connections and never answers.
///
/// Returns the base URL. The worker thread lives until the test process exits.
pub fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let mut held: Vec<TcpStream> = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => held.push(stream),
                Err(_) => break,
            }
        }
    });
    format!("http://{addr}")
}

/// Serves one connection with raw response bytes, then closes it.
///
/// The request is read in full first so the close is orderly. Returns the base
/// URL and the number of connections accepted so far.
pub fn raw_http_response_server(response: &'static [u8]) -> (String, Arc<Mutex<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&accepted);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                break;
            };
            *counter.lock().unwrap() += 1;
            read_request(&mut stream);
            let _ = stream.write_all(response);
            let _ = stream.flush();
            let _ = stream.shutdown(Shutdown::Both);
        }
    });
    (format!("http://{addr}"), accepted)
}

/// Reads request headers and a `Content-Length` body from `stream`.
fn read_request(stream: &mut TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = received.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(read) => received.extend_from_slice(&buf[.. read]),
        }
    };
    let headers = String::from_utf8_lossy(&received[.. header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while received.len() < header_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(read) => received.extend_from_slice(&buf[.. read]),
        }
    }
}

/// Returns a localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// SECTION: TLS Assets
// ============================================================================

/// PEM assets for a CA and a localhost server certificate it signed.
pub struct TlsAssets {
    /// CA certificate.
    pub ca_pem: String,
    /// Server certificate.
    pub server_cert_pem: String,
    /// Server private key (PKCS#8).
    pub server_key_pem: String,
}

/// Generates a fresh CA and localhost server certificate.
pub fn generate_tls_assets(ca_name: &str) -> TlsAssets {
    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::default();
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params.distinguished_name = distinguished_name(ca_name);
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();
    let issuer = Issuer::new(ca_params, ca_key);

    let server_key = KeyPair::generate().unwrap();
    let mut server_params =
        CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
    server_params.distinguished_name = distinguished_name("Webhook Notifier Test Server");
    server_params.is_ca = IsCa::NoCa;
    let server_cert = server_params.signed_by(&server_key, &issuer).unwrap();

    TlsAssets {
        ca_pem: ca_cert.pem(),
        server_cert_pem: server_cert.pem(),
        server_key_pem: server_key.serialize_pem(),
    }
}

/// Builds a distinguished name with a common name.
fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    name
}

// ============================================================================
// SECTION: Observers
// ============================================================================

/// Observer that keeps every record in memory.
#[derive(Default)]
pub struct RecordingObserver {
    /// Collected records.
    records: Mutex<Vec<DeliveryRecord>>,
}

impl RecordingObserver {
    /// Snapshot of collected records.
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl DeliveryObserver for RecordingObserver {
    fn record_delivery(&self, record: DeliveryRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// A thread-safe buffer for testing Write-based observers.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    /// Shared bytes.
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Returns the contents as a string.
    pub fn to_string_lossy(&self) -> String {
        let guard = self.inner.lock().expect("buffer lock");
        String::from_utf8_lossy(&guard).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A writer that always fails.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("simulated write failure"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
