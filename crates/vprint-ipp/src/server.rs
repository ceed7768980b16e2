// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TCP transport for the virtual printer.
//
// IPP is carried over HTTP POST (RFC 8010 SS3).  We parse the HTTP framing
// just enough to find the `application/ipp` body: headers up to the blank
// line, then either `Content-Length` bytes or a chunked body.  A connection
// that does not open with an HTTP method is treated as raw IPP and read until
// the peer closes its write half.  Every reply is a minimal HTTP/1.1 200 OK
// wrapping the encoded IPP response.
//
// # mDNS advertisement
//
// When enabled, the server registers `_ipp._tcp.local.` via mDNS-SD on start
// so other devices on the LAN can discover it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use vprint_core::config::ServerConfig;
use vprint_core::error::{Result, VprintError};
use vprint_core::types::ServerStatus;

use crate::attribute::{Attribute, Group};
use crate::codec::{decode_request, encode_response};
use crate::dispatch::Dispatcher;
use crate::message::Response;
use crate::tag::StatusCode;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// mDNS service type for plain IPP.
const IPP_SERVICE_TYPE: &str = "_ipp._tcp.local.";

/// Size of each socket read.
const READ_CHUNK: usize = 8192;

const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

// ---------------------------------------------------------------------------
// IPP body handling
// ---------------------------------------------------------------------------

/// Decode `body`, dispatch it, and encode the reply.
///
/// A body that cannot be decoded is answered with client-error-bad-request
/// and request id 0, since no trustworthy id could be read.
pub fn respond(dispatcher: &Dispatcher, body: &[u8]) -> Result<Vec<u8>> {
    let response = match decode_request(body) {
        Ok(request) => {
            debug!(
                version = %request.version,
                operation = %request.operation,
                request_id = request.request_id,
                groups = request.groups.len(),
                doc_bytes = request.document.len(),
                "parsed IPP request"
            );
            dispatcher.process(&request)
        }
        Err(e) => {
            warn!(error = %e, "malformed IPP request");
            fault_response(StatusCode::ClientErrorBadRequest, 0, &format!("malformed request: {e}"))
        }
    };

    match encode_response(&response) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            error!(error = %e, "failed to encode IPP response");
            encode_response(&fault_response(
                StatusCode::ServerErrorInternalError,
                response.request_id,
                "response could not be encoded",
            ))
        }
    }
}

/// Error response whose `status-message` carries a free-form explanation.
fn fault_response(status: StatusCode, request_id: i32, message: &str) -> Response {
    Response::new(status, request_id)
        .with_group(Group::operation_attributes().with(Attribute::text("status-message", message)))
}

// ---------------------------------------------------------------------------
// HTTP envelope parsing
// ---------------------------------------------------------------------------

/// Minimal HTTP request metadata extracted from the raw TCP stream.
#[derive(Debug, Default, PartialEq)]
struct HttpRequest {
    /// The Content-Length value, if present.
    content_length: Option<usize>,
    /// `Transfer-Encoding: chunked` was sent.
    chunked: bool,
    /// `Expect: 100-continue` was sent.
    expect_continue: bool,
    /// The offset where the HTTP body (IPP payload) begins.
    body_offset: usize,
}

/// Whether the connection opened with an HTTP request line rather than the
/// binary IPP version bytes.
fn looks_like_http(data: &[u8]) -> bool {
    data.first().is_some_and(u8::is_ascii_uppercase)
}

/// Parse the headers of an HTTP/1.1 request.
///
/// Returns `None` until the blank line ending the headers has arrived.
fn parse_http_envelope(data: &[u8]) -> Option<HttpRequest> {
    let header_end = find_subsequence(data, b"\r\n\r\n")?;
    let headers = String::from_utf8_lossy(&data[..header_end]);

    let mut request = HttpRequest {
        body_offset: header_end + 4,
        ..HttpRequest::default()
    };
    for line in headers.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "content-length" => request.content_length = value.parse().ok(),
            "transfer-encoding" => {
                request.chunked = value.to_ascii_lowercase().contains("chunked");
            }
            "expect" => request.expect_continue = value.eq_ignore_ascii_case("100-continue"),
            _ => {}
        }
    }
    Some(request)
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Reassemble a chunked body (RFC 9112 SS7.1).
///
/// Returns `Ok(None)` while the terminating zero-size chunk has not arrived.
/// Trailer fields are ignored.
fn decode_chunked(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut body = Vec::with_capacity(data.len());
    let mut pos = 0;
    loop {
        let Some(line_len) = find_subsequence(&data[pos..], b"\r\n") else {
            return Ok(None);
        };
        let line = String::from_utf8_lossy(&data[pos..pos + line_len]);
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16).map_err(|_| {
            VprintError::PrintServer(format!("invalid chunk size {size_field:?}"))
        })?;
        pos += line_len + 2;

        if size == 0 {
            return Ok(Some(body));
        }
        let Some(chunk_end) = pos.checked_add(size) else {
            return Err(VprintError::PrintServer("chunk size overflow".into()));
        };
        if data.len() < chunk_end.saturating_add(2) {
            return Ok(None);
        }
        body.extend_from_slice(&data[pos..chunk_end]);
        pos = chunk_end + 2;
    }
}

/// The IPP body, once the buffered bytes hold a complete HTTP request.
fn complete_body(data: &[u8], envelope: &HttpRequest) -> Result<Option<Vec<u8>>> {
    let body = &data[envelope.body_offset..];
    if envelope.chunked {
        return decode_chunked(body);
    }
    Ok(match envelope.content_length {
        Some(len) if body.len() >= len => Some(body[..len].to_vec()),
        _ => None,
    })
}

/// Read one request from `stream` and return its IPP payload.
///
/// Returns `None` if the peer closed without sending anything. An HTTP
/// request with an empty body yields `Some` of an empty payload.
async fn read_request<S>(stream: &mut S, max_bytes: usize) -> Result<Option<Vec<u8>>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut continue_sent = false;

    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| VprintError::PrintServer(format!("read: {e}")))?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > max_bytes {
            return Err(VprintError::PrintServer(format!(
                "request exceeds {max_bytes} bytes"
            )));
        }

        if !looks_like_http(&buf) {
            continue;
        }
        let Some(envelope) = parse_http_envelope(&buf) else {
            continue;
        };
        if envelope.expect_continue && !continue_sent {
            stream
                .write_all(CONTINUE_RESPONSE)
                .await
                .map_err(|e| VprintError::PrintServer(format!("write 100 Continue: {e}")))?;
            continue_sent = true;
        }
        if let Some(body) = complete_body(&buf, &envelope)? {
            debug!(
                body_offset = envelope.body_offset,
                content_length = ?envelope.content_length,
                chunked = envelope.chunked,
                "HTTP envelope detected"
            );
            return Ok(Some(body));
        }
    }

    // Peer closed its write half.
    if buf.is_empty() {
        return Ok(None);
    }
    if looks_like_http(&buf) {
        if let Some(envelope) = parse_http_envelope(&buf) {
            if envelope.chunked {
                return decode_chunked(&buf[envelope.body_offset..])?
                    .map(Some)
                    .ok_or_else(|| {
                        VprintError::PrintServer("connection closed inside a chunked body".into())
                    });
            }
            let mut body = buf.split_off(envelope.body_offset);
            if let Some(len) = envelope.content_length {
                if body.len() < len {
                    return Err(VprintError::PrintServer(format!(
                        "connection closed after {} of {len} body bytes",
                        body.len()
                    )));
                }
                body.truncate(len);
            }
            return Ok(Some(body));
        }
    }
    debug!(bytes = buf.len(), "no HTTP envelope -- treating as raw IPP");
    Ok(Some(buf))
}

/// Send an IPP response wrapped in a minimal HTTP/1.1 200 OK.
async fn send_response<S>(stream: &mut S, ipp_body: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let http_response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/ipp\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        ipp_body.len()
    );

    stream
        .write_all(http_response.as_bytes())
        .await
        .map_err(|e| VprintError::PrintServer(format!("write HTTP headers: {e}")))?;
    stream
        .write_all(ipp_body)
        .await
        .map_err(|e| VprintError::PrintServer(format!("write IPP body: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| VprintError::PrintServer(format!("flush: {e}")))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared state passed to connection handlers
// ---------------------------------------------------------------------------

/// State shared across all connection-handling tasks.
struct SharedState {
    dispatcher: Arc<Dispatcher>,
    /// Counter of active connections.
    active_connections: Arc<AtomicU32>,
    max_request_bytes: usize,
}

// ---------------------------------------------------------------------------
// IppServer
// ---------------------------------------------------------------------------

/// TCP front end for a [`Dispatcher`].
pub struct IppServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    /// Current lifecycle state of the server.
    status: ServerStatus,
    /// Address actually bound, once running.
    local_addr: Option<SocketAddr>,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    /// Handle to the Tokio task running the accept loop.
    task_handle: Option<JoinHandle<()>>,
    /// Counter of currently active TCP connections.
    active_connections: Arc<AtomicU32>,
    /// Handle to the mDNS daemon for service advertisement.
    mdns_daemon: Option<mdns_sd::ServiceDaemon>,
    /// The mDNS service fullname (for unregistration on stop).
    mdns_fullname: Option<String>,
}

impl IppServer {
    /// Create a server in `Stopped` state. Call [`start`](Self::start) to
    /// begin accepting connections.
    pub fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            status: ServerStatus::Stopped,
            local_addr: None,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            active_connections: Arc::new(AtomicU32::new(0)),
            mdns_daemon: None,
            mdns_fullname: None,
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// Bound address while running. Reflects the real port when the
    /// configured port is 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Return the number of currently active client connections.
    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed or bound.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let (ServerStatus::Running, Some(addr)) = (self.status, self.local_addr) {
            debug!(addr = %addr, "IPP server already running");
            return Ok(addr);
        }

        self.status = ServerStatus::Starting;

        let bind = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = match TcpListener::bind(&bind).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Error;
                return Err(VprintError::PrintServer(format!("bind {bind}: {e}")));
            }
        };
        let addr = listener
            .local_addr()
            .map_err(|e| VprintError::PrintServer(format!("local address: {e}")))?;

        info!(addr = %addr, printer = %self.config.printer.name, "IPP print server listening");

        if self.config.advertise_mdns {
            self.register_mdns(addr.port());
        }

        let shared = Arc::new(SharedState {
            dispatcher: Arc::clone(&self.dispatcher),
            active_connections: Arc::clone(&self.active_connections),
            max_request_bytes: self.config.max_request_bytes,
        });
        let shutdown = Arc::clone(&self.shutdown_signal);

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, shared).await;
        });

        self.task_handle = Some(handle);
        self.local_addr = Some(addr);
        self.status = ServerStatus::Running;
        Ok(addr)
    }

    /// Gracefully stop the server.
    ///
    /// Signals the accept loop to exit and awaits its completion.  Connections
    /// already being served run to completion in their own tasks.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        info!(addr = ?self.local_addr, "stopping IPP print server");

        self.unregister_mdns();
        self.shutdown_signal.notify_one();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| VprintError::PrintServer(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        self.local_addr = None;
        info!("IPP print server stopped");
        Ok(())
    }

    /// Register this printer via mDNS-SD as `_ipp._tcp.local.`.
    ///
    /// Failure is logged and otherwise ignored: the printer still works via
    /// direct address.
    fn register_mdns(&mut self, port: u16) {
        let daemon = match mdns_sd::ServiceDaemon::new() {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "failed to create mDNS daemon for advertisement");
                return;
            }
        };

        let catalog = &self.config.printer;
        let pdl = catalog.document_formats_supported.join(",");
        let resource_path = resource_path(&catalog.uri);
        let properties = [
            ("txtvers", "1"),
            ("qtotal", "1"),
            ("rp", resource_path),
            ("ty", catalog.make_and_model.as_str()),
            ("note", catalog.location.as_str()),
            ("pdl", pdl.as_str()),
        ];

        let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "vprint".into());

        match mdns_sd::ServiceInfo::new(
            IPP_SERVICE_TYPE,
            &catalog.name,
            &format!("{hostname}.local."),
            "",
            port,
            &properties[..],
        ) {
            Ok(service_info) => {
                let service_info = service_info.enable_addr_auto();
                let fullname = service_info.get_fullname().to_owned();
                match daemon.register(service_info) {
                    Ok(_) => {
                        info!(
                            service_type = IPP_SERVICE_TYPE,
                            name = %catalog.name,
                            port,
                            "mDNS service registered"
                        );
                        self.mdns_fullname = Some(fullname);
                    }
                    Err(e) => warn!(error = %e, "failed to register mDNS service"),
                }
            }
            Err(e) => warn!(error = %e, "failed to create mDNS ServiceInfo"),
        }

        self.mdns_daemon = Some(daemon);
    }

    /// Unregister the mDNS service and shut down the daemon.
    fn unregister_mdns(&mut self) {
        let Some(daemon) = self.mdns_daemon.take() else {
            return;
        };
        if let Some(fullname) = self.mdns_fullname.take() {
            match daemon.unregister(&fullname) {
                Ok(_) => info!(name = %fullname, "mDNS service unregistered"),
                Err(e) => warn!(error = %e, "failed to unregister mDNS service"),
            }
        }
        if let Err(e) = daemon.shutdown() {
            warn!(error = %e, "failed to shut down mDNS daemon");
        }
    }

    /// Accept connections until the shutdown signal fires, handing each to
    /// its own task.
    async fn accept_loop(listener: TcpListener, shutdown: Arc<Notify>, shared: Arc<SharedState>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            debug!(peer = %peer_addr, "incoming IPP connection");
                            let state = Arc::clone(&shared);
                            tokio::spawn(async move {
                                state.active_connections.fetch_add(1, Ordering::Relaxed);
                                if let Err(e) = Self::handle_connection(stream, peer_addr, &state).await {
                                    warn!(peer = %peer_addr, error = %e, "connection handler error");
                                }
                                state.active_connections.fetch_sub(1, Ordering::Relaxed);
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Serve one request on `stream`.
    async fn handle_connection(
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        state: &SharedState,
    ) -> Result<()> {
        let Some(body) = read_request(&mut stream, state.max_request_bytes).await? else {
            debug!(peer = %peer_addr, "peer sent nothing -- closing connection");
            return Ok(());
        };
        debug!(peer = %peer_addr, bytes = body.len(), "received IPP request data");

        // The dispatcher takes a blocking mutex; keep it off the async workers.
        let dispatcher = Arc::clone(&state.dispatcher);
        let response = tokio::task::spawn_blocking(move || respond(&dispatcher, &body))
            .await
            .map_err(|e| VprintError::PrintServer(format!("dispatch task: {e}")))??;

        send_response(&mut stream, &response).await?;
        info!(peer = %peer_addr, response_bytes = response.len(), "IPP response sent");
        Ok(())
    }
}

/// Path component of a printer URI without its leading slash, used for the
/// `rp` TXT key.
fn resource_path(uri: &str) -> &str {
    let after_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    after_scheme
        .find('/')
        .map_or("", |slash| &after_scheme[slash + 1..])
}
