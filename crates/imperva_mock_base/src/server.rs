use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{ErrorKind, MockError, MockResult};
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpService, HttpStatusCode,
};

/* 📖 # Why tiny_http with a thread per request?

The simulated API does a single in-memory lookup or mutation per call. tiny_http gives
a blocking accept loop with no runtime to set up; each accepted request is handed to
its own thread so a slow client never stalls the others. Concurrency control lives in
the engine's store lock, not here.
*/

/// How long the accept loop waits before re-checking the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to a running HTTP server.
///
/// Dropping the handle (or calling [`HttpServerHandle::shutdown`]) stops the accept
/// loop and waits for it to exit. Requests already handed to worker threads finish on
/// their own.
pub struct HttpServerHandle {
    address: SocketAddr,
    server: Arc<tiny_http::Server>,
    shutdown: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl HttpServerHandle {
    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Get the socket address the server is listening on.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Base URL, e.g. `http://127.0.0.1:43127`.
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Check if the server has been signaled to shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Stop accepting connections and join the accept thread. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.server.unblock();
        if let Some(thread) = self.accept_thread.take() {
            if thread.join().is_err() {
                error!(address = %self.address, "HTTP accept thread panicked");
            }
            info!(address = %self.address, "HTTP server stopped");
        }
    }
}

impl fmt::Debug for HttpServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServerHandle")
            .field("address", &self.address)
            .field("shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

impl Drop for HttpServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Bind a tiny_http server and serve `service` on a background thread.
#[instrument(skip(service), fields(address = %config.address()))]
pub fn start_http_server(
    service: Arc<dyn HttpService>,
    config: &HttpServerConfig,
) -> MockResult<HttpServerHandle> {
    let server = tiny_http::Server::http(config.address()).map_err(|e| {
        Box::new(MockError::new(ErrorKind::ServerError {
            address: config.address(),
            message: e.to_string(),
        }))
    })?;
    let address = server.server_addr().to_ip().ok_or_else(|| {
        Box::new(MockError::new(ErrorKind::ServerError {
            address: config.address(),
            message: "listener is not bound to an IP address".to_string(),
        }))
    })?;

    let server = Arc::new(server);
    let shutdown = Arc::new(AtomicBool::new(false));
    let server_name = Arc::new(config.server_name.clone());

    let accept_thread = {
        let server = Arc::clone(&server);
        let shutdown = Arc::clone(&shutdown);
        std::thread::Builder::new()
            .name(format!("http-accept-{}", address.port()))
            .spawn(move || accept_loop(server, service, shutdown, server_name))
            .map_err(|e| {
                Box::new(MockError::new(ErrorKind::ServerError {
                    address: address.to_string(),
                    message: format!("failed to spawn accept thread: {}", e),
                }))
            })?
    };

    info!(%address, "HTTP server listening");
    Ok(HttpServerHandle {
        address,
        server,
        shutdown,
        accept_thread: Some(accept_thread),
    })
}

fn accept_loop(
    server: Arc<tiny_http::Server>,
    service: Arc<dyn HttpService>,
    shutdown: Arc<AtomicBool>,
    server_name: Arc<String>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => {
                let service = Arc::clone(&service);
                let server_name = Arc::clone(&server_name);
                std::thread::spawn(move || serve_request(request, service.as_ref(), &server_name));
            }
            Ok(None) => {}
            Err(e) => {
                if !shutdown.load(Ordering::SeqCst) {
                    error!(error = %e, "HTTP accept loop failed");
                }
                break;
            }
        }
    }
    debug!("HTTP accept loop exited");
}

fn serve_request(mut request: tiny_http::Request, service: &dyn HttpService, server_name: &str) {
    let method_name = request.method().as_str().to_string();
    let url = request.url().to_string();

    let response = match convert_request(&mut request) {
        Ok(http_request) => match service.handle_request(http_request) {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method_name, url = %url, error = %e, "service failed");
                failure_response(&e.to_string())
            }
        },
        Err(message) => {
            warn!(method = %method_name, url = %url, %message, "rejecting request");
            HttpResponse::text(message).with_status(HttpStatusCode::BadRequest)
        }
    };

    debug!(method = %method_name, url = %url, status = response.status().as_u16(), "responding");
    if let Err(e) = request.respond(to_tiny_response(response, server_name)) {
        warn!(url = %url, error = %e, "failed to write response");
    }
}

fn convert_request(request: &mut tiny_http::Request) -> Result<HttpRequest, String> {
    let method = HttpMethod::parse(request.method().as_str());

    let mut body = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut body)
        .map_err(|e| format!("Failed to read request body: {}", e))?;

    let mut http_request = HttpRequest::new(method, request.url()).with_body(body);
    for header in request.headers() {
        http_request = http_request.with_header(header.field.as_str().as_str(), header.value.as_str());
    }
    Ok(http_request)
}

/// HTTP 599 response for failures of the mock itself.
fn failure_response(message: &str) -> HttpResponse {
    HttpResponse::text(message).with_status(HttpStatusCode::MockFailure)
}

fn to_tiny_response(
    response: HttpResponse,
    server_name: &str,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut tiny_response = tiny_http::Response::from_data(response.into_body())
        .with_status_code(status);
    for (key, value) in headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(std::iter::once(("Server", server_name)))
    {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => tiny_response.add_header(header),
            Err(()) => warn!(header = key, "dropping invalid response header"),
        }
    }
    tiny_response
}
