/* 📖 # Why have imperva_mock_base as a separate library?
imperva_mock_base provides the error type, tracing setup and HTTP plumbing shared by
the mock engine and the CLI. Keeping the tiny_http details here means the engine
only ever sees plain request/response values, which keeps its handlers testable
without opening sockets.
*/

pub mod error;
pub mod http;
pub mod server;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, MockError, MockResult, ResultExt};
pub use http::{
    FormParams, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpServerConfig,
    HttpService, HttpStatusCode,
};
pub use server::{HttpServerHandle, start_http_server};
