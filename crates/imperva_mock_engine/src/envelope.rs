/* 📖 # Why two response conventions?

The classic vendor endpoints always answer HTTP 200 and put the outcome in the body:
`res` is 0 on success or a vendor error code, `res_message` explains it. The newer CSP
endpoints use HTTP status codes and only carry `{code, message}` on failure. The mock
reproduces both so client code sees exactly what the vendor would send.
*/

use imperva_mock_base::{HttpResponse, HttpStatusCode, MockError, MockResult};
use serde::{Deserialize, Serialize};

/// Success.
pub const RES_OK: i64 = 0;
/// Validation failure on `configure` parameters.
pub const RES_INVALID_PARAMETER: i64 = 6001;
/// Unknown or unauthorized account/site.
pub const RES_UNKNOWN_ID: i64 = 9413;
/// No such endpoint in the simulation.
pub const RES_NOT_IMPLEMENTED: i64 = 9999;

pub const MSG_OK: &str = "OK";
pub const MSG_UNKNOWN_ACCOUNT: &str = "Unknown/unauthorized account_id";
pub const MSG_UNKNOWN_SITE: &str = "Unknown/unauthorized site_id";
pub const MSG_INVALID_PARAMETER: &str = "Invalid configuration parameter";

/* 📖 # Why is `res` a union of integer and string?
Depending on the endpoint the vendor has sent `"res": 0` and `"res": "0"`. Clients that
decode responses from this mock go through ResCode so both shapes are accepted, and
`as_i64` normalises them.
*/

/// The `res` field of a classic response: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResCode {
    Int(i64),
    Text(String),
}

impl ResCode {
    /// Numeric value; a string parses if it holds an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(code) => Some(*code),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.as_i64() == Some(RES_OK)
    }
}

impl From<i64> for ResCode {
    fn from(code: i64) -> Self {
        Self::Int(code)
    }
}

/// `res`/`res_message` pair shared by every classic response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEnvelope {
    pub res: ResCode,
    #[serde(default)]
    pub res_message: String,
}

impl LegacyEnvelope {
    pub fn ok() -> Self {
        Self::error(RES_OK, MSG_OK)
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            res: ResCode::Int(code),
            res_message: message.into(),
        }
    }
}

/// Error body of the CSP endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspError {
    pub code: u16,
    pub message: String,
}

/// Serialize `data` and wrap it in a JSON response with the given status.
pub fn json_response<T: Serialize>(status: HttpStatusCode, data: &T) -> MockResult<HttpResponse> {
    serde_json::to_string(data)
        .map(|json| HttpResponse::json(json).with_status(status))
        .map_err(|e| Box::new(MockError::message(format!("JSON serialization error: {}", e))))
}

/// Classic response: always HTTP 200.
pub fn legacy_response<T: Serialize>(data: &T) -> MockResult<HttpResponse> {
    json_response(HttpStatusCode::Ok, data)
}

/// Classic error envelope: HTTP 200 with a vendor code.
pub fn legacy_error(code: i64, message: impl Into<String>) -> MockResult<HttpResponse> {
    legacy_response(&LegacyEnvelope::error(code, message))
}

/// CSP error: the HTTP status doubles as the embedded code.
pub fn csp_error(status: HttpStatusCode, message: impl Into<String>) -> MockResult<HttpResponse> {
    json_response(
        status,
        &CspError {
            code: status.as_u16(),
            message: message.into(),
        },
    )
}
