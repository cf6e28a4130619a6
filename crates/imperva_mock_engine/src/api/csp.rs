/* 📖 # Why do CSP handlers answer with HTTP status codes?

The CSP endpoints are the vendor's newer REST surface: success is 200/201/204 and
failures carry a real HTTP status plus `{code, message}`. Unlike the classic
endpoints, nothing here is wrapped in the `res` envelope.

Every domain-scoped route addresses its domain by reference; the reference is decoded
first and a bad reference is a 400 before any store access.
*/

use imperva_mock_base::{HttpRequest, HttpResponse, HttpStatusCode, MockResult};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::router::CspOp;
use crate::domain_ref::decode_domain_ref;
use crate::envelope::{csp_error, json_response};
use crate::model::{AuthorizationStatus, CspDomain, NewCspDomain, Note};
use crate::store::RegistryHandle;

const MSG_DOMAIN_NOT_FOUND: &str = "Domain not found";
const MSG_MISSING_DOMAIN_REF: &str = "Missing domain reference";
const MSG_EMPTY_DOMAIN: &str = "Domain must not be empty";

/// Dispatch one CSP operation.
pub fn handle(
    registry: &RegistryHandle,
    op: CspOp,
    site_id: i64,
    domain_ref: Option<&str>,
    request: &HttpRequest,
) -> MockResult<HttpResponse> {
    match op {
        CspOp::ListDomains => list_domains(registry, site_id),
        CspOp::AddDomain => add_domain(registry, site_id, request),
        _ => {
            let Some(reference) = domain_ref else {
                return csp_error(HttpStatusCode::BadRequest, MSG_MISSING_DOMAIN_REF);
            };
            let domain = match decode_domain_ref(reference) {
                Ok(domain) => domain,
                Err(e) => {
                    warn!(site_id, reference, error = %e, "bad domain reference");
                    return csp_error(HttpStatusCode::BadRequest, e.to_string());
                }
            };
            handle_domain(registry, op, site_id, &domain, request)
        }
    }
}

fn handle_domain(
    registry: &RegistryHandle,
    op: CspOp,
    site_id: i64,
    domain: &str,
    request: &HttpRequest,
) -> MockResult<HttpResponse> {
    match op {
        CspOp::GetDomain => match registry.get_csp_domain(site_id, domain) {
            Some(record) => json_response(HttpStatusCode::Ok, &record),
            None => csp_error(HttpStatusCode::NotFound, MSG_DOMAIN_NOT_FOUND),
        },
        CspOp::DeleteDomain => match registry.delete_csp_domain(site_id, domain) {
            Some(_) => Ok(HttpResponse::no_content()),
            None => csp_error(HttpStatusCode::NotFound, MSG_DOMAIN_NOT_FOUND),
        },
        CspOp::GetStatus => match registry.csp_status(site_id, domain) {
            Some(status) => json_response(HttpStatusCode::Ok, &status),
            None => csp_error(HttpStatusCode::NotFound, MSG_DOMAIN_NOT_FOUND),
        },
        CspOp::PutStatus => {
            let patch: AuthorizationStatus = match parse_json(request) {
                Ok(patch) => patch,
                Err(response) => return response,
            };
            let status = registry.update_csp_status(site_id, domain, patch);
            json_response(HttpStatusCode::Ok, &status)
        }
        CspOp::GetNotes => json_response(HttpStatusCode::Ok, &registry.csp_notes(site_id, domain)),
        CspOp::AddNote => {
            match registry.add_csp_note(site_id, domain, Note::from_api(request.body_text())) {
                Some(notes) => json_response(HttpStatusCode::Created, &notes),
                None => csp_error(HttpStatusCode::NotFound, MSG_DOMAIN_NOT_FOUND),
            }
        }
        CspOp::DeleteNotes => {
            registry.clear_csp_notes(site_id, domain);
            Ok(HttpResponse::no_content())
        }
        CspOp::ListDomains | CspOp::AddDomain => {
            csp_error(HttpStatusCode::BadRequest, "Unexpected domain reference")
        }
    }
}

fn list_domains(registry: &RegistryHandle, site_id: i64) -> MockResult<HttpResponse> {
    json_response(HttpStatusCode::Ok, &registry.list_csp_domains(site_id))
}

fn add_domain(
    registry: &RegistryHandle,
    site_id: i64,
    request: &HttpRequest,
) -> MockResult<HttpResponse> {
    let new_domain: NewCspDomain = match parse_json(request) {
        Ok(new_domain) => new_domain,
        Err(response) => return response,
    };
    // An empty name has no domain reference a later request could address.
    if new_domain.domain.trim().is_empty() {
        warn!(site_id, "rejected csp domain with empty name");
        return csp_error(HttpStatusCode::BadRequest, MSG_EMPTY_DOMAIN);
    }
    let record = registry.put_csp_domain(
        site_id,
        CspDomain::new(
            new_domain.domain,
            new_domain.subdomains,
            new_domain.apply_to_all_onboarded_paths,
        ),
    );
    debug!(site_id, domain = %record.domain, "csp domain stored");
    json_response(HttpStatusCode::Created, &record)
}

/// Decode a JSON body, or produce the 400 response to send instead.
fn parse_json<T: DeserializeOwned>(request: &HttpRequest) -> Result<T, MockResult<HttpResponse>> {
    serde_json::from_slice(request.body()).map_err(|e| {
        warn!(path = request.path(), error = %e, "malformed JSON body");
        csp_error(HttpStatusCode::BadRequest, format!("Invalid request body: {}", e))
    })
}
