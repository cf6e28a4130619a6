/* 📖 # Why a single API service?

One HttpService value answers every endpoint of the simulated vendor API. It owns a
handle to the registry, asks the router which operation a request names, and hands
the request to the matching handler. Registering one service keeps the server
plumbing in imperva_mock_base ignorant of the vendor surface.

Handlers turn every simulated vendor error into a normal response, so an `Err` from
`handle_request` only ever means the mock itself broke.
*/

use imperva_mock_base::{HttpRequest, HttpResponse, HttpService, MockResult};
use tracing::debug;

use crate::api::router::{LegacyOp, Route, route};
use crate::api::{accounts, csp, sites};
use crate::envelope::{RES_NOT_IMPLEMENTED, legacy_error};
use crate::store::RegistryHandle;

/// The simulated vendor API.
#[derive(Debug, Clone)]
pub struct ApiService {
    registry: RegistryHandle,
}

impl ApiService {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    fn handle_legacy(&self, op: LegacyOp, request: &HttpRequest) -> MockResult<HttpResponse> {
        let params = request.form_params();
        let registry = &self.registry;
        match op {
            LegacyOp::AddAccount => accounts::add_account(registry, &params),
            LegacyOp::AccountStatus => accounts::account_status(registry, &params),
            LegacyOp::ConfigureAccount => accounts::configure_account(registry, &params),
            LegacyOp::DeleteAccount => accounts::delete_account(registry, &params),
            LegacyOp::ShowDataPrivacy => accounts::show_data_privacy(),
            LegacyOp::SetDataPrivacyRegionDefault => accounts::set_data_privacy_region_default(),
            LegacyOp::AddSite => sites::add_site(registry, &params),
            LegacyOp::SiteStatus => sites::site_status(registry, &params),
            LegacyOp::ConfigureSite => sites::configure_site(registry, &params),
            LegacyOp::DeleteSite => sites::delete_site(registry, &params),
        }
    }
}

impl HttpService for ApiService {
    fn handle_request(&self, request: HttpRequest) -> MockResult<HttpResponse> {
        let route = route(request.method(), request.path());
        debug!(method = %request.method(), path = request.path(), ?route, "routing request");

        match route {
            Route::Legacy(op) => self.handle_legacy(op, &request),
            Route::Csp {
                op,
                site_id,
                domain_ref,
            } => csp::handle(&self.registry, op, site_id, domain_ref.as_deref(), &request),
            Route::NotImplemented => legacy_error(
                RES_NOT_IMPLEMENTED,
                format!(
                    "Endpoint not implemented: {} {}",
                    request.method(),
                    request.path()
                ),
            ),
        }
    }
}
