/* 📖 # Why does the test double own its registry?

Every MockImpervaServer creates its own registry and hands a clone of the handle to
the API service it serves. Tests can start as many servers as they like in one
process without seeing each other's accounts, and the inspection helpers read the
same state the HTTP handlers write.
*/

use std::sync::Arc;

use imperva_mock_base::{HttpServerHandle, MockResult, ResultExt, start_http_server};
use tracing::info;

use crate::api::ApiService;
use crate::config::ServerConfig;
use crate::model::{Account, CspDomain, Site};
use crate::store::RegistryHandle;

/// An in-process simulation of the vendor REST API, listening on a local port.
///
/// ```no_run
/// use imperva_mock_engine::MockImpervaServer;
///
/// let server = MockImpervaServer::start().unwrap();
/// let base_url = server.url();
/// // point the client under test at base_url
/// server.close();
/// ```
#[derive(Debug)]
pub struct MockImpervaServer {
    registry: RegistryHandle,
    http: HttpServerHandle,
}

impl MockImpervaServer {
    /// Start on 127.0.0.1 with an OS-assigned port.
    pub fn start() -> MockResult<Self> {
        Self::start_with_config(&ServerConfig::default())
    }

    pub fn start_with_config(config: &ServerConfig) -> MockResult<Self> {
        let registry = RegistryHandle::default();
        let service = Arc::new(ApiService::new(registry.clone()));
        let http = start_http_server(service, &config.to_http_config())
            .context("Failed to start mock Imperva server")?;
        info!(url = %http.url(), "mock Imperva server started");
        Ok(Self { registry, http })
    }

    /// Base URL of the simulated API, without a trailing slash.
    pub fn url(&self) -> String {
        self.http.url()
    }

    pub fn port(&self) -> u16 {
        self.http.port()
    }

    pub fn get_account(&self, account_id: i64) -> Option<Account> {
        self.registry.get_account(account_id)
    }

    pub fn get_site(&self, site_id: i64) -> Option<Site> {
        self.registry.get_site(site_id)
    }

    pub fn get_csp_domain(&self, site_id: i64, domain: &str) -> Option<CspDomain> {
        self.registry.get_csp_domain(site_id, domain)
    }

    pub fn account_count(&self) -> usize {
        self.registry.account_count()
    }

    pub fn site_count(&self) -> usize {
        self.registry.site_count()
    }

    /// Drop all simulated state and restart ID allocation.
    pub fn reset(&self) {
        self.registry.reset();
    }

    /// Stop listening. Dropping the server does the same.
    pub fn close(mut self) {
        self.http.shutdown();
    }
}
