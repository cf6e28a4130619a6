/* 📖 # Why do site responses carry DNS instructions?

The vendor answers `sites/add` and `sites/status` with the A and CNAME records the
customer must publish to route traffic through the CDN, and clients act on them.
The mock derives both records from the site ID, so a test can predict them without
reading them back first.
*/

use imperva_mock_base::{FormParams, HttpResponse, MockResult};
use serde::Serialize;
use tracing::{debug, warn};

use crate::envelope::{
    LegacyEnvelope, MSG_INVALID_PARAMETER, MSG_UNKNOWN_SITE, RES_INVALID_PARAMETER,
    RES_UNKNOWN_ID, legacy_error, legacy_response,
};
use crate::model::{DnsRecord, NewSite, Site};
use crate::store::{ConfigureError, RegistryHandle};

/// Body of `sites/add` and `sites/status`.
#[derive(Debug, Serialize)]
struct SiteBody<'a> {
    #[serde(flatten)]
    envelope: LegacyEnvelope,
    site_id: i64,
    account_id: i64,
    status: &'a str,
    domain: &'a str,
    site_type: &'a str,
    ref_id: &'a str,
    dns: Vec<DnsRecord>,
}

impl<'a> SiteBody<'a> {
    fn new(site: &'a Site) -> Self {
        Self {
            envelope: LegacyEnvelope::ok(),
            site_id: site.site_id,
            account_id: site.account_id,
            status: &site.status,
            domain: &site.domain,
            site_type: &site.site_type,
            ref_id: &site.ref_id,
            dns: site.dns_records(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfiguredBody {
    #[serde(flatten)]
    envelope: LegacyEnvelope,
    site_id: i64,
}

/// `POST /sites/add`
pub fn add_site(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    let site = registry.add_site(NewSite {
        domain: params.get_or_empty("domain"),
        account_id: params.get_i64_or_zero("account_id"),
        site_type: params.get_or_empty("site_type"),
        ref_id: params.get_or_empty("ref_id"),
    });
    debug!(site_id = site.site_id, domain = %site.domain, "site created");
    legacy_response(&SiteBody::new(&site))
}

/// `POST /sites/status`
pub fn site_status(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    match registry.get_site(params.get_i64_or_zero("site_id")) {
        Some(site) => legacy_response(&SiteBody::new(&site)),
        None => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_SITE),
    }
}

/// `POST /sites/configure`
pub fn configure_site(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    let site_id = params.get_i64_or_zero("site_id");
    let param = params.get_or_empty("param");
    let value = params.get_or_empty("value");

    match registry.configure_site(site_id, &param, &value) {
        Ok(_) => legacy_response(&ConfiguredBody {
            envelope: LegacyEnvelope::ok(),
            site_id,
        }),
        Err(ConfigureError::NotFound) => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_SITE),
        Err(ConfigureError::InvalidParameter) => {
            warn!(site_id, param = %param, "rejected site setting");
            legacy_error(RES_INVALID_PARAMETER, MSG_INVALID_PARAMETER)
        }
    }
}

/// `POST /sites/delete`
pub fn delete_site(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    match registry.delete_site(params.get_i64_or_zero("site_id")) {
        Some(_) => legacy_response(&LegacyEnvelope::ok()),
        None => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_SITE),
    }
}
