/* 📖 # Why a table-driven router?

The simulated surface is a fixed set of vendor endpoints. Classic endpoints are exact
method and path pairs, so they live in a plain lookup table. CSP endpoints carry a
site ID and a domain reference in the path; each of their three URL shapes gets one
regex, compiled once. Anything that matches neither becomes `Route::NotImplemented`
and the service answers it with the 9999 envelope, so the router itself never fails.
*/

use std::sync::LazyLock;

use imperva_mock_base::HttpMethod;
use regex::Regex;

/// A classic form-encoded endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyOp {
    AddAccount,
    AccountStatus,
    ConfigureAccount,
    DeleteAccount,
    ShowDataPrivacy,
    SetDataPrivacyRegionDefault,
    AddSite,
    SiteStatus,
    ConfigureSite,
    DeleteSite,
}

/// A CSP endpoint, after method dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CspOp {
    ListDomains,
    AddDomain,
    GetDomain,
    DeleteDomain,
    GetStatus,
    PutStatus,
    GetNotes,
    AddNote,
    DeleteNotes,
}

/// The outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Legacy(LegacyOp),
    Csp {
        op: CspOp,
        site_id: i64,
        /// Still encoded; decoding failures are answered by the handler.
        domain_ref: Option<String>,
    },
    NotImplemented,
}

/// Classic endpoints; all of them are POST only.
const LEGACY_ROUTES: &[(&str, LegacyOp)] = &[
    ("accounts/add", LegacyOp::AddAccount),
    ("account", LegacyOp::AccountStatus),
    ("accounts/configure", LegacyOp::ConfigureAccount),
    ("accounts/delete", LegacyOp::DeleteAccount),
    ("accounts/data-privacy/show", LegacyOp::ShowDataPrivacy),
    (
        "accounts/data-privacy/set-region-default",
        LegacyOp::SetDataPrivacyRegionDefault,
    ),
    ("sites/add", LegacyOp::AddSite),
    ("sites/status", LegacyOp::SiteStatus),
    ("sites/configure", LegacyOp::ConfigureSite),
    ("sites/delete", LegacyOp::DeleteSite),
];

static PREAPPROVED_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^csp-api/v1/sites/(\d+)/preapprovedlist(?:/([^/]+))?$")
        .unwrap_or_else(|e| panic!("invalid preapprovedlist pattern: {e}"))
});

static DOMAIN_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^csp-api/v1/sites/(\d+)/domains/([^/]+)/status$")
        .unwrap_or_else(|e| panic!("invalid status pattern: {e}"))
});

static DOMAIN_NOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^csp-api/v1/sites/(\d+)/domains/([^/]+)/notes$")
        .unwrap_or_else(|e| panic!("invalid notes pattern: {e}"))
});

/// Map a method and path to a route.
pub fn route(method: &HttpMethod, path: &str) -> Route {
    let path = path.strip_prefix('/').unwrap_or(path);

    if *method == HttpMethod::Post {
        if let Some((_, op)) = LEGACY_ROUTES
            .iter()
            .find(|(route_path, _)| *route_path == path)
        {
            return Route::Legacy(*op);
        }
    }

    route_csp(method, path).unwrap_or(Route::NotImplemented)
}

fn route_csp(method: &HttpMethod, path: &str) -> Option<Route> {
    if let Some(captures) = PREAPPROVED_LIST.captures(path) {
        let site_id = parse_site_id(&captures[1])?;
        let domain_ref = captures.get(2).map(|m| m.as_str().to_string());
        let op = match (method, domain_ref.is_some()) {
            (HttpMethod::Get, false) => CspOp::ListDomains,
            (HttpMethod::Post, false) => CspOp::AddDomain,
            (HttpMethod::Get, true) => CspOp::GetDomain,
            (HttpMethod::Delete, true) => CspOp::DeleteDomain,
            _ => return None,
        };
        return Some(Route::Csp {
            op,
            site_id,
            domain_ref,
        });
    }

    let (captures, op) = if let Some(captures) = DOMAIN_STATUS.captures(path) {
        let op = match method {
            HttpMethod::Get => CspOp::GetStatus,
            HttpMethod::Put => CspOp::PutStatus,
            _ => return None,
        };
        (captures, op)
    } else if let Some(captures) = DOMAIN_NOTES.captures(path) {
        let op = match method {
            HttpMethod::Get => CspOp::GetNotes,
            HttpMethod::Post => CspOp::AddNote,
            HttpMethod::Delete => CspOp::DeleteNotes,
            _ => return None,
        };
        (captures, op)
    } else {
        return None;
    };

    Some(Route::Csp {
        op,
        site_id: parse_site_id(&captures[1])?,
        domain_ref: Some(captures[2].to_string()),
    })
}

// Digits that overflow i64 are treated like any other unroutable path.
fn parse_site_id(digits: &str) -> Option<i64> {
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csp(op: CspOp, site_id: i64, domain_ref: Option<&str>) -> Route {
        Route::Csp {
            op,
            site_id,
            domain_ref: domain_ref.map(str::to_string),
        }
    }

    #[test]
    fn test_legacy_routes() {
        assert_eq!(
            route(&HttpMethod::Post, "/accounts/add"),
            Route::Legacy(LegacyOp::AddAccount)
        );
        assert_eq!(
            route(&HttpMethod::Post, "/account"),
            Route::Legacy(LegacyOp::AccountStatus)
        );
        assert_eq!(
            route(&HttpMethod::Post, "sites/configure"),
            Route::Legacy(LegacyOp::ConfigureSite)
        );
        assert_eq!(
            route(&HttpMethod::Post, "/accounts/data-privacy/set-region-default"),
            Route::Legacy(LegacyOp::SetDataPrivacyRegionDefault)
        );
    }

    #[test]
    fn test_legacy_route_requires_post() {
        assert_eq!(route(&HttpMethod::Get, "/accounts/add"), Route::NotImplemented);
        assert_eq!(route(&HttpMethod::Post, "/accounts/add/"), Route::NotImplemented);
    }

    #[test]
    fn test_preapproved_list_routes() {
        assert_eq!(
            route(&HttpMethod::Get, "/csp-api/v1/sites/123/preapprovedlist"),
            csp(CspOp::ListDomains, 123, None)
        );
        assert_eq!(
            route(&HttpMethod::Post, "/csp-api/v1/sites/123/preapprovedlist"),
            csp(CspOp::AddDomain, 123, None)
        );
        assert_eq!(
            route(&HttpMethod::Get, "/csp-api/v1/sites/123/preapprovedlist/ZXhhbXBsZS5jb20"),
            csp(CspOp::GetDomain, 123, Some("ZXhhbXBsZS5jb20"))
        );
        assert_eq!(
            route(&HttpMethod::Delete, "/csp-api/v1/sites/123/preapprovedlist/ZXhhbXBsZS5jb20"),
            csp(CspOp::DeleteDomain, 123, Some("ZXhhbXBsZS5jb20"))
        );
    }

    #[test]
    fn test_status_and_notes_routes() {
        assert_eq!(
            route(&HttpMethod::Put, "/csp-api/v1/sites/7/domains/abc/status"),
            csp(CspOp::PutStatus, 7, Some("abc"))
        );
        assert_eq!(
            route(&HttpMethod::Get, "/csp-api/v1/sites/7/domains/abc/status"),
            csp(CspOp::GetStatus, 7, Some("abc"))
        );
        assert_eq!(
            route(&HttpMethod::Post, "/csp-api/v1/sites/7/domains/abc/notes"),
            csp(CspOp::AddNote, 7, Some("abc"))
        );
        assert_eq!(
            route(&HttpMethod::Delete, "/csp-api/v1/sites/7/domains/abc/notes"),
            csp(CspOp::DeleteNotes, 7, Some("abc"))
        );
    }

    #[test]
    fn test_unsupported_shapes_fall_through() {
        for (method, path) in [
            (HttpMethod::Put, "/csp-api/v1/sites/7/preapprovedlist"),
            (HttpMethod::Delete, "/csp-api/v1/sites/7/domains/abc/status"),
            (HttpMethod::Get, "/csp-api/v1/sites/abc/preapprovedlist"),
            (HttpMethod::Get, "/csp-api/v1/sites/99999999999999999999/preapprovedlist"),
            (HttpMethod::Get, "/csp-api/v1/sites/7/domains/abc/other"),
            (HttpMethod::Get, "/unknown"),
            (HttpMethod::Get, "/"),
            (HttpMethod::Other("TRACE".to_string()), "/accounts/add"),
            (HttpMethod::Other("PROPFIND".to_string()), "/csp-api/v1/sites/7/preapprovedlist"),
        ] {
            assert_eq!(route(&method, path), Route::NotImplemented, "{method} {path}");
        }
    }
}
