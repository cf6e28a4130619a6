/* 📖 # Why is every account field sent twice?

The vendor has answered account calls both with the fields at the top level and with
them nested under `account`. Clients in the wild read either shape, so the mock emits
both from one serialized struct.
*/

use imperva_mock_base::{FormParams, HttpResponse, MockResult};
use serde::Serialize;
use tracing::{debug, warn};

use crate::envelope::{
    LegacyEnvelope, MSG_INVALID_PARAMETER, MSG_UNKNOWN_ACCOUNT, RES_INVALID_PARAMETER,
    RES_UNKNOWN_ID, legacy_error, legacy_response,
};
use crate::model::{Account, Login, NewAccount, SettingOutcome};
use crate::store::{ConfigureError, RegistryHandle};

/// Region reported by the data-privacy endpoints.
pub const DEFAULT_DATA_REGION: &str = "US";

#[derive(Debug, Serialize)]
struct AccountBody<'a> {
    #[serde(flatten)]
    envelope: LegacyEnvelope,
    account_id: i64,
    email: &'a str,
    account_name: &'a str,
    parent_id: i64,
    plan_id: &'a str,
    ref_id: &'a str,
    user_name: &'a str,
    logins: &'a [Login],
    account: &'a Account,
}

impl<'a> AccountBody<'a> {
    fn new(account: &'a Account) -> Self {
        Self {
            envelope: LegacyEnvelope::ok(),
            account_id: account.account_id,
            email: &account.email,
            account_name: &account.account_name,
            parent_id: account.parent_id,
            plan_id: &account.plan_id,
            ref_id: &account.ref_id,
            user_name: &account.user_name,
            logins: &account.logins,
            account,
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfiguredBody {
    #[serde(flatten)]
    envelope: LegacyEnvelope,
    account_id: i64,
}

#[derive(Debug, Serialize)]
struct RegionBody {
    #[serde(flatten)]
    envelope: LegacyEnvelope,
    region: &'static str,
}

/// `POST /accounts/add`
pub fn add_account(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    let account = registry.add_account(NewAccount {
        email: params.get_or_empty("email"),
        account_name: params.get_or_empty("account_name"),
        parent_id: params.get_i64_or_zero("parent_id"),
        plan_id: params.get_or_empty("plan_id"),
        ref_id: params.get_or_empty("ref_id"),
        user_name: params.get_or_empty("user_name"),
    });
    debug!(account_id = account.account_id, "account created");
    legacy_response(&AccountBody::new(&account))
}

/// `POST /account`
pub fn account_status(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    if params.get("account_id").is_none_or(str::is_empty) {
        return legacy_response(&AccountBody::new(&Account::verification_account()));
    }
    let account_id = params.get_i64_or_zero("account_id");
    match registry.get_account(account_id) {
        Some(account) => legacy_response(&AccountBody::new(&account)),
        None => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_ACCOUNT),
    }
}

/// `POST /accounts/configure`
pub fn configure_account(
    registry: &RegistryHandle,
    params: &FormParams,
) -> MockResult<HttpResponse> {
    let account_id = params.get_i64_or_zero("account_id");
    let param = params.get_or_empty("param");
    let value = params.get_or_empty("value");

    match registry.configure_account(account_id, &param, &value) {
        Ok(outcome) => {
            if outcome == SettingOutcome::Ignored {
                debug!(account_id, param = %param, "setting accepted but not stored");
            }
            legacy_response(&ConfiguredBody {
                envelope: LegacyEnvelope::ok(),
                account_id,
            })
        }
        Err(ConfigureError::NotFound) => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_ACCOUNT),
        Err(ConfigureError::InvalidParameter) => {
            warn!(account_id, param = %param, "rejected account setting");
            legacy_error(RES_INVALID_PARAMETER, MSG_INVALID_PARAMETER)
        }
    }
}

/// `POST /accounts/delete`
pub fn delete_account(registry: &RegistryHandle, params: &FormParams) -> MockResult<HttpResponse> {
    let account_id = params.get_i64_or_zero("account_id");
    match registry.delete_account(account_id) {
        Some(_) => legacy_response(&LegacyEnvelope::ok()),
        None => legacy_error(RES_UNKNOWN_ID, MSG_UNKNOWN_ACCOUNT),
    }
}

/// `POST /accounts/data-privacy/show`
pub fn show_data_privacy() -> MockResult<HttpResponse> {
    legacy_response(&RegionBody {
        envelope: LegacyEnvelope::ok(),
        region: DEFAULT_DATA_REGION,
    })
}

/// `POST /accounts/data-privacy/set-region-default`
pub fn set_data_privacy_region_default() -> MockResult<HttpResponse> {
    legacy_response(&LegacyEnvelope::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use imperva_mock_base::HttpStatusCode;

    fn params(pairs: &[(&str, &str)]) -> FormParams {
        let mut params = FormParams::default();
        for (key, value) in pairs {
            params.insert(*key, *value);
        }
        params
    }

    fn body(response: HttpResponse) -> serde_json::Value {
        assert_eq!(response.status(), HttpStatusCode::Ok);
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_add_account_response_shape() {
        let registry = RegistryHandle::default();
        let response = add_account(
            &registry,
            &params(&[("email", "test@example.com"), ("account_name", "Acme")]),
        )
        .unwrap();

        expect![[r#"{"res":0,"res_message":"OK","account_id":1000,"email":"test@example.com","account_name":"Acme","parent_id":0,"plan_id":"","ref_id":"","user_name":"","logins":[{"login_id":1000,"email":"test@example.com","email_verified":false}],"account":{"account_id":1000,"email":"test@example.com","parent_id":0,"account_name":"Acme","plan_id":"","ref_id":"","user_name":"","trial_end_date":"","logins":[{"login_id":1000,"email":"test@example.com","email_verified":false}]}}"#]]
            .assert_eq(&response.body_string().unwrap());
    }

    #[test]
    fn test_account_status_without_id_returns_verification_account() {
        let registry = RegistryHandle::default();
        for request in [params(&[]), params(&[("account_id", "")])] {
            let json = body(account_status(&registry, &request).unwrap());
            assert_eq!(json["res"], 0);
            assert_eq!(json["account"]["account_id"], 1000);
            assert_eq!(json["account"]["plan_id"], "Enterprise");
        }
        assert_eq!(registry.account_count(), 0);
    }

    #[test]
    fn test_account_status_unknown_id() {
        let registry = RegistryHandle::default();
        for id in ["4242", "not-a-number"] {
            let json = body(account_status(&registry, &params(&[("account_id", id)])).unwrap());
            assert_eq!(json["res"], 9413);
            assert_eq!(json["res_message"], "Unknown/unauthorized account_id");
        }
    }

    #[test]
    fn test_configure_account() {
        let registry = RegistryHandle::default();
        let id = registry.add_account(NewAccount::default()).account_id.to_string();

        let json = body(
            configure_account(
                &registry,
                &params(&[("account_id", id.as_str()), ("param", "name"), ("value", "Renamed")]),
            )
            .unwrap(),
        );
        assert_eq!(json["res"], 0);
        assert_eq!(json["account_id"], 1000);
        assert_eq!(registry.get_account(1000).unwrap().account_name, "Renamed");

        let json = body(
            configure_account(
                &registry,
                &params(&[("account_id", id.as_str()), ("param", "wildcard_san_for_new_sites"), ("value", "true")]),
            )
            .unwrap(),
        );
        assert_eq!(json["res"], 0);

        let json = body(
            configure_account(
                &registry,
                &params(&[("account_id", id.as_str()), ("param", "bogus"), ("value", "x")]),
            )
            .unwrap(),
        );
        assert_eq!(json["res"], 6001);

        let json = body(
            configure_account(
                &registry,
                &params(&[("account_id", "9999"), ("param", "email"), ("value", "x")]),
            )
            .unwrap(),
        );
        assert_eq!(json["res"], 9413);
    }

    #[test]
    fn test_delete_account_twice() {
        let registry = RegistryHandle::default();
        let id = registry.add_account(NewAccount::default()).account_id.to_string();

        let first = body(delete_account(&registry, &params(&[("account_id", id.as_str())])).unwrap());
        let second = body(delete_account(&registry, &params(&[("account_id", id.as_str())])).unwrap());
        assert_eq!(first["res"], 0);
        assert_eq!(second["res"], 9413);
    }

    #[test]
    fn test_data_privacy() {
        expect![[r#"{"res":0,"res_message":"OK","region":"US"}"#]]
            .assert_eq(&show_data_privacy().unwrap().body_string().unwrap());
        expect![[r#"{"res":0,"res_message":"OK"}"#]]
            .assert_eq(&set_data_privacy_region_default().unwrap().body_string().unwrap());
    }
}
