/* 📖 # Why one module for all simulated entities?

Accounts, sites and CSP domains are plain records; their only behaviour is field-level
updates and a few derived values. Keeping them together makes the JSON shapes of the
simulated API easy to review in one place. The classic endpoints use snake_case field
names, the newer CSP endpoints camelCase, exactly like the vendor.
*/

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::domain_ref::encode_domain_ref;

/// A login belonging to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub login_id: i64,
    pub email: String,
    pub email_verified: bool,
}

/// A simulated vendor account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub email: String,
    /// 0 when the account has no parent.
    pub parent_id: i64,
    pub account_name: String,
    pub plan_id: String,
    pub ref_id: String,
    pub user_name: String,
    pub trial_end_date: String,
    pub logins: Vec<Login>,
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub account_name: String,
    pub parent_id: i64,
    pub plan_id: String,
    pub ref_id: String,
    pub user_name: String,
}

/// Outcome of applying a `param`/`value` pair to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingOutcome {
    /// The value was stored on the record.
    Stored,
    /// The parameter is known to the vendor but the simulation does not keep it.
    Ignored,
    /// The parameter is not in the allow-list.
    Unknown,
}

/// Account settings the vendor accepts but the simulation does not persist.
const ACCOUNT_IGNORED_SETTINGS: &[&str] = &[
    "error_page_template",
    "support_all_tls_versions",
    "naked_domain_san_for_new_www_sites",
    "wildcard_san_for_new_sites",
    "data_storage_region",
];

impl Account {
    /// Build an account with a single login synthesized from the email.
    pub fn new(account_id: i64, fields: NewAccount) -> Self {
        let login = Login {
            login_id: account_id,
            email: fields.email.clone(),
            email_verified: false,
        };
        Self {
            account_id,
            email: fields.email,
            parent_id: fields.parent_id,
            account_name: fields.account_name,
            plan_id: fields.plan_id,
            ref_id: fields.ref_id,
            user_name: fields.user_name,
            trial_end_date: String::new(),
            logins: vec![login],
        }
    }

    /// The fixed account answered to credential checks without an `account_id`.
    pub fn verification_account() -> Self {
        let mut account = Self::new(
            1000,
            NewAccount {
                email: "test@example.com".to_string(),
                account_name: "Test Account".to_string(),
                plan_id: "Enterprise".to_string(),
                ..NewAccount::default()
            },
        );
        account.logins[0].email_verified = true;
        account
    }

    /// Apply one `accounts/configure` parameter.
    pub fn apply_setting(&mut self, param: &str, value: &str) -> SettingOutcome {
        let field = match param {
            "account_name" | "name" => &mut self.account_name,
            "email" => &mut self.email,
            "ref_id" => &mut self.ref_id,
            "plan_id" => &mut self.plan_id,
            "user_name" => &mut self.user_name,
            _ if ACCOUNT_IGNORED_SETTINGS.contains(&param) => return SettingOutcome::Ignored,
            _ => return SettingOutcome::Unknown,
        };
        *field = value.to_string();
        SettingOutcome::Stored
    }
}

/// Status every new site starts in.
pub const SITE_STATUS_PENDING: &str = "pending";

/// A simulated onboarded site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: i64,
    /// Owning account; informational only, never checked against the accounts.
    pub account_id: i64,
    pub domain: String,
    pub status: String,
    pub site_type: String,
    pub ref_id: String,
}

/// Fields accepted when creating a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSite {
    pub domain: String,
    pub account_id: i64,
    pub site_type: String,
    pub ref_id: String,
}

/// A DNS instruction as returned by `sites/add` and `sites/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub dns_record_name: String,
    pub set_type_to: String,
    pub set_data_to: Vec<String>,
}

impl Site {
    pub fn new(site_id: i64, fields: NewSite) -> Self {
        Self {
            site_id,
            account_id: fields.account_id,
            domain: fields.domain,
            status: SITE_STATUS_PENDING.to_string(),
            site_type: fields.site_type,
            ref_id: fields.ref_id,
        }
    }

    /// A record address derived from the site ID.
    pub fn a_record(&self) -> String {
        let hi = (self.site_id / 256) % 256;
        let lo = self.site_id % 256;
        format!("1.2.{}.{}", hi, lo)
    }

    /// CNAME target derived from the site ID.
    pub fn cname(&self) -> String {
        format!("{}.x.incapdns.net", self.site_id)
    }

    /// The two DNS instructions for the site, A record first.
    pub fn dns_records(&self) -> Vec<DnsRecord> {
        vec![
            DnsRecord {
                dns_record_name: self.domain.clone(),
                set_type_to: "A".to_string(),
                set_data_to: vec![self.a_record()],
            },
            DnsRecord {
                dns_record_name: self.domain.clone(),
                set_type_to: "CNAME".to_string(),
                set_data_to: vec![self.cname()],
            },
        ]
    }

    /// Apply one `sites/configure` parameter.
    pub fn apply_setting(&mut self, param: &str, value: &str) -> SettingOutcome {
        let field = match param {
            "domain" => &mut self.domain,
            "ref_id" => &mut self.ref_id,
            "site_type" => &mut self.site_type,
            _ => return SettingOutcome::Unknown,
        };
        *field = value.to_string();
        SettingOutcome::Stored
    }
}

/// Author stamped on notes added through the API.
pub const NOTE_AUTHOR: &str = "mock-user@example.com";

/// A free-text note on a CSP domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub author: String,
    /// Unix seconds.
    pub date: i64,
}

impl Note {
    /// A note by the synthetic API user, stamped now.
    pub fn from_api(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: NOTE_AUTHOR.to_string(),
            date: unix_now(),
        }
    }
}

/* 📖 # Why Option<bool> for blocked and reviewed?
Status updates are merge patches: a PUT that only carries `reviewed` must not reset
`blocked`. A plain bool cannot tell "not sent" from "sent false", so both flags are
three-state. `forceChange` has no absent state on the wire and is always overwritten.
*/

/// Authorization status of a CSP domain. Only fields that were set are emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_date: Option<i64>,
    #[serde(default)]
    pub force_change: bool,
}

impl AuthorizationStatus {
    /// Merge `patch` into `self`: present fields overwrite, absent fields are kept,
    /// `force_change` is always taken from the patch.
    pub fn merge(&mut self, patch: AuthorizationStatus) {
        fn overwrite<T>(target: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *target = incoming;
            }
        }
        overwrite(&mut self.blocked, patch.blocked);
        overwrite(&mut self.reviewed, patch.reviewed);
        overwrite(&mut self.note, patch.note);
        overwrite(&mut self.author, patch.author);
        overwrite(&mut self.review_date, patch.review_date);
        overwrite(&mut self.note_date, patch.note_date);
        self.force_change = patch.force_change;
    }
}

/// A domain on a site's CSP pre-approved list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CspDomain {
    pub domain: String,
    pub subdomains: bool,
    /// base64url (no padding) of `domain`.
    pub domain_reference: String,
    pub apply_to_all_onboarded_paths: bool,
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AuthorizationStatus>,
}

impl CspDomain {
    /// A fresh record with no notes and no status.
    pub fn new(domain: impl Into<String>, subdomains: bool, apply_to_all_onboarded_paths: bool) -> Self {
        let domain = domain.into();
        Self {
            domain_reference: encode_domain_ref(&domain),
            domain,
            subdomains,
            apply_to_all_onboarded_paths,
            notes: Vec::new(),
            status: None,
        }
    }
}

/// Body of `POST .../preapprovedlist`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCspDomain {
    pub domain: String,
    #[serde(default)]
    pub subdomains: bool,
    #[serde(default)]
    pub apply_to_all_onboarded_paths: bool,
}

/// Current time in unix seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
