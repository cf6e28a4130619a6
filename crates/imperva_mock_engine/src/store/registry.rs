/* 📖 # Why one registry behind one lock?

Accounts, sites and CSP domains live in a single Registry value wrapped in one
RwLock. Every simulated API call is a single read or write critical section on it, so
concurrent test clients observe each call atomically and there is no lock ordering to
get wrong. Throughput is irrelevant for a test double; simplicity is not.

The registry is owned by one server instance. Two mock servers in the same process
never share state.
*/

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{
    Account, AuthorizationStatus, CspDomain, NewAccount, NewSite, Note, SettingOutcome, Site,
};
use crate::store::ids::IdGenerator;

/// Why a `configure` call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureError {
    /// No record with the given ID.
    NotFound,
    /// Parameter name outside the allow-list.
    InvalidParameter,
}

/// All simulated state of one mock server.
#[derive(Debug, Default)]
pub struct Registry {
    accounts: HashMap<i64, Account>,
    sites: HashMap<i64, Site>,
    /// site ID -> domain name -> record
    csp_domains: HashMap<i64, HashMap<String, CspDomain>>,
    ids: IdGenerator,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&mut self, fields: NewAccount) -> Account {
        let account = Account::new(self.ids.next_account_id(), fields);
        self.accounts.insert(account.account_id, account.clone());
        account
    }

    pub fn get_account(&self, account_id: i64) -> Option<Account> {
        self.accounts.get(&account_id).cloned()
    }

    pub fn configure_account(
        &mut self,
        account_id: i64,
        param: &str,
        value: &str,
    ) -> Result<SettingOutcome, ConfigureError> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(ConfigureError::NotFound)?;
        match account.apply_setting(param, value) {
            SettingOutcome::Unknown => Err(ConfigureError::InvalidParameter),
            outcome => Ok(outcome),
        }
    }

    pub fn delete_account(&mut self, account_id: i64) -> Option<Account> {
        self.accounts.remove(&account_id)
    }

    pub fn add_site(&mut self, fields: NewSite) -> Site {
        let site = Site::new(self.ids.next_site_id(), fields);
        self.sites.insert(site.site_id, site.clone());
        site
    }

    pub fn get_site(&self, site_id: i64) -> Option<Site> {
        self.sites.get(&site_id).cloned()
    }

    pub fn configure_site(
        &mut self,
        site_id: i64,
        param: &str,
        value: &str,
    ) -> Result<SettingOutcome, ConfigureError> {
        let site = self.sites.get_mut(&site_id).ok_or(ConfigureError::NotFound)?;
        match site.apply_setting(param, value) {
            SettingOutcome::Unknown => Err(ConfigureError::InvalidParameter),
            outcome => Ok(outcome),
        }
    }

    pub fn delete_site(&mut self, site_id: i64) -> Option<Site> {
        self.sites.remove(&site_id)
    }

    /// All pre-approved domains of a site, sorted by domain name.
    pub fn list_csp_domains(&self, site_id: i64) -> Vec<CspDomain> {
        let mut domains: Vec<CspDomain> = self
            .csp_domains
            .get(&site_id)
            .map(|domains| domains.values().cloned().collect())
            .unwrap_or_default();
        domains.sort_by(|a, b| a.domain.cmp(&b.domain));
        domains
    }

    pub fn get_csp_domain(&self, site_id: i64, domain: &str) -> Option<CspDomain> {
        self.csp_domains.get(&site_id)?.get(domain).cloned()
    }

    /// Store a domain record, replacing any record with the same name.
    pub fn put_csp_domain(&mut self, site_id: i64, record: CspDomain) -> CspDomain {
        self.csp_domains
            .entry(site_id)
            .or_default()
            .insert(record.domain.clone(), record.clone());
        record
    }

    pub fn delete_csp_domain(&mut self, site_id: i64, domain: &str) -> Option<CspDomain> {
        self.csp_domains.get_mut(&site_id)?.remove(domain)
    }

    /// Status of a known domain; a domain without a status yields the empty status.
    pub fn csp_status(&self, site_id: i64, domain: &str) -> Option<AuthorizationStatus> {
        self.csp_domains
            .get(&site_id)?
            .get(domain)
            .map(|record| record.status.clone().unwrap_or_default())
    }

    /// Merge-patch the status, creating the domain record on first write.
    pub fn update_csp_status(
        &mut self,
        site_id: i64,
        domain: &str,
        patch: AuthorizationStatus,
    ) -> AuthorizationStatus {
        let record = self
            .csp_domains
            .entry(site_id)
            .or_default()
            .entry(domain.to_string())
            .or_insert_with(|| CspDomain::new(domain, false, false));
        let status = record.status.get_or_insert_with(AuthorizationStatus::default);
        status.merge(patch);
        status.clone()
    }

    /// Notes of a domain; empty when the site or domain is unknown.
    pub fn csp_notes(&self, site_id: i64, domain: &str) -> Vec<Note> {
        self.csp_domains
            .get(&site_id)
            .and_then(|domains| domains.get(domain))
            .map(|record| record.notes.clone())
            .unwrap_or_default()
    }

    /// Append a note; returns the full list, or `None` when the domain is unknown.
    pub fn add_csp_note(&mut self, site_id: i64, domain: &str, note: Note) -> Option<Vec<Note>> {
        let record = self.csp_domains.get_mut(&site_id)?.get_mut(domain)?;
        record.notes.push(note);
        Some(record.notes.clone())
    }

    /// Drop all notes of a domain. Unknown domains are left alone.
    pub fn clear_csp_notes(&mut self, site_id: i64, domain: &str) {
        if let Some(record) = self
            .csp_domains
            .get_mut(&site_id)
            .and_then(|domains| domains.get_mut(domain))
        {
            record.notes.clear();
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Empty every store and restart the ID counters.
    pub fn reset(&mut self) {
        self.accounts.clear();
        self.sites.clear();
        self.csp_domains.clear();
        self.ids.reset();
    }
}

/// A thread-safe handle to a [`Registry`].
///
/// Cloning is cheap (Arc). Each method takes the lock exactly once, so every method
/// call is one atomic operation on the simulated state.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle(Arc<RwLock<Registry>>);

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }

    pub fn add_account(&self, fields: NewAccount) -> Account {
        self.0.write().add_account(fields)
    }

    pub fn get_account(&self, account_id: i64) -> Option<Account> {
        self.0.read().get_account(account_id)
    }

    pub fn configure_account(
        &self,
        account_id: i64,
        param: &str,
        value: &str,
    ) -> Result<SettingOutcome, ConfigureError> {
        self.0.write().configure_account(account_id, param, value)
    }

    pub fn delete_account(&self, account_id: i64) -> Option<Account> {
        self.0.write().delete_account(account_id)
    }

    pub fn add_site(&self, fields: NewSite) -> Site {
        self.0.write().add_site(fields)
    }

    pub fn get_site(&self, site_id: i64) -> Option<Site> {
        self.0.read().get_site(site_id)
    }

    pub fn configure_site(
        &self,
        site_id: i64,
        param: &str,
        value: &str,
    ) -> Result<SettingOutcome, ConfigureError> {
        self.0.write().configure_site(site_id, param, value)
    }

    pub fn delete_site(&self, site_id: i64) -> Option<Site> {
        self.0.write().delete_site(site_id)
    }

    pub fn list_csp_domains(&self, site_id: i64) -> Vec<CspDomain> {
        self.0.read().list_csp_domains(site_id)
    }

    pub fn get_csp_domain(&self, site_id: i64, domain: &str) -> Option<CspDomain> {
        self.0.read().get_csp_domain(site_id, domain)
    }

    pub fn put_csp_domain(&self, site_id: i64, record: CspDomain) -> CspDomain {
        self.0.write().put_csp_domain(site_id, record)
    }

    pub fn delete_csp_domain(&self, site_id: i64, domain: &str) -> Option<CspDomain> {
        self.0.write().delete_csp_domain(site_id, domain)
    }

    pub fn csp_status(&self, site_id: i64, domain: &str) -> Option<AuthorizationStatus> {
        self.0.read().csp_status(site_id, domain)
    }

    pub fn update_csp_status(
        &self,
        site_id: i64,
        domain: &str,
        patch: AuthorizationStatus,
    ) -> AuthorizationStatus {
        self.0.write().update_csp_status(site_id, domain, patch)
    }

    pub fn csp_notes(&self, site_id: i64, domain: &str) -> Vec<Note> {
        self.0.read().csp_notes(site_id, domain)
    }

    pub fn add_csp_note(&self, site_id: i64, domain: &str, note: Note) -> Option<Vec<Note>> {
        self.0.write().add_csp_note(site_id, domain, note)
    }

    pub fn clear_csp_notes(&self, site_id: i64, domain: &str) {
        self.0.write().clear_csp_notes(site_id, domain)
    }

    pub fn account_count(&self) -> usize {
        self.0.read().account_count()
    }

    pub fn site_count(&self) -> usize {
        self.0.read().site_count()
    }

    pub fn reset(&self) {
        self.0.write().reset()
    }
}
