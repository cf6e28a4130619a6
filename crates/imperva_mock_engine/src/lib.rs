/* 📖 # What is imperva_mock_engine?

An in-memory simulation of the Imperva REST API for use as a test double. It keeps
accounts, sites and CSP pre-approved domains in a registry, serves the classic
form-encoded endpoints and the CSP JSON endpoints over HTTP, and lets tests inspect
and reset the simulated state directly through [`MockImpervaServer`].
*/

pub mod api;
pub mod config;
pub mod domain_ref;
pub mod envelope;
mod mock_server;
pub mod model;
pub mod store;

pub use api::ApiService;
pub use config::{ServerConfig, load_config};
pub use domain_ref::{DomainRefError, decode_domain_ref, encode_domain_ref};
pub use envelope::{CspError, LegacyEnvelope, ResCode};
pub use mock_server::MockImpervaServer;
pub use model::{Account, AuthorizationStatus, CspDomain, DnsRecord, Login, Note, Site};
pub use store::{Registry, RegistryHandle};
