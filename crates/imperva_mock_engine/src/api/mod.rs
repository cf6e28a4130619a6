/* 📖 # Why an api module?

The api module is the simulated vendor REST surface. `router` turns a method and path
into an operation, the handler modules implement the classic account and site
endpoints and the CSP pre-approval endpoints, and `ApiService` ties them together
behind the HttpService trait from imperva_mock_base.
*/

mod accounts;
mod csp;
pub mod router;
mod service;
mod sites;

pub use router::{CspOp, LegacyOp, Route, route};
pub use service::ApiService;
