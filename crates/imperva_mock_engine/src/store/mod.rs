mod ids;
mod registry;

pub use ids::{ACCOUNT_ID_START, IdGenerator, SITE_ID_START};
pub use registry::{ConfigureError, Registry, RegistryHandle};
