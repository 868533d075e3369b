pub mod auth;
pub mod extract;
pub mod policy;
pub mod response;

pub use extract::{ApiJson, ApiPath};
pub use policy::{enforce_access, Access, API_PREFIX, ROUTE_POLICIES};
pub use response::{ApiResponse, ApiResult};
