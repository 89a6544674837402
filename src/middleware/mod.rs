pub mod auth;
pub mod response;

pub use auth::{require_role, RoleGate};
pub use response::{ApiResponse, ApiResult};
