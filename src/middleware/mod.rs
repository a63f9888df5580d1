pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{admin_auth_middleware, bearer_token, AuthUser};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult, Deleted};
