mod error;
mod handler;
mod method;
mod router;

pub use error::{ApiErrorCode, recover_error};
pub use method::{AuthRequirement, Method};
pub use router::routes;
