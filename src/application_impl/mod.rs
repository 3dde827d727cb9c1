mod auth_service_impl;
mod claims_codec;
mod password;
mod token_issuer;

pub use auth_service_impl::*;
pub use claims_codec::*;
pub use password::*;
pub use token_issuer::*;
