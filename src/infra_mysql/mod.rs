mod credential_verifier_mysql;
mod refresh_session_store_mysql;

pub use credential_verifier_mysql::*;
pub use refresh_session_store_mysql::*;

mod util;
