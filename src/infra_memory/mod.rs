mod credential_verifier_memory;
mod refresh_session_store_memory;

pub use credential_verifier_memory::*;
pub use refresh_session_store_memory::*;
