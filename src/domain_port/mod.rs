mod clock;
pub use clock::*;

// stores

mod refresh_session_store;

pub use refresh_session_store::*;

// collaborators

mod credential_verifier;

pub use credential_verifier::*;
