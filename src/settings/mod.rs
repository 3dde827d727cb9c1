//! Settings come from a TOML file layered under `TOKENWARD__*` environment
//! variables. Signing secrets are normally supplied through the environment.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod duration;
pub use duration::*;

mod settings;
pub use settings::*;
