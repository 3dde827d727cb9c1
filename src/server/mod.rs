mod reaper;
mod scheduler;
mod server;

pub use reaper::*;
pub use scheduler::*;
pub use server::*;
