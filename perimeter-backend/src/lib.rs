mod backend;
mod compute;
mod error;
mod memory;
mod rule;

pub use backend::RuleBackend;
pub use compute::{ComputeBackend, ComputeConfig};
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use rule::{FirewallAllowed, FirewallRule};
