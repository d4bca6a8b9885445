// ghx-common: Shared infrastructure for the ghx workflow executor.
// Depends on `ghx-sdk`; holds the result model, configuration, directory
// layout and environment access used by `ghx-worker`.

pub mod conclusion;
pub mod config_store;
pub mod constants;
pub mod host_context;
pub mod logging;
pub mod process_env;
pub mod util;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use conclusion::{Conclusion, ParseConclusionError};
pub use config_store::GhxSettings;
pub use constants::{LogFormat, WellKnownDirectory};
pub use host_context::HostContext;
pub use process_env::{MemoryEnv, ProcessEnv, SystemEnv};
pub use util::var_util::VarUtil;
