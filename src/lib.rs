//! Workspace facade crate.
//!
//! Re-exports the workspace crates behind one dependency so host applications
//! can enable `desktop-shims` and `symphonia-probe` without wiring each crate
//! individually.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;
pub use provider_botb;

pub use provider_botb::{BotbSourceManager, ResolutionOutcome};
