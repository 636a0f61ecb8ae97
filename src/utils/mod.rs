pub mod artifacts;
pub mod logging;
pub mod wait;

pub use artifacts::ArtifactStore;
pub use wait::{wait_for, wait_until, WaitConfig};
