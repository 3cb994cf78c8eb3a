//! Command implementations

pub mod sync;

pub use sync::{run_sync, synchronize_and_notify};
