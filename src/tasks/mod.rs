//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at a fixed interval

mod cleanup;

pub use cleanup::{CleanupTask, DEFAULT_CLEANUP_INTERVAL};
