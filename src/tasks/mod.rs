//! Background Tasks Module
//!
//! Contains background tasks that run periodically during proxy operation.
//!
//! # Tasks
//! - Expiration sweep: evicts expired cache entries at configured intervals

mod sweeper;

pub use sweeper::spawn_sweep_task;
