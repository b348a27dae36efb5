// ABOUTME: Review synchronization engine: state machine, lease map, scheduler
// ABOUTME: SyncService runs one connection's sync; SyncScheduler batches them on a timer
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync orchestration.
//!
//! [`SyncService`] drives one connection through the sync state machine;
//! [`SyncScheduler`] loads active connections on a fixed period and runs them
//! in concurrent batches through the same service.

pub mod lease;
pub mod scheduler;
pub mod service;

pub use lease::{SyncLeaseGuard, SyncLeases};
pub use scheduler::{SchedulerStatus, SyncRunReport, SyncScheduler};
pub use service::SyncService;
