//! Action log bookkeeping.
//!
//! This module provides:
//! - [`LogEntry`] and [`ActionLog`], the per-item log
//! - [`RecordStore`] backends (in-memory and JSON files)
//! - [`RecordManager`], the handle pipeline steps write through

mod entry;
mod manager;
mod store;

pub use entry::{ActionLog, LogEntry};
pub use manager::RecordManager;
pub use store::{InMemoryRecordStore, JsonFileRecordStore, RecordStore};
