//! Civic Store: process-lifetime complaint collection
//!
//! An encapsulated, in-memory ordered collection of complaint records.
//! No component outside this crate touches the underlying collection
//! directly, so it can later be swapped for durable storage without
//! changing callers. No durability across restarts.

pub mod stats;
pub mod store;

pub use stats::ComplaintStatistics;
pub use store::{ComplaintStore, ListQuery, StoreError};
