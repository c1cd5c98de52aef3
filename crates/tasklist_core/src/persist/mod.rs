//! Best-effort persistence of the task store.
//!
//! # Responsibility
//! - Define the durable key-value slot contract and its backends.
//! - Translate store snapshots to and from the persisted JSON document.
//!
//! # Invariants
//! - The in-memory store stays authoritative; storage failures never
//!   propagate to presentation callers.

pub mod adapter;
pub mod slot;
