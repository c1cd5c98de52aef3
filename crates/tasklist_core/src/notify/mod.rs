//! Reminder notifications.
//!
//! Thin capability layer over the host notification API; see `sink`.

pub mod sink;
