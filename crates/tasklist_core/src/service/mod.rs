//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, persistence and scheduling behind one session API.
//! - Keep presentation code decoupled from storage and timer details.

pub mod task_session;
