//! HTTP API for the alarm clock.
//!
//! The web layer is a command producer and a store client; it never
//! touches session state directly. Snooze/dismiss handlers submit
//! commands through the router, alarm CRUD goes straight to the store,
//! and status reads the session's snapshot watch channel.

pub mod server;
pub mod v0;

pub use server::{serve, SharedState};
