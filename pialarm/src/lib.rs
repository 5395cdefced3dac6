//! PiAlarm alarm clock daemon.
//!
//! The scheduling core lives in [`alarm`]: a pure trigger evaluator, the
//! alarm session state machine, and the command router that serializes
//! input from the ticker, physical buttons, and the web API. Everything
//! else is a collaborator behind a narrow interface: the [`store`] holds
//! alarm definitions, the [`audio`] sink consumes start/stop intents, the
//! [`display`] renders session snapshots, and [`api`] exposes the HTTP
//! surface.

pub mod alarm;
pub mod api;
pub mod api_client;
pub mod audio;
pub mod buttons;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod store;
pub mod ticker;
pub mod tracing;
