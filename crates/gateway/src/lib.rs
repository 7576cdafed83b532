//! HTTP gateway: the inbound-message webhook, conversation recording,
//! and the admin read side.
//!
//! Lifecycle:
//! 1. Load config (done by the caller)
//! 2. Open SQLite, wire the provider and recorder
//! 3. Serve the router until ctrl-c
//!
//! The reply pipeline itself (boundary search, segment numbering,
//! pacing, TwiML) lives in `remora-reply` and `remora-twiml`; this crate
//! glues HTTP to it.

pub mod admin;
pub mod recorder;
pub mod server;
pub mod state;
pub mod webhook;

pub use {
    recorder::Recorder,
    server::{build_app, build_state, serve},
    state::{AppState, ReplySettings},
};
