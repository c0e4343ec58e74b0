// src/serve/mod.rs

//! Dev server: static files plus a change-notification channel.
//!
//! The browser side of live reloading is an external collaborator; this
//! module only serves the built site and broadcasts reload signals over a
//! WebSocket endpoint.

pub mod reload;
pub mod server;

pub use reload::{ReloadHub, ReloadSignal};
pub use server::serve;
