// src/serve/reload.rs

use tokio::sync::broadcast;
use tracing::debug;

use crate::config::model::ReloadKind;

/// Signal broadcast to connected clients after a successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadSignal {
    /// In-place refresh of styles/scripts.
    Partial,
    /// Full page reload, used for markup changes.
    Full,
}

/// Fan-out point between the watch controller and the dev server.
///
/// Cloning is cheap; every watch binding holds one, and every WebSocket
/// connection subscribes. Signals sent while no client is connected are
/// simply dropped.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadSignal>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    /// In-place refresh after a style/script task completed.
    pub fn notify_reload(&self) {
        let receivers = self.tx.send(ReloadSignal::Partial).unwrap_or(0);
        debug!(receivers, "broadcast partial reload");
    }

    /// Full page reload after a markup change.
    pub fn notify_full_reload(&self) {
        let receivers = self.tx.send(ReloadSignal::Full).unwrap_or(0);
        debug!(receivers, "broadcast full reload");
    }

    /// Dispatch on a binding's configured reload kind.
    pub fn notify(&self, kind: ReloadKind) {
        match kind {
            ReloadKind::None => {}
            ReloadKind::Partial => self.notify_reload(),
            ReloadKind::Full => self.notify_full_reload(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.tx.subscribe()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}
