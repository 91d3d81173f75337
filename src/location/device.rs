//! Seams to the device position API and the map renderer

use super::models::{Coordinates, MapCommand, PositionOptions};
use crate::error::DeviceError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Device geolocation
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Single current-position request
    async fn current_position(&self, options: PositionOptions) -> Result<Coordinates, DeviceError>;
}

/// Map rendering collaborator.
///
/// Commands are fire-and-observe: `apply` must not wait for a flight to
/// finish.
pub trait MapViewport: Send + Sync {
    fn apply(&self, command: MapCommand);
}

/// Forwards map commands to a rendering task over a channel
#[derive(Debug, Clone)]
pub struct ChannelViewport {
    tx: mpsc::UnboundedSender<MapCommand>,
}

impl ChannelViewport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MapCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MapViewport for ChannelViewport {
    fn apply(&self, command: MapCommand) {
        if self.tx.send(command).is_err() {
            debug!("Map renderer gone, dropping {:?}", command);
        }
    }
}

/// Viewport that ignores every command, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewport;

impl MapViewport for NoopViewport {
    fn apply(&self, _command: MapCommand) {}
}
