//! Broadcast presenter.
//!
//! Fans session views out to every WebSocket subscriber. Having no
//! subscribers is not an error: the view is simply dropped.

use async_trait::async_trait;
use tokio::sync::broadcast;

use castline_domain::SessionView;

use crate::infrastructure::ports::{PresentationError, PresentationPort};

/// Buffer size for the view channel; slow subscribers skip ahead.
const VIEW_CHANNEL_BUFFER: usize = 256;

pub struct BroadcastPresenter {
    sender: broadcast::Sender<SessionView>,
}

impl BroadcastPresenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(VIEW_CHANNEL_BUFFER);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionView> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationPort for BroadcastPresenter {
    async fn render(&self, view: &SessionView) -> Result<(), PresentationError> {
        let delivered = self.sender.send(view.clone()).unwrap_or(0);
        tracing::trace!(
            player_id = %view.player_id,
            realm_id = %view.realm_id,
            stage = %view.stage,
            subscribers = delivered,
            "Session view published"
        );
        Ok(())
    }
}
