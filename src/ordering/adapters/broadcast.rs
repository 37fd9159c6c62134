//! In-process fan-out of ordering changes over a Tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::ordering::{
    domain::OrderedView,
    ports::{ChangeNotifier, NotifierResult},
};

/// Publishes every view to all current subscribers.
///
/// Subscribers that fall more than `capacity` views behind observe a lag
/// error on their receiver and skip ahead. Publishing with no subscribers
/// succeeds and drops the view.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<OrderedView>,
}

impl BroadcastNotifier {
    /// Creates a notifier buffering up to `capacity` views per subscriber.
    ///
    /// A `capacity` of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new subscriber that receives views published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderedView> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl ChangeNotifier for BroadcastNotifier {
    async fn publish(&self, view: &OrderedView) -> NotifierResult<()> {
        // `send` only fails when nobody is subscribed.
        let delivered = self.sender.send(view.clone()).unwrap_or(0);
        tracing::trace!(delivered, "broadcast ordering change");
        Ok(())
    }
}
