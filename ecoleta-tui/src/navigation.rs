use ecoleta_core::{model::Destination, ports::Navigator};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// Navigator that queues destinations for the event loop to handle.
pub(crate) struct ChannelNavigator {
    destinations: UnboundedSender<Destination>,
}

impl ChannelNavigator {
    pub(crate) fn new() -> (Self, UnboundedReceiver<Destination>) {
        let (destinations, receiver) = mpsc::unbounded_channel();
        (Self { destinations }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, destination: Destination) {
        if self.destinations.send(destination).is_err() {
            warn!(?destination, "navigation requested after the event loop stopped");
        }
    }
}
