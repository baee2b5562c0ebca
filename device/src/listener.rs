use crate::channel::InboundMessage;
use crate::device::{Command, DeviceHandle};
use common::messages::{PeerMessage, MOVE_PATH, STATUS_PATH};
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

type ActiveDevice = Option<mpsc::WeakUnboundedSender<Command>>;

/// Turns data-layer deliveries into commands for the attached device.
///
/// Runs on the delivery side, never on the device loop itself: it only
/// decodes and queues. The listener holds a weak reference, so an attached
/// device still shuts down once its last handle is dropped.
#[derive(Clone, Default)]
pub struct Listener {
    active: Arc<Mutex<ActiveDevice>>,
}

impl Listener {
    pub fn new() -> Self {
        Listener::default()
    }

    pub fn attach(&self, device: &DeviceHandle) {
        *self.slot() = Some(device.downgrade());
        debug!("listener attached");
    }

    pub fn detach(&self) {
        *self.slot() = None;
        debug!("listener detached");
    }

    #[tracing::instrument(skip(self, message), fields(source = %message.source, path = %message.path))]
    pub fn on_message_received(&self, message: InboundMessage) {
        let command = match message.path.as_str() {
            MOVE_PATH => match PeerMessage::decode(&message.payload) {
                Ok(peer_message) => Command::Remote(peer_message),
                Err(err) => {
                    warn!("Dropping malformed move record: {}", err);
                    return;
                }
            },
            STATUS_PATH => {
                Command::PeerStatus(String::from_utf8_lossy(&message.payload).into_owned())
            }
            other => {
                debug!("Ignoring message on unknown path {}", other);
                return;
            }
        };
        if !self.post(command) {
            debug!("No active device, dropping message");
        }
    }

    fn post(&self, command: Command) -> bool {
        let device = self.slot().as_ref().and_then(|weak| weak.upgrade());
        match device {
            Some(sender) => sender.send(command).is_ok(),
            None => false,
        }
    }

    fn slot(&self) -> MutexGuard<'_, ActiveDevice> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Delivery pump for one node's inbox; ends when the node leaves the data layer
pub async fn listen(inbox: mpsc::UnboundedReceiver<InboundMessage>, listener: Listener) {
    let mut inbox = UnboundedReceiverStream::new(inbox);
    while let Some(message) = inbox.next().await {
        listener.on_message_received(message);
    }
    info!("inbox closed");
}
