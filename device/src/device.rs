use crate::channel::{MessageChannel, SendError};
use crate::config::DeviceConfig;
use common::messages::{GameEndStatus, GameSnapshot, PeerMessage, MOVE_PATH, STATUS_PATH};
use common::{GameState, RawMove, Transition};
use futures::future::join_all;
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
#[error("Device loop has shut down")]
pub struct DeviceGone;

#[derive(Debug)]
pub enum Command {
    Tap { row: i32, col: i32 },
    Reset,
    Remote(PeerMessage),
    PeerStatus(String),
    Snapshot(oneshot::Sender<GameSnapshot>),
}

// Cheap to clone; the device loop stops once every handle is dropped
#[derive(Debug, Clone)]
pub struct DeviceHandle(pub(crate) mpsc::UnboundedSender<Command>);

impl DeviceHandle {
    pub fn tap(&self, row: i32, col: i32) -> Result<(), DeviceGone> {
        self.send(Command::Tap { row, col })
    }

    pub fn reset(&self) -> Result<(), DeviceGone> {
        self.send(Command::Reset)
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, DeviceGone> {
        let (reply, snapshot) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        snapshot.await.map_err(|_| DeviceGone)
    }

    pub(crate) fn downgrade(&self) -> mpsc::WeakUnboundedSender<Command> {
        self.0.downgrade()
    }

    fn send(&self, command: Command) -> Result<(), DeviceGone> {
        self.0.send(command).map_err(|_| DeviceGone)
    }
}

/// One device's game plus its outbound link to the peer.
///
/// All game mutations happen in [`Device::handle`], which the device loop
/// calls for one command at a time. Records for the peer are queued on an
/// outbox and delivered in order by a forwarding task, so a slow or failing
/// channel cannot hold up the local game.
///
/// Must be created inside a tokio runtime.
pub struct Device {
    config: DeviceConfig,
    game: GameState,
    outbox: mpsc::UnboundedSender<Outgoing>,
    peer_status: Option<String>,
}

#[derive(Debug)]
struct Outgoing {
    path: &'static str,
    payload: Vec<u8>,
}

impl Device {
    pub fn new(config: DeviceConfig, channel: Arc<dyn MessageChannel>) -> Self {
        let game = GameState::new(config.mode);
        let (outbox, outgoing) = mpsc::unbounded_channel();
        tokio::spawn(forward(channel, outgoing));
        Device {
            config,
            game,
            outbox,
            peer_status: None,
        }
    }

    pub fn spawn(self) -> (DeviceHandle, JoinHandle<()>) {
        let (sender, commands) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(commands));
        (DeviceHandle(sender), task)
    }

    async fn run(mut self, commands: mpsc::UnboundedReceiver<Command>) {
        let mut commands = UnboundedReceiverStream::new(commands);
        info!("{} device started", self.config.role);
        while let Some(command) = commands.next().await {
            self.handle(command);
        }
        info!("{} device stopped", self.config.role);
    }

    #[tracing::instrument(skip(self), fields(role = %self.config.role))]
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Tap { row, col } => self.local_move(row, col),
            Command::Reset => self.local_reset(),
            Command::Remote(message) => self.remote_message(message),
            Command::PeerStatus(text) => {
                info!("peer reported: {}", text);
                self.peer_status = Some(text);
            }
            Command::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("snapshot requester went away");
                }
            }
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(&self.game, self.peer_status.clone())
    }

    fn local_move(&mut self, row: i32, col: i32) {
        let Some(mover) = self.game.local_mover() else {
            debug!("tap at ({}, {}) after the game ended", row, col);
            return;
        };
        let Some(transition) = self.game.submit_move(row, col, mover) else {
            return;
        };
        info!("{} played ({}, {})", mover, row, col);
        if self.config.is_paired() {
            let message = PeerMessage::Move(RawMove::new(row, col, mover));
            self.publish(MOVE_PATH, message.encode());
        }
        self.after_move(transition);
    }

    fn local_reset(&mut self) {
        self.game.reset();
        info!("game reset");
        if self.config.is_paired() && self.config.broadcast_reset {
            self.publish(MOVE_PATH, PeerMessage::Reset.encode());
        }
    }

    fn remote_message(&mut self, message: PeerMessage) {
        match message {
            PeerMessage::Move(RawMove { row, col, mover }) => {
                if let Some(transition) = self.game.receive_remote_move(row, col, mover) {
                    info!("peer played {} at ({}, {})", mover, row, col);
                    self.after_move(transition);
                }
            }
            // Not echoed back, the peer has already reset
            PeerMessage::Reset => {
                info!("peer reset the game");
                self.game.reset();
            }
            PeerMessage::GameOver(winner) => {
                debug!("peer says its game ended, winner {:?}", winner);
            }
        }
    }

    fn after_move(&mut self, transition: Transition) {
        let Transition::Finished(outcome) = transition else {
            return;
        };
        info!("game over: {}", self.game.status_text());
        if !(self.config.is_paired() && self.config.announce_outcome) {
            return;
        }
        if let Some(status) = GameEndStatus::from_outcome(outcome) {
            self.publish(STATUS_PATH, status.encode());
        }
    }

    fn publish(&self, path: &'static str, payload: Vec<u8>) {
        if self.outbox.send(Outgoing { path, payload }).is_err() {
            warn!("outbox closed, dropping record for {}", path);
        }
    }
}

// Drains the outbox one record at a time so the peer sees them in order;
// ends when the device is dropped
async fn forward(channel: Arc<dyn MessageChannel>, outgoing: mpsc::UnboundedReceiver<Outgoing>) {
    let mut outgoing = UnboundedReceiverStream::new(outgoing);
    while let Some(Outgoing { path, payload }) = outgoing.next().await {
        match deliver(channel.as_ref(), path, &payload).await {
            Ok(0) => debug!("no peer connected for {}", path),
            Ok(sent) => debug!("sent {} to {} node(s)", path, sent),
            Err(err) => warn!("error sending {} to peer: {}", path, err),
        }
    }
}

// Sends to every connected node and returns how many accepted the message
async fn deliver(
    channel: &dyn MessageChannel,
    path: &str,
    payload: &[u8],
) -> Result<usize, SendError> {
    let nodes = channel.connected_nodes().await?;
    let results = join_all(
        nodes
            .iter()
            .map(|node| channel.send_message(node, path, payload)),
    )
    .await;

    let mut sent = 0;
    for (node, result) in nodes.iter().zip(results) {
        match result {
            Ok(()) => sent += 1,
            Err(err) => warn!("error sending {} to {}: {}", path, node, err),
        }
    }
    Ok(sent)
}
