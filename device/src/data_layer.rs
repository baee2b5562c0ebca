//! In-process stand-in for the platform data layer: every node that joins can
//! see and message every other node.

use crate::channel::{InboundMessage, MessageChannel, NodeId, SendError};
use async_trait::async_trait;
use hashbrown::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

pub type Nodes = Arc<RwLock<HashMap<NodeId, mpsc::UnboundedSender<InboundMessage>>>>;

#[derive(Clone, Default)]
pub struct DataLayer {
    nodes: Nodes,
}

impl DataLayer {
    pub fn new() -> Self {
        DataLayer::default()
    }

    pub async fn join(&self) -> (LocalNode, mpsc::UnboundedReceiver<InboundMessage>) {
        let id = NodeId::generate();
        let (sender, inbox) = mpsc::unbounded_channel();
        self.nodes.write().await.insert(id.clone(), sender);
        info!("node {} joined the data layer", id);
        (
            LocalNode {
                id,
                nodes: self.nodes.clone(),
            },
            inbox,
        )
    }

    pub async fn leave(&self, id: &NodeId) {
        if self.nodes.write().await.remove(id).is_some() {
            info!("node {} left the data layer", id);
        }
    }
}

#[derive(Clone)]
pub struct LocalNode {
    id: NodeId,
    nodes: Nodes,
}

impl LocalNode {
    pub fn id(&self) -> &NodeId {
        &self.id
    }
}

#[async_trait]
impl MessageChannel for LocalNode {
    async fn connected_nodes(&self) -> Result<Vec<NodeId>, SendError> {
        Ok(self
            .nodes
            .read()
            .await
            .keys()
            .filter(|id| **id != self.id)
            .cloned()
            .collect())
    }

    async fn send_message(
        &self,
        node: &NodeId,
        path: &str,
        payload: &[u8],
    ) -> Result<(), SendError> {
        let nodes = self.nodes.read().await;
        let sender = nodes
            .get(node)
            .ok_or_else(|| SendError::Disconnected(node.clone()))?;
        sender
            .send(InboundMessage {
                source: self.id.clone(),
                path: path.to_string(),
                payload: payload.to_vec(),
            })
            .map_err(|_| SendError::Disconnected(node.clone()))?;
        debug!("{} -> {} on {}", self.id, node, path);
        Ok(())
    }
}
