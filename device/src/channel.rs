use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Node {0} is not connected")]
    Disconnected(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4().as_simple().to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub source: NodeId,
    pub path: String,
    pub payload: Vec<u8>,
}

// The platform's message layer, as seen from one device
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn connected_nodes(&self) -> Result<Vec<NodeId>, SendError>;

    async fn send_message(&self, node: &NodeId, path: &str, payload: &[u8])
        -> Result<(), SendError>;
}
