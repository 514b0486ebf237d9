use crate::error::TransportError;
use crate::media::LocalMedia;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use meshcall_core::{CandidateInit, PeerName, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Opaque connection-transport capability for one remote peer. ICE/SDP
/// mechanics live entirely behind this trait; the negotiator only knows
/// how to ask for descriptions and feed candidates.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Create an offer and commit it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    /// Create an answer and commit it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn apply_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), TransportError>;

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Builds a connected transport for a peer: local tracks attached exactly
/// once, candidate/track callbacks wired onto `events` before the transport
/// is handed out.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(
        &self,
        peer: PeerName,
        media: &LocalMedia,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn MediaTransport>, TransportError>;
}
