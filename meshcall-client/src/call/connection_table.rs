use crate::call::{NegotiationState, PeerNegotiator};
use crate::error::TransportError;
use crate::media::LocalMedia;
use crate::transport::{TransportEvent, TransportFactory};
use meshcall_core::PeerName;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Peer name → live negotiator. Single source of truth for which peers the
/// call is talking to: at most one negotiator per peer, entries removed only
/// on that peer's departure or local leave.
#[derive(Default)]
pub struct ConnectionTable {
    entries: HashMap<PeerName, PeerNegotiator>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the negotiator for `peer`, building one first if absent: the
    /// factory creates the transport with the local tracks attached and its
    /// events wired to `events`. Idempotent; the table is only touched from
    /// the single call task, so lookup and insert cannot interleave.
    pub async fn get_or_create(
        &mut self,
        peer: &PeerName,
        media: &LocalMedia,
        factory: &dyn TransportFactory,
        events: &mpsc::Sender<TransportEvent>,
    ) -> Result<&mut PeerNegotiator, TransportError> {
        if !self.entries.contains_key(peer) {
            info!("creating negotiator for {peer}");
            let transport = factory
                .connect(peer.clone(), media, events.clone())
                .await?;
            self.entries
                .insert(peer.clone(), PeerNegotiator::new(peer.clone(), transport));
        } else {
            debug!("negotiator for {peer} already exists");
        }

        Ok(self
            .entries
            .get_mut(peer)
            .expect("entry inserted or present above"))
    }

    pub fn get(&self, peer: &PeerName) -> Option<&PeerNegotiator> {
        self.entries.get(peer)
    }

    pub fn get_mut(&mut self, peer: &PeerName) -> Option<&mut PeerNegotiator> {
        self.entries.get_mut(peer)
    }

    /// Close `peer`'s transport and drop the entry. Returns whether an entry
    /// existed; calling this for an unknown peer is a no-op.
    pub async fn remove_and_close(&mut self, peer: &PeerName) -> bool {
        let Some(mut negotiator) = self.entries.remove(peer) else {
            return false;
        };
        negotiator.close().await;
        true
    }

    /// Close every entry unconditionally, mid-negotiation or not.
    pub async fn remove_and_close_all(&mut self) {
        for (peer, mut negotiator) in self.entries.drain() {
            debug!("closing negotiator for {peer}");
            negotiator.close().await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, peer: &PeerName) -> bool {
        self.entries.contains_key(peer)
    }

    pub fn state_of(&self, peer: &PeerName) -> Option<NegotiationState> {
        self.entries.get(peer).map(PeerNegotiator::state)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerName> {
        self.entries.keys()
    }
}
