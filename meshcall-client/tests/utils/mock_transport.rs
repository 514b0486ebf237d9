use async_trait::async_trait;
use meshcall_client::{
    LocalMedia, MediaTransport, TransportError, TransportEvent, TransportFactory,
};
use meshcall_core::{CandidateInit, PeerName, SdpKind, SessionDescription};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock MediaTransport recording what the negotiator does to it. Like a
/// real transport, it rejects candidates that arrive before a remote
/// description has been applied.
pub struct MockTransport {
    pub peer: PeerName,
    fail_negotiation: AtomicBool,
    remote: Mutex<Option<SessionDescription>>,
    candidates: Mutex<Vec<CandidateInit>>,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new(peer: PeerName) -> Self {
        Self {
            peer,
            fail_negotiation: AtomicBool::new(false),
            remote: Mutex::new(None),
            candidates: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Make every offer/answer construction fail from now on.
    pub fn fail_negotiation(&self) {
        self.fail_negotiation.store(true, Ordering::SeqCst);
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.remote.lock().unwrap().clone()
    }

    pub fn applied_candidates(&self) -> Vec<CandidateInit> {
        self.candidates.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        if self.fail_negotiation.load(Ordering::SeqCst) {
            Err(TransportError::Rejected(
                "injected negotiation failure".to_owned(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MediaTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        self.check_failure()?;
        Ok(SessionDescription {
            kind: SdpKind::Offer,
            sdp: format!("v=0 mock-offer-for-{}", self.peer),
        })
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        self.check_failure()?;
        Ok(SessionDescription {
            kind: SdpKind::Answer,
            sdp: format!("v=0 mock-answer-for-{}", self.peer),
        })
    }

    async fn apply_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), TransportError> {
        *self.remote.lock().unwrap() = Some(description);
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), TransportError> {
        if self.remote.lock().unwrap().is_none() {
            return Err(TransportError::Rejected(
                "candidate before remote description".to_owned(),
            ));
        }
        self.candidates.lock().unwrap().push(candidate);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out `MockTransport`s and keeping them reachable for
/// inspection after the call has consumed them.
#[derive(Default)]
pub struct MockTransportFactory {
    transports: Mutex<HashMap<PeerName, Arc<MockTransport>>>,
    event_senders: Mutex<HashMap<PeerName, mpsc::Sender<TransportEvent>>>,
    attached_tracks: Mutex<HashMap<PeerName, usize>>,
    connect_count: AtomicUsize,
    fail_connect: Mutex<HashSet<PeerName>>,
    fail_negotiation: Mutex<HashSet<PeerName>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to build a transport for `peer`.
    pub fn fail_connect_for(&self, peer: &PeerName) {
        self.fail_connect.lock().unwrap().insert(peer.clone());
    }

    /// Hand out transports whose offer/answer steps fail for `peer`.
    pub fn fail_negotiation_for(&self, peer: &PeerName) {
        self.fail_negotiation.lock().unwrap().insert(peer.clone());
    }

    pub fn transport(&self, peer: &PeerName) -> Option<Arc<MockTransport>> {
        self.transports.lock().unwrap().get(peer).cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn attached_tracks(&self, peer: &PeerName) -> Option<usize> {
        self.attached_tracks.lock().unwrap().get(peer).copied()
    }

    pub fn event_sender(&self, peer: &PeerName) -> Option<mpsc::Sender<TransportEvent>> {
        self.event_senders.lock().unwrap().get(peer).cloned()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn connect(
        &self,
        peer: PeerName,
        media: &LocalMedia,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn MediaTransport>, TransportError> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_connect.lock().unwrap().contains(&peer) {
            return Err(TransportError::Rejected(
                "injected connect failure".to_owned(),
            ));
        }

        let transport = Arc::new(MockTransport::new(peer.clone()));
        if self.fail_negotiation.lock().unwrap().contains(&peer) {
            transport.fail_negotiation();
        }

        self.attached_tracks
            .lock()
            .unwrap()
            .insert(peer.clone(), media.tracks().len());
        self.event_senders.lock().unwrap().insert(peer.clone(), events);
        self.transports
            .lock()
            .unwrap()
            .insert(peer, transport.clone());

        Ok(transport)
    }
}
