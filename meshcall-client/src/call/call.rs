use crate::call::{CallBehavior, CallCommand, ConnectionTable, NegotiationState};
use crate::error::CallError;
use crate::media::{LocalMedia, MediaSource};
use crate::signaling::SignalingChannel;
use crate::transport::{TransportEvent, TransportFactory};
use meshcall_core::{CandidateInit, PeerName, SessionDescription, SignalBody, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// One participant's side of a mesh audio call: owns the connection table
/// and local media, consumes signaling envelopes and transport events, and
/// emits reply envelopes.
///
/// Everything runs on the single task driving this value, either through
/// [`Call::run`] or by calling the handler methods directly; handlers are
/// atomic with respect to the table up to their await points.
pub struct Call {
    local_peer: PeerName,
    behavior: Box<dyn CallBehavior>,
    table: ConnectionTable,
    media: Option<LocalMedia>,
    media_source: Arc<dyn MediaSource>,
    transport_factory: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingChannel>,
    command_rx: mpsc::Receiver<CallCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
}

impl Call {
    pub fn new(
        local_peer: PeerName,
        behavior: Box<dyn CallBehavior>,
        media_source: Arc<dyn MediaSource>,
        transport_factory: Arc<dyn TransportFactory>,
        signaling: Arc<dyn SignalingChannel>,
        command_rx: mpsc::Receiver<CallCommand>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            local_peer,
            behavior,
            table: ConnectionTable::new(),
            media: None,
            media_source,
            transport_factory,
            signaling,
            command_rx,
            transport_rx,
            transport_tx,
        }
    }

    pub fn local_peer(&self) -> &PeerName {
        &self.local_peer
    }

    /// Which peers am I connected to. The table is the single source of
    /// truth; exposed read-only.
    pub fn connections(&self) -> &ConnectionTable {
        &self.table
    }

    pub fn is_muted(&self) -> bool {
        self.media.as_ref().is_some_and(LocalMedia::is_muted)
    }

    /// Acquire the local media and announce ourselves to the room. Media
    /// failure is fatal to call start; nothing is retried.
    pub async fn initialize(&mut self) -> Result<(), CallError> {
        let media = self.media_source.capture().await?;
        info!(
            "captured local audio ({} track(s)) as {}",
            media.tracks().len(),
            self.local_peer
        );
        self.media = Some(media);

        self.signaling.send_signal(SignalBody::Ready {}).await;
        Ok(())
    }

    /// Initialize, then react to commands and transport events until the
    /// room is left. Per-peer failures are logged and never stop the loop.
    pub async fn run(mut self) -> Result<(), CallError> {
        self.initialize().await?;
        info!("call event loop started for {}", self.local_peer);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CallCommand::Signal(envelope)) => self.handle_envelope(envelope).await,
                        Some(CallCommand::SetMuted(muted)) => self.set_muted(muted),
                        Some(CallCommand::Leave) => {
                            self.leave().await;
                            break;
                        }
                        None => {
                            info!("command channel closed, leaving room");
                            self.leave().await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("transport event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("call event loop finished for {}", self.local_peer);
        Ok(())
    }

    /// Route one relayed envelope. Echoes of our own envelopes and directed
    /// messages addressed to someone else are dropped; handler errors are
    /// logged and confined to the one peer they concern.
    pub async fn handle_envelope(&mut self, envelope: SignalEnvelope) {
        if envelope.peer == self.local_peer {
            return;
        }

        let action = envelope.body.action();
        if let Some(to) = envelope.body.to()
            && *to != self.local_peer
        {
            debug!("ignoring {action} from {} addressed to {to}", envelope.peer);
            return;
        }

        let peer = envelope.peer;
        let result = match envelope.body {
            SignalBody::Ready {} => self.handle_ready(peer.clone()).await,
            SignalBody::Offer { offer, .. } => self.handle_offer(peer.clone(), offer).await,
            SignalBody::Answer { answer, .. } => self.handle_answer(peer.clone(), answer).await,
            SignalBody::Candidate { candidate, .. } => {
                self.handle_candidate(peer.clone(), candidate).await
            }
            SignalBody::Leave {} => {
                self.handle_peer_left(peer.clone()).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("error handling {action} from {peer}: {e}");
        }
    }

    /// A newly joined peer announced itself: the receiving side always takes
    /// the caller role and initiates the offer. (Two peers that announce
    /// truly simultaneously can still glare; that race is accepted, not
    /// arbitrated.)
    async fn handle_ready(&mut self, peer: PeerName) -> Result<(), CallError> {
        info!("{peer} is ready, taking caller role");

        let media = self.media.as_ref().ok_or(CallError::NotInitialized)?;
        let negotiator = self
            .table
            .get_or_create(
                &peer,
                media,
                self.transport_factory.as_ref(),
                &self.transport_tx,
            )
            .await?;

        if negotiator.state() != NegotiationState::Unstarted {
            debug!("negotiation with {peer} already underway, ignoring ready");
            return Ok(());
        }

        let offer = negotiator.begin_offer().await?;
        self.signaling
            .send_signal(SignalBody::Offer { offer, to: peer })
            .await;
        Ok(())
    }

    /// An offer addressed to us: take the callee role, answering from a
    /// fresh negotiator if this is the first contact with the sender.
    async fn handle_offer(
        &mut self,
        peer: PeerName,
        offer: SessionDescription,
    ) -> Result<(), CallError> {
        info!("offer from {peer}");

        let media = self.media.as_ref().ok_or(CallError::NotInitialized)?;
        let negotiator = self
            .table
            .get_or_create(
                &peer,
                media,
                self.transport_factory.as_ref(),
                &self.transport_tx,
            )
            .await?;

        let answer = negotiator.accept_offer(offer).await?;
        self.signaling
            .send_signal(SignalBody::Answer { answer, to: peer })
            .await;
        Ok(())
    }

    async fn handle_answer(
        &mut self,
        peer: PeerName,
        answer: SessionDescription,
    ) -> Result<(), CallError> {
        let Some(negotiator) = self.table.get_mut(&peer) else {
            warn!("answer from {peer} but no negotiation in progress");
            return Ok(());
        };

        negotiator.accept_answer(answer).await?;
        info!("connected to {peer}");
        Ok(())
    }

    /// Candidates for peers we have no negotiator for are dropped; the peer
    /// will resend connectivity once offer/answer establishes one.
    async fn handle_candidate(
        &mut self,
        peer: PeerName,
        candidate: CandidateInit,
    ) -> Result<(), CallError> {
        let Some(negotiator) = self.table.get_mut(&peer) else {
            debug!("dropping candidate from {peer}: no negotiator");
            return Ok(());
        };

        negotiator.add_candidate(candidate).await?;
        Ok(())
    }

    async fn handle_peer_left(&mut self, peer: PeerName) {
        if self.table.remove_and_close(&peer).await {
            info!("{peer} left the room");
            self.behavior.on_peer_left(peer).await;
        }
    }

    /// React to a notification from one of the per-peer transports.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(peer, candidate) => {
                self.signaling
                    .send_signal(SignalBody::Candidate {
                        candidate,
                        to: peer,
                    })
                    .await;
            }

            TransportEvent::TrackReceived(peer, track) => {
                debug!("surfacing remote track from {peer}");
                self.behavior.on_track_started(peer, track).await;
            }

            TransportEvent::Connected(peer) => {
                if let Some(negotiator) = self.table.get_mut(&peer) {
                    negotiator.mark_connected();
                } else {
                    warn!("transport connected for unknown peer {peer}");
                }
            }

            TransportEvent::Disconnected(peer) => {
                info!("transport for {peer} disconnected");
                self.handle_peer_left(peer).await;
            }
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if let Some(media) = &mut self.media {
            media.set_muted(muted);
        }
    }

    /// Broadcast our departure, then close every negotiator unconditionally
    /// (mid-negotiation included) and release the local media.
    pub async fn leave(&mut self) {
        info!("{} leaving room", self.local_peer);
        self.signaling.send_signal(SignalBody::Leave {}).await;

        self.table.remove_and_close_all().await;

        if let Some(mut media) = self.media.take() {
            media.release();
        }
    }
}
