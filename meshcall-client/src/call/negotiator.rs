use crate::error::NegotiationError;
use crate::transport::MediaTransport;
use meshcall_core::{CandidateInit, PeerName, SessionDescription};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where one peer's offer/answer exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Unstarted,
    OfferSent,
    AnswerSent,
    Connected,
    Closed,
}

/// Negotiation actions subject to the state guard.
#[derive(Debug, Clone, Copy)]
enum Step {
    BeginOffer,
    AcceptOffer,
    AcceptAnswer,
    AddCandidate,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Step::BeginOffer => "begin_offer",
            Step::AcceptOffer => "accept_offer",
            Step::AcceptAnswer => "accept_answer",
            Step::AddCandidate => "add_candidate",
        }
    }
}

/// Per-peer negotiation state machine over one connection-transport.
///
/// A transition is committed only after every transport call it depends on
/// has succeeded, so a failed step leaves the machine where it was (stalled,
/// reported by the caller, never retried).
pub struct PeerNegotiator {
    peer: PeerName,
    transport: Arc<dyn MediaTransport>,
    state: NegotiationState,
    remote_described: bool,
    pending_candidates: Vec<CandidateInit>,
}

impl PeerNegotiator {
    pub fn new(peer: PeerName, transport: Arc<dyn MediaTransport>) -> Self {
        Self {
            peer,
            transport,
            state: NegotiationState::Unstarted,
            remote_described: false,
            pending_candidates: Vec::new(),
        }
    }

    pub fn peer(&self) -> &PeerName {
        &self.peer
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Legal source states per action. All transitions funnel through here.
    fn guard(&self, step: Step) -> Result<(), NegotiationError> {
        let legal = match step {
            Step::BeginOffer | Step::AcceptOffer => self.state == NegotiationState::Unstarted,
            Step::AcceptAnswer => self.state == NegotiationState::OfferSent,
            Step::AddCandidate => self.state != NegotiationState::Closed,
        };

        if legal {
            Ok(())
        } else {
            Err(NegotiationError::InvalidState {
                action: step.name(),
                state: self.state,
            })
        }
    }

    /// Caller path: build an offer, commit it locally, move to `OfferSent`.
    /// Returns the description to be signaled to the peer.
    pub async fn begin_offer(&mut self) -> Result<SessionDescription, NegotiationError> {
        self.guard(Step::BeginOffer)?;

        let offer = self.transport.create_offer().await?;
        self.state = NegotiationState::OfferSent;
        debug!("offer sent to {}", self.peer);
        Ok(offer)
    }

    /// Callee path: apply the remote offer, answer it, move to `AnswerSent`.
    /// Returns the description to be signaled back.
    pub async fn accept_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        self.guard(Step::AcceptOffer)?;

        self.transport.apply_remote_description(offer).await?;
        self.remote_described = true;
        self.flush_candidates().await;

        let answer = self.transport.create_answer().await?;
        self.state = NegotiationState::AnswerSent;
        debug!("answer sent to {}", self.peer);
        Ok(answer)
    }

    /// Caller path completion: apply the remote answer, move to `Connected`.
    pub async fn accept_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.guard(Step::AcceptAnswer)?;

        self.transport.apply_remote_description(answer).await?;
        self.remote_described = true;
        self.flush_candidates().await;

        self.state = NegotiationState::Connected;
        debug!("negotiation with {} complete", self.peer);
        Ok(())
    }

    /// Apply a remote candidate. Candidates that arrive before any remote
    /// description are buffered and flushed, in arrival order, once one is
    /// applied; the transport would otherwise reject them.
    pub async fn add_candidate(&mut self, candidate: CandidateInit) -> Result<(), NegotiationError> {
        self.guard(Step::AddCandidate)?;

        if !self.remote_described {
            debug!("buffering early candidate from {}", self.peer);
            self.pending_candidates.push(candidate);
            return Ok(());
        }

        self.transport.add_candidate(candidate).await?;
        Ok(())
    }

    /// Media-level connectivity was established. Completes either role;
    /// the callee has no `answer` to wait for, so this is its only way to
    /// reach `Connected`. No-op when already connected or closed.
    pub fn mark_connected(&mut self) {
        match self.state {
            NegotiationState::OfferSent | NegotiationState::AnswerSent => {
                self.state = NegotiationState::Connected;
                debug!("negotiation with {} complete", self.peer);
            }
            NegotiationState::Unstarted => {
                warn!("transport connected for {} before negotiation", self.peer);
            }
            NegotiationState::Connected | NegotiationState::Closed => {}
        }
    }

    async fn flush_candidates(&mut self) {
        for candidate in self.pending_candidates.drain(..) {
            if let Err(e) = self.transport.add_candidate(candidate).await {
                warn!("failed to apply buffered candidate from {}: {e}", self.peer);
            }
        }
    }

    /// Close the transport and drop any buffered candidates. Terminal.
    pub async fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        if let Err(e) = self.transport.close().await {
            warn!("error closing transport for {}: {e}", self.peer);
        }
        self.pending_candidates.clear();
        self.state = NegotiationState::Closed;
    }
}
