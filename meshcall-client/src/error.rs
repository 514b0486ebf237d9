use crate::call::NegotiationState;
use thiserror::Error;

/// Failures of the underlying connection-transport capability.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),

    /// The transport refused an operation (used by non-webrtc transports).
    #[error("transport rejected operation: {0}")]
    Rejected(String),
}

/// Failures of a single peer's negotiation. These are recovered locally:
/// the dispatcher logs them and leaves that peer's state machine where it
/// was, never touching other peers.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("{action} is not legal in state {state:?}")]
    InvalidState {
        action: &'static str,
        state: NegotiationState,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Local media acquisition failures. Fatal to call start, no retry.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("audio capture unavailable: {0}")]
    CaptureUnavailable(String),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("call has not been initialized")]
    NotInitialized,

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
