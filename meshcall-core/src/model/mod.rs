mod peer;
mod signaling;

pub use peer::PeerName;
pub use signaling::{
    CandidateInit, SdpKind, SessionDescription, SignalAction, SignalBody, SignalEnvelope,
};
