pub mod model;

pub use model::{
    CandidateInit, PeerName, SdpKind, SessionDescription, SignalAction, SignalBody, SignalEnvelope,
};
