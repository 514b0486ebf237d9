use meshcall_core::{CandidateInit, PeerName};
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Notifications a transport pushes back into the call loop. Candidates are
/// emitted in generation order on a per-peer basis.
pub enum TransportEvent {
    /// A local ICE candidate is ready to be signaled to the peer.
    CandidateGenerated(PeerName, CandidateInit),

    /// The peer's remote audio track arrived, tagged with the peer name so
    /// the rendering layer can match it to a later removal.
    TrackReceived(PeerName, Arc<TrackRemote>),

    /// Media-level connectivity with the peer was established. This is what
    /// completes the callee path, which never sees an `answer` envelope.
    Connected(PeerName),

    /// The underlying connection died without an explicit `leave` signal.
    Disconnected(PeerName),
}
