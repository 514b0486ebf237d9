use async_trait::async_trait;
use meshcall_core::PeerName;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Hooks for the (excluded) rendering layer. Both events carry the peer
/// name so an audio output added for a peer can be matched to its removal.
#[async_trait]
pub trait CallBehavior: Send + Sync {
    /// A remote audio track arrived and should start playing.
    async fn on_track_started(&self, peer: PeerName, track: Arc<TrackRemote>);

    /// The peer departed; its audio output should be removed.
    async fn on_peer_left(&self, peer: PeerName);
}
