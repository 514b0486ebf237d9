use std::sync::Arc;
use tracing::info;
use webrtc::track::track_local::TrackLocal;

/// The locally captured track set. Created once at call start, attached
/// read-only to every peer transport, released exactly once at leave.
pub struct LocalMedia {
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    muted: bool,
}

impl LocalMedia {
    pub fn new(tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self {
            tracks,
            muted: false,
        }
    }

    pub fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }

    /// Mute flag consulted by whatever feeds samples into the tracks. The
    /// tracks stay attached; muting only stops audible output.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            self.muted = muted;
            info!("microphone {}", if muted { "muted" } else { "unmuted" });
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Drop the captured tracks. Only the call may do this, and only at leave.
    pub fn release(&mut self) {
        info!("releasing {} local track(s)", self.tracks.len());
        self.tracks.clear();
    }
}
