use crate::error::MediaError;
use crate::media::LocalMedia;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Capture capability for the local audio. Acquisition failure is fatal to
/// call start; there is no retry.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn capture(&self) -> Result<LocalMedia, MediaError>;
}

/// Media source backed by a single Opus sample track. The embedder feeds
/// encoded samples into the track from its capture pipeline; this crate
/// only owns attachment and lifecycle.
pub struct OpusTrackSource {
    track_id: String,
}

impl OpusTrackSource {
    pub fn new(track_id: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
        }
    }
}

impl Default for OpusTrackSource {
    fn default() -> Self {
        Self::new("meshcall-audio")
    }
}

#[async_trait]
impl MediaSource for OpusTrackSource {
    async fn capture(&self) -> Result<LocalMedia, MediaError> {
        let track: Arc<dyn TrackLocal + Send + Sync> = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            self.track_id.clone(),
            "meshcall".to_owned(),
        ));
        Ok(LocalMedia::new(vec![track]))
    }
}
