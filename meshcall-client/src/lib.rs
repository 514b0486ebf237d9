pub mod call;
pub mod error;
pub mod media;
pub mod signaling;
pub mod transport;

pub use call::{
    Call, CallBehavior, CallCommand, ConnectionTable, NegotiationState, PeerNegotiator,
};
pub use error::{CallError, MediaError, NegotiationError, TransportError};
pub use media::{LocalMedia, MediaSource, OpusTrackSource};
pub use signaling::SignalingChannel;
pub use transport::{
    MediaTransport, TransportConfig, TransportEvent, TransportFactory, WebRtcTransportFactory,
};
