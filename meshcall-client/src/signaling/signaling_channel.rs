use async_trait::async_trait;
use meshcall_core::SignalBody;

/// Outbound side of the room-scoped signaling relay. The relay stamps the
/// sender's name onto the envelope, so only the body is handed over here.
/// Implementations are expected to swallow and log transport errors;
/// signaling delivery problems must not stall the call loop.
///
/// Inbound envelopes reach the call as `CallCommand::Signal` on its command
/// channel.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send_signal(&self, body: SignalBody);
}
