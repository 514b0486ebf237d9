use meshcall_core::SignalEnvelope;

/// Commands feeding the call event loop from the signaling transport and
/// the UI layer.
#[derive(Debug)]
pub enum CallCommand {
    /// An envelope relayed from the room (including our own echoes; the
    /// call filters those out).
    Signal(SignalEnvelope),

    /// Mute toggle for the local audio.
    SetMuted(bool),

    /// Leave the room: broadcast `leave`, tear everything down.
    Leave,
}
