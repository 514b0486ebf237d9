use crate::model::peer::PeerName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque negotiated-media-capabilities document, exchanged during
/// offer/answer. Serialized as the browser-style `{type, sdp}` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque network-path descriptor (trickle ICE). Field names follow the
/// browser JSON shape so envelopes interoperate with web clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid", skip_serializing_if = "Option::is_none", default)]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub sdp_mline_index: Option<u16>,
}

/// One signaling message as relayed to every member of a room. The relay
/// stamps `peer` with the sender's name; receivers must filter out their
/// own echoes and directed messages addressed to someone else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalEnvelope {
    pub peer: PeerName,
    #[serde(flatten)]
    pub body: SignalBody,
}

/// Action plus action-specific payload of an envelope.
///
/// `ready` and `leave` are broadcasts; `offer`, `answer` and `candidate`
/// are directed through the `to` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", content = "message", rename_all = "lowercase")]
pub enum SignalBody {
    Ready {},
    Offer {
        offer: SessionDescription,
        to: PeerName,
    },
    Answer {
        answer: SessionDescription,
        to: PeerName,
    },
    Candidate {
        candidate: CandidateInit,
        to: PeerName,
    },
    Leave {},
}

impl SignalBody {
    pub fn action(&self) -> SignalAction {
        match self {
            SignalBody::Ready {} => SignalAction::Ready,
            SignalBody::Offer { .. } => SignalAction::Offer,
            SignalBody::Answer { .. } => SignalAction::Answer,
            SignalBody::Candidate { .. } => SignalAction::Candidate,
            SignalBody::Leave {} => SignalAction::Leave,
        }
    }

    /// Addressee of a directed message, `None` for broadcasts.
    pub fn to(&self) -> Option<&PeerName> {
        match self {
            SignalBody::Offer { to, .. }
            | SignalBody::Answer { to, .. }
            | SignalBody::Candidate { to, .. } => Some(to),
            SignalBody::Ready {} | SignalBody::Leave {} => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalAction {
    Ready,
    Offer,
    Answer,
    Candidate,
    Leave,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalAction::Ready => "ready",
            SignalAction::Offer => "offer",
            SignalAction::Answer => "answer",
            SignalAction::Candidate => "candidate",
            SignalAction::Leave => "leave",
        };
        write!(f, "{name}")
    }
}
